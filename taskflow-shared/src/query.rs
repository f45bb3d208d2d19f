/// Task list query builder
///
/// Translates the raw `GET /api/tasks` query parameters into a SQL filter,
/// a sort order, and an offset/limit window. The parameters arrive as a
/// typed [`TaskListParams`] (unknown `status`/`sortBy`/`sortOrder` values
/// are rejected at deserialization, they never reach the database) and are
/// normalized into a [`TaskQuery`].
///
/// The owner predicate is not part of this module's output on purpose: the
/// task store prepends `user_id = $1` to every statement itself, so no
/// combination of parameters can widen a query past the requesting user.
///
/// Normalization policy: `page` below 1 is clamped to 1 and `limit` is
/// clamped to 1..=100; a blank `search` adds no predicate.

use serde::Deserialize;

/// Default page size when `limit` is absent
pub const DEFAULT_LIMIT: i64 = 10;

/// Upper bound for `limit`
pub const MAX_LIMIT: i64 = 100;

/// Completion-status filter (`status` parameter)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// No completion predicate
    #[default]
    All,

    /// Only tasks with `completed = true`
    Completed,

    /// Only tasks with `completed = false`
    Pending,
}

impl StatusFilter {
    /// The equality predicate this filter adds, if any
    pub fn completed(&self) -> Option<bool> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Completed => Some(true),
            StatusFilter::Pending => Some(false),
        }
    }
}

/// Sortable fields (`sortBy` parameter)
///
/// Maps one-to-one onto task columns; the column name comes from this enum
/// and never from raw input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    DueDate,
    CreatedAt,
    UpdatedAt,
    Title,
    Priority,
    Completed,
}

impl SortField {
    /// Column to sort by
    pub fn column(&self) -> &'static str {
        match self {
            SortField::DueDate => "due_date",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::Priority => "priority",
            SortField::Completed => "completed",
        }
    }
}

/// Sort direction (`sortOrder` parameter)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Raw query parameters for the task list endpoint
///
/// Every field is optional on the wire; absent fields take the documented
/// defaults (`status=all`, ascending due date, page 1, 10 per page).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskListParams {
    pub status: StatusFilter,
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub page: i64,
    pub limit: i64,
}

impl Default for TaskListParams {
    fn default() -> Self {
        Self {
            status: StatusFilter::default(),
            search: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Normalized task list query
///
/// Produced from [`TaskListParams`] by [`TaskQuery::from_params`]; page and
/// limit are guaranteed in range and the search text, when present, is
/// non-blank.
#[derive(Debug, Clone)]
pub struct TaskQuery {
    status: StatusFilter,
    search: Option<String>,
    sort_by: SortField,
    sort_order: SortOrder,
    page: i64,
    limit: i64,
}

impl TaskQuery {
    /// Normalizes raw parameters into a query
    pub fn from_params(params: TaskListParams) -> Self {
        let search = params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            status: params.status,
            search,
            sort_by: params.sort_by,
            sort_order: params.sort_order,
            page: params.page.max(1),
            limit: params.limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Completion predicate from the status filter
    pub fn completed(&self) -> Option<bool> {
        self.status.completed()
    }

    /// `ILIKE` pattern for the search predicate: the search text with LIKE
    /// metacharacters escaped, wrapped in `%` so it matches as a substring
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|s| format!("%{}%", escape_like(s)))
    }

    /// Filter clauses after the owner predicate, with bind positions
    /// starting at `$2` (`$1` is always the user id)
    ///
    /// The caller binds values in the same order the clauses appear:
    /// completion flag first, then the search pattern (once — it serves
    /// both sides of the OR).
    pub fn filter_sql(&self) -> String {
        let mut sql = String::new();
        let mut bind = 1;

        if self.completed().is_some() {
            bind += 1;
            sql.push_str(&format!(" AND completed = ${bind}"));
        }
        if self.search.is_some() {
            bind += 1;
            sql.push_str(&format!(
                " AND (title ILIKE ${bind} OR description ILIKE ${bind})"
            ));
        }

        sql
    }

    /// `ORDER BY ... LIMIT ... OFFSET ...` tail, with bind positions
    /// continuing after the filter binds
    pub fn order_limit_sql(&self) -> String {
        let filter_binds =
            1 + self.completed().is_some() as usize + self.search.is_some() as usize;

        format!(
            " ORDER BY {} {} LIMIT ${} OFFSET ${}",
            self.sort_by.column(),
            self.sort_order.sql(),
            filter_binds + 1,
            filter_binds + 2,
        )
    }
}

/// Escapes `%`, `_`, and `\` so user text matches literally under LIKE
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(params: TaskListParams) -> TaskQuery {
        TaskQuery::from_params(params)
    }

    #[test]
    fn test_defaults() {
        let q = query(TaskListParams::default());

        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), DEFAULT_LIMIT);
        assert_eq!(q.offset(), 0);
        assert_eq!(q.completed(), None);
        assert_eq!(q.filter_sql(), "");
        assert_eq!(
            q.order_limit_sql(),
            " ORDER BY due_date ASC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_status_filter_predicates() {
        assert_eq!(StatusFilter::All.completed(), None);
        assert_eq!(StatusFilter::Completed.completed(), Some(true));
        assert_eq!(StatusFilter::Pending.completed(), Some(false));
    }

    #[test]
    fn test_status_adds_clause_and_shifts_binds() {
        let q = query(TaskListParams {
            status: StatusFilter::Pending,
            ..Default::default()
        });

        assert_eq!(q.filter_sql(), " AND completed = $2");
        assert_eq!(
            q.order_limit_sql(),
            " ORDER BY due_date ASC LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn test_search_clause_uses_single_bind_for_both_columns() {
        let q = query(TaskListParams {
            search: Some("groceries".to_string()),
            ..Default::default()
        });

        assert_eq!(
            q.filter_sql(),
            " AND (title ILIKE $2 OR description ILIKE $2)"
        );
        assert_eq!(q.search_pattern(), Some("%groceries%".to_string()));
    }

    #[test]
    fn test_status_and_search_combined() {
        let q = query(TaskListParams {
            status: StatusFilter::Completed,
            search: Some("report".to_string()),
            ..Default::default()
        });

        assert_eq!(
            q.filter_sql(),
            " AND completed = $2 AND (title ILIKE $3 OR description ILIKE $3)"
        );
        assert_eq!(
            q.order_limit_sql(),
            " ORDER BY due_date ASC LIMIT $4 OFFSET $5"
        );
    }

    #[test]
    fn test_blank_search_adds_no_predicate() {
        for s in ["", "   "] {
            let q = query(TaskListParams {
                search: Some(s.to_string()),
                ..Default::default()
            });
            assert_eq!(q.filter_sql(), "");
            assert_eq!(q.search_pattern(), None);
        }
    }

    #[test]
    fn test_like_metacharacters_match_literally() {
        let q = query(TaskListParams {
            search: Some("50%_done\\".to_string()),
            ..Default::default()
        });

        assert_eq!(q.search_pattern(), Some("%50\\%\\_done\\\\%".to_string()));
    }

    #[test]
    fn test_sort_field_columns() {
        assert_eq!(SortField::DueDate.column(), "due_date");
        assert_eq!(SortField::CreatedAt.column(), "created_at");
        assert_eq!(SortField::UpdatedAt.column(), "updated_at");
        assert_eq!(SortField::Title.column(), "title");
        assert_eq!(SortField::Priority.column(), "priority");
        assert_eq!(SortField::Completed.column(), "completed");
    }

    #[test]
    fn test_sort_direction() {
        let q = query(TaskListParams {
            sort_by: SortField::Priority,
            sort_order: SortOrder::Desc,
            ..Default::default()
        });

        assert_eq!(
            q.order_limit_sql(),
            " ORDER BY priority DESC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_pagination_offsets() {
        let q = query(TaskListParams {
            page: 3,
            limit: 20,
            ..Default::default()
        });

        assert_eq!(q.offset(), 40);
        assert_eq!(q.limit(), 20);
    }

    #[test]
    fn test_non_positive_page_and_limit_clamped() {
        let q = query(TaskListParams {
            page: 0,
            limit: -5,
            ..Default::default()
        });

        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 0);

        let q = query(TaskListParams {
            page: -2,
            limit: 10_000,
            ..Default::default()
        });

        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_LIMIT);
    }

    #[test]
    fn test_params_deserialize_camel_case() {
        let params: TaskListParams = serde_json::from_value(serde_json::json!({
            "status": "pending",
            "sortBy": "priority",
            "sortOrder": "desc",
            "page": 1,
            "limit": 1
        }))
        .unwrap();

        assert_eq!(params.status, StatusFilter::Pending);
        assert_eq!(params.sort_by, SortField::Priority);
        assert_eq!(params.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        let result: Result<TaskListParams, _> =
            serde_json::from_value(serde_json::json!({ "sortBy": "password_hash" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result: Result<TaskListParams, _> =
            serde_json::from_value(serde_json::json!({ "status": "archived" }));
        assert!(result.is_err());
    }
}
