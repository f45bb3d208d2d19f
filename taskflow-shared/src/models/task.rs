/// Task model, owner-scoped CRUD, and analytics queries
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('Low', 'Medium', 'High');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     due_date TIMESTAMPTZ NOT NULL,
///     priority task_priority NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Every read, update, and delete filters by `id AND user_id`; a task is
/// never visible to or mutable by anyone but its owner, and a wrong-owner
/// lookup is indistinguishable from a missing task.
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::models::task::{CreateTask, Task, TaskPriority};
/// use chrono::Utc;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     user_id,
///     title: "Ship the release".to_string(),
///     description: None,
///     due_date: Utc::now(),
///     priority: TaskPriority::High,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::query::TaskQuery;

/// Task priority
///
/// The Postgres enum declares labels in urgency order (`Low`, `Medium`,
/// `High`), so `ORDER BY priority DESC` puts High first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

/// Task owned by a single user
///
/// Serializes with camelCase keys — this struct is the wire representation
/// returned by the task endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task id
    pub id: Uuid,

    /// Owner
    pub user_id: Uuid,

    /// Title (non-empty, enforced at the request boundary)
    pub title: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// When the task is due
    pub due_date: DateTime<Utc>,

    /// Priority
    pub priority: TaskPriority,

    /// Whether the task is done
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
}

/// Input for a partial update
///
/// `None` fields are left unchanged; there is no way to clear a field.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub completed: Option<bool>,
}

/// One page of a filtered task list
#[derive(Debug, Clone, Serialize)]
pub struct TaskPage {
    /// Tasks in this window, at most `limit` of them
    pub tasks: Vec<Task>,

    /// Count of ALL records matching the filter, ignoring the window
    pub total: i64,

    /// 1-based page number
    pub page: i64,

    /// Window size
    pub limit: i64,
}

/// Count of tasks holding one priority value
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PriorityCount {
    pub priority: TaskPriority,
    pub count: i64,
}

/// Percentage of tasks completed, rounded to the nearest integer
///
/// Defined as 0 when there are no tasks.
pub fn completion_rate(completed: i64, total: i64) -> i64 {
    if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as i64
    }
}

impl Task {
    /// Creates a task for its owner, initially not completed
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description, due_date, priority)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, description, due_date, priority,
                      completed, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.priority)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by id, scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, due_date, priority,
                   completed, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists one page of the owner's tasks for the given query
    ///
    /// Runs the windowed select and the unwindowed count over the same
    /// filter; `total` in the returned page reflects the filtered set, not
    /// the owner's full task count. The owner predicate is always `$1`;
    /// the query contributes its clauses and binds after it, in a fixed
    /// order (completion flag, then search pattern).
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        query: &TaskQuery,
    ) -> Result<TaskPage, sqlx::Error> {
        let filter = query.filter_sql();

        let select_sql = format!(
            "SELECT id, user_id, title, description, due_date, priority, \
                    completed, created_at, updated_at \
             FROM tasks WHERE user_id = $1{filter}{}",
            query.order_limit_sql(),
        );
        let count_sql = format!("SELECT COUNT(*) FROM tasks WHERE user_id = $1{filter}");

        let mut select = sqlx::query_as::<_, Task>(&select_sql).bind(user_id);
        let mut count = sqlx::query_as::<_, (i64,)>(&count_sql).bind(user_id);

        if let Some(completed) = query.completed() {
            select = select.bind(completed);
            count = count.bind(completed);
        }
        if let Some(pattern) = query.search_pattern() {
            select = select.bind(pattern.clone());
            count = count.bind(pattern);
        }

        let tasks = select
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(pool)
            .await?;
        let (total,) = count.fetch_one(pool).await?;

        Ok(TaskPage {
            tasks,
            total,
            page: query.page(),
            limit: query.limit(),
        })
    }

    /// Applies a partial update, scoped to the owner
    ///
    /// Only the fields present in `data` are written; `updated_at` is
    /// always refreshed. Returns `None` when the task does not exist or
    /// belongs to someone else.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut sql = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind = 2;

        if data.title.is_some() {
            bind += 1;
            sql.push_str(&format!(", title = ${bind}"));
        }
        if data.description.is_some() {
            bind += 1;
            sql.push_str(&format!(", description = ${bind}"));
        }
        if data.due_date.is_some() {
            bind += 1;
            sql.push_str(&format!(", due_date = ${bind}"));
        }
        if data.priority.is_some() {
            bind += 1;
            sql.push_str(&format!(", priority = ${bind}"));
        }
        if data.completed.is_some() {
            bind += 1;
            sql.push_str(&format!(", completed = ${bind}"));
        }

        sql.push_str(
            " WHERE id = $1 AND user_id = $2 \
             RETURNING id, user_id, title, description, due_date, priority, \
                       completed, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&sql).bind(id).bind(user_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task, scoped to the owner
    ///
    /// Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts all tasks owned by the user
    pub async fn count_by_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts the user's completed tasks
    pub async fn count_completed(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND completed = TRUE")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Task counts grouped by priority
    ///
    /// Priorities with no tasks do not appear in the result.
    pub async fn priority_distribution(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<PriorityCount>, sqlx::Error> {
        let counts = sqlx::query_as::<_, PriorityCount>(
            r#"
            SELECT priority, COUNT(*) AS count
            FROM tasks
            WHERE user_id = $1
            GROUP BY priority
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(counts)
    }

    /// Incomplete tasks due within the next 7 days, soonest first
    ///
    /// The window is `[now, now + 7 days]`, both ends inclusive.
    pub async fn upcoming_deadlines(
        pool: &PgPool,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let until = now + Duration::days(7);

        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, due_date, priority,
                   completed, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
              AND completed = FALSE
              AND due_date >= $2
              AND due_date <= $3
            ORDER BY due_date ASC
            "#,
        )
        .bind(user_id)
        .bind(now)
        .bind(until)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_as_str() {
        assert_eq!(TaskPriority::High.as_str(), "High");
        assert_eq!(TaskPriority::Medium.as_str(), "Medium");
        assert_eq!(TaskPriority::Low.as_str(), "Low");
    }

    #[test]
    fn test_priority_serde_uses_exact_labels() {
        assert_eq!(
            serde_json::to_value(TaskPriority::High).unwrap(),
            serde_json::json!("High")
        );

        let parsed: TaskPriority = serde_json::from_value(serde_json::json!("Medium")).unwrap();
        assert_eq!(parsed, TaskPriority::Medium);

        let bad: Result<TaskPriority, _> = serde_json::from_value(serde_json::json!("urgent"));
        assert!(bad.is_err());
    }

    #[test]
    fn test_completion_rate_zero_tasks() {
        assert_eq!(completion_rate(0, 0), 0);
    }

    #[test]
    fn test_completion_rate_rounds() {
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(1, 2), 50);
    }

    #[test]
    fn test_completion_rate_bounds() {
        assert_eq!(completion_rate(0, 5), 0);
        assert_eq!(completion_rate(5, 5), 100);

        for completed in 0..=7 {
            let rate = completion_rate(completed, 7);
            assert!((0..=100).contains(&rate));
        }
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Write tests".to_string(),
            description: None,
            due_date: Utc::now(),
            priority: TaskPriority::Low,
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&task).unwrap();
        let obj = value.as_object().unwrap();

        assert!(obj.contains_key("userId"));
        assert!(obj.contains_key("dueDate"));
        assert!(obj.contains_key("createdAt"));
        assert!(obj.contains_key("updatedAt"));
        assert_eq!(obj["priority"], serde_json::json!("Low"));
        assert_eq!(obj["completed"], serde_json::json!(false));
    }
}
