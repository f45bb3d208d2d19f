/// Task endpoints
///
/// All routes here sit behind the auth gate; handlers pull the caller's
/// identity out of the request extensions and pass it to the task store,
/// which scopes every statement to that owner. Supplying another user's
/// task id yields the same 404 as a task that never existed.
///
/// # Endpoints
///
/// - `POST   /api/tasks` - Create a task
/// - `GET    /api/tasks` - List with filter/sort/paginate (see
///   [`taskflow_shared::query`])
/// - `GET    /api/tasks/:id` - Fetch one task
/// - `PUT    /api/tasks/:id` - Partial update
/// - `DELETE /api/tasks/:id` - Delete
/// - `GET    /api/tasks/analytics/dashboard` - Dashboard analytics

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use taskflow_shared::{
    auth::middleware::AuthContext,
    models::task::{
        completion_rate, CreateTask, PriorityCount, Task, TaskPage, TaskPriority, UpdateTask,
    },
    query::{TaskListParams, TaskQuery},
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
};

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,

    /// ISO-8601 due date; a malformed value is rejected at deserialization
    pub due_date: DateTime<Utc>,

    pub priority: TaskPriority,
}

/// Partial update request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub due_date: Option<DateTime<Utc>>,

    pub priority: Option<TaskPriority>,

    pub completed: Option<bool>,
}

/// Delete confirmation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub msg: String,
}

/// Dashboard analytics payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    /// Task counts per priority; zero-count priorities are absent
    pub priority_dist: Vec<PriorityCount>,

    /// `round(completed / total * 100)`, 0 when there are no tasks
    pub completion_rate: i64,

    /// Incomplete tasks due within 7 days, soonest first
    pub upcoming: Vec<Task>,

    pub total: i64,

    pub completed: i64,
}

/// Creates a task owned by the caller
///
/// # Errors
///
/// - `400`: validation failed
/// - `401`: missing or invalid token
/// - `500`: server error
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: auth.user_id,
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            priority: req.priority,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Lists one page of the caller's tasks
///
/// Query parameters: `status` (`all|completed|pending`), `search`,
/// `sortBy`, `sortOrder` (`asc|desc`), `page`, `limit`. The response is
/// `{ tasks, total, page, limit }` where `total` counts the filtered set
/// ignoring the page window.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(params): ApiQuery<TaskListParams>,
) -> ApiResult<Json<TaskPage>> {
    let query = TaskQuery::from_params(params);
    let page = Task::list(&state.db, auth.user_id, &query).await?;

    Ok(Json(page))
}

/// Fetches a single task
///
/// # Errors
///
/// - `404`: no such task, or it belongs to someone else
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Applies a partial update to a task
///
/// # Errors
///
/// - `400`: validation failed
/// - `404`: no such task, or it belongs to someone else
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::update(
        &state.db,
        id,
        auth.user_id,
        UpdateTask {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            priority: req.priority,
            completed: req.completed,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Deletes a task
///
/// # Errors
///
/// - `404`: no such task, or it belongs to someone else
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = Task::delete(&state.db, id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(DeleteResponse {
        msg: "Task deleted".to_string(),
    }))
}

/// Dashboard analytics for the caller's tasks
///
/// Read-only and idempotent: priority distribution, completion rate, and
/// the upcoming-deadline list, plus the raw counts so the client need not
/// recompute them.
pub async fn dashboard_analytics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<AnalyticsResponse>> {
    let user_id = auth.user_id;

    let priority_dist = Task::priority_distribution(&state.db, user_id).await?;
    let total = Task::count_by_user(&state.db, user_id).await?;
    let completed = Task::count_completed(&state.db, user_id).await?;
    let upcoming = Task::upcoming_deadlines(&state.db, user_id, Utc::now()).await?;

    Ok(Json(AnalyticsResponse {
        priority_dist,
        completion_rate: completion_rate(completed, total),
        upcoming,
        total,
        completed,
    }))
}
