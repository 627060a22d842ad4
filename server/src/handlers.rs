//! Todo endpoints.
//!
//! Every handler validates its input before touching the store and runs all
//! storage work for the request under [`AppState::within`].

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use todo_core::filter::COMPLETED_PARAM;
use todo_core::{
    CreateChildTodoParams, CreateTodoParams, FieldErrors, NewTodo, Todo, TodoFilter, TodoStore,
    UpdateTodoParams,
};
use tracing::info;

use crate::error::AppError;
use crate::extract::{parse_id, JsonBody};
use crate::state::AppState;

/// Success wrapper: `{"data": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

fn data<T>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { data })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    get_completed: Option<String>,
}

type ApiResult<T> = Result<Json<Envelope<T>>, AppError>;

pub async fn list_todos(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Todo>> {
    let Query(query) = query
        .map_err(|_| FieldErrors::single(COMPLETED_PARAM, "type should be boolean"))?;
    let filter = TodoFilter::from_query(query.get_completed.as_deref())?;
    let forest = state.within(state.store.list_forest(&filter)).await?;
    Ok(data(forest))
}

pub async fn get_todo(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Todo> {
    let id = parse_id(&id)?;
    let todo = state.within(state.store.get(id)).await?;
    Ok(data(todo))
}

pub async fn create_todo(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<CreateTodoParams>,
) -> Result<(StatusCode, Json<Envelope<Todo>>), AppError> {
    let todo = NewTodo::from_create(params)?;
    let created = state.within(state.store.create(todo)).await?;
    info!(id = created.id, "todo created");
    Ok((StatusCode::CREATED, data(created)))
}

pub async fn create_child_todo(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<CreateChildTodoParams>,
) -> Result<(StatusCode, Json<Envelope<Todo>>), AppError> {
    let todo = NewTodo::from_create_child(params)?;
    let created = state.within(state.store.create(todo)).await?;
    info!(id = created.id, parent = ?created.parent_id, "child todo created");
    Ok((StatusCode::CREATED, data(created)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(params): JsonBody<UpdateTodoParams>,
) -> ApiResult<Todo> {
    let id = parse_id(&id)?;
    let updated = state
        .within(apply_update(state.store.as_ref(), id, &params))
        .await?;
    info!(id, version = updated.version, "todo updated");
    Ok(data(updated))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let id = parse_id(&id)?;
    state.within(state.store.delete(id)).await?;
    info!(id, "todo deleted");
    Ok(data(Deleted { success: true }))
}

/// Read, merge, validate, then write conditionally on the version read.
/// A concurrent writer between the read and the write surfaces as
/// [`AppError::EditConflict`]; it is never retried here.
async fn apply_update(
    store: &dyn TodoStore,
    id: i64,
    params: &UpdateTodoParams,
) -> Result<Todo, AppError> {
    let current = store.get(id).await?;
    let candidate = current.merged_with(params)?;
    Ok(store.update(&candidate).await?)
}
