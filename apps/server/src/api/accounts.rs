use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{Account, AccountUpdate, NewAccount},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

fn account_not_found(what: impl std::fmt::Display) -> ApiError {
    ApiError::NotFound(format!("Account {} not found", what))
}

#[utoipa::path(get, path="/api/v1/accounts", responses((status=200, body = [Account])))]
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Account>>> {
    let accounts = state.account_service.list_accounts()?;
    Ok(Json(accounts.into_iter().map(Account::from).collect()))
}

#[utoipa::path(post, path="/api/v1/accounts", request_body = NewAccount, responses((status=201, body = Account), (status=400), (status=409)))]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewAccount>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let created = state.account_service.create_account(payload.into()).await?;
    info!("Created account {}", created.id);
    Ok((StatusCode::CREATED, Json(Account::from(created))))
}

#[utoipa::path(get, path="/api/v1/accounts/{id}", responses((status=200, body = Account), (status=404)))]
pub async fn get_account(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Account>> {
    state
        .account_service
        .get_account(id)?
        .map(|a| Json(Account::from(a)))
        .ok_or_else(|| account_not_found(id))
}

#[utoipa::path(get, path="/api/v1/accounts/by-username/{username}", responses((status=200, body = Account), (status=404)))]
pub async fn get_account_by_username(
    Path(username): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Account>> {
    state
        .account_service
        .get_account_by_username(&username)?
        .map(|a| Json(Account::from(a)))
        .ok_or_else(|| account_not_found(format!("'{}'", username)))
}

#[utoipa::path(put, path="/api/v1/accounts/{id}", request_body = AccountUpdate, responses((status=200, body = Account), (status=400), (status=404), (status=409)))]
pub async fn update_account(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AccountUpdate>,
) -> ApiResult<Json<Account>> {
    let updated = state
        .account_service
        .update_account(id, payload.into())
        .await?;
    info!("Updated account {}", updated.id);
    Ok(Json(Account::from(updated)))
}

#[utoipa::path(delete, path="/api/v1/accounts/{id}", responses((status=204), (status=404)))]
pub async fn delete_account(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.account_service.delete_account(id).await?;
    info!("Deleted account {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Accounts whose display name is shared with at least one other account.
#[utoipa::path(get, path="/api/v1/accounts/duplicates", responses((status=200, body = [Account])))]
pub async fn find_duplicates(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Account>>> {
    let accounts = state.account_service.find_duplicates()?;
    Ok(Json(accounts.into_iter().map(Account::from).collect()))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Exact display name to match
    name: Option<String>,
}

#[utoipa::path(get, path="/api/v1/accounts/search", responses((status=200, body = [Account]), (status=400)))]
pub async fn search_accounts(
    Query(query): Query<SearchQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Account>>> {
    let name = query
        .name
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'name' is required".to_string()))?;
    let accounts = state.account_service.search_by_name(&name)?;
    Ok(Json(accounts.into_iter().map(Account::from).collect()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/duplicates", get(find_duplicates))
        .route("/accounts/search", get(search_accounts))
        .route(
            "/accounts/by-username/{username}",
            get(get_account_by_username),
        )
        .route(
            "/accounts/{id}",
            get(get_account).put(update_account).delete(delete_account),
        )
}
