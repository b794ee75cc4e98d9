use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use loantrack_core::UserId;
use loantrack_loans::NewUser;

use crate::app::routes::common::{json_body, parse_id};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user))
        .route("/:id/loans", get(list_user_loans))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.register_user(NewUser::new(body.name, body.email)).await {
        Ok(user) => (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.list_users().await {
        Ok(users) => {
            let items = users.iter().map(dto::user_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id: UserId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get_user(user_id).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Loans the user owns plus loans shared with them.
pub async fn list_user_loans(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id: UserId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.loans_for_user(user_id).await {
        Ok(loans) => match loans.iter().map(dto::loan_to_json).collect::<Result<Vec<_>, _>>() {
            Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
            Err(e) => errors::domain_error_to_response(e),
        },
        Err(e) => errors::service_error_to_response(e),
    }
}
