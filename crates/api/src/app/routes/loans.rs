use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use loantrack_core::{LoanId, UserId};
use loantrack_loans::NewLoan;

use crate::app::routes::common::{json_body, parse_id, query_params};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_loan))
        .route("/:id", get(get_loan))
        .route("/:id/schedule", get(get_schedule))
        .route("/:id/summary", get(get_summary))
        .route("/:id/share", post(share_loan))
        .route("/:id/shares", get(list_shares))
}

pub async fn create_loan(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateLoanRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let owner_id: UserId = match parse_id(&body.owner_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let request = NewLoan {
        owner_id,
        amount: body.amount,
        annual_interest_rate: body.annual_interest_rate,
        loan_term_months: body.loan_term_months,
    };

    let loan = match services.create_loan(request).await {
        Ok(loan) => loan,
        Err(e) => return errors::service_error_to_response(e),
    };

    match dto::loan_to_json(&loan) {
        Ok(body) => (StatusCode::CREATED, Json(body)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_loan(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let loan_id: LoanId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let loan = match services.get_loan(loan_id).await {
        Ok(loan) => loan,
        Err(e) => return errors::service_error_to_response(e),
    };

    match dto::loan_to_json(&loan) {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            tracing::warn!(loan_id = %loan_id, "stored loan has invalid terms: {e}");
            errors::domain_error_to_response(e)
        }
    }
}

pub async fn get_schedule(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let loan_id: LoanId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.loan_schedule(loan_id).await {
        Ok(schedule) => (StatusCode::OK, Json(dto::schedule_to_json(loan_id, &schedule))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    query: Result<Query<dto::SummaryQuery>, QueryRejection>,
) -> axum::response::Response {
    let loan_id: LoanId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let query = match query_params(query) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.loan_summary(loan_id, query.month).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(dto::summary_to_json(loan_id, query.month, &summary)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn share_loan(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::ShareLoanRequest>, JsonRejection>,
) -> axum::response::Response {
    let loan_id: LoanId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let user_id: UserId = match parse_id(&body.user_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.share_loan(loan_id, user_id).await {
        Ok((share, created)) => {
            let status = if created { StatusCode::CREATED } else { StatusCode::OK };
            (status, Json(dto::share_to_json(&share))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_shares(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let loan_id: LoanId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.loan_shares(loan_id).await {
        Ok(shares) => {
            let items = shares.iter().map(dto::share_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
