use std::str::FromStr;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::Json;

use loantrack_core::DomainError;

use crate::app::errors;

/// Parse an id from a path segment or body field, mapping failures to a 400.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.trim().parse::<T>().map_err(errors::domain_error_to_response)
}

/// Unwrap a JSON body, turning axum's rejection into the JSON error shape.
///
/// Wrong types, missing fields and malformed JSON are all reported as 400.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            rejection.body_text(),
        )),
    }
}

/// Query-string counterpart of [`json_body`].
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, axum::response::Response> {
    match query {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            rejection.body_text(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;
    use loantrack_core::{LoanId, UserId};

    use crate::app::dto::SummaryQuery;

    fn summary_query(uri: &str) -> Result<SummaryQuery, axum::response::Response> {
        let uri: Uri = uri.parse().unwrap();
        query_params(Query::<SummaryQuery>::try_from_uri(&uri))
    }

    #[test]
    fn valid_ids_parse() {
        let id = LoanId::new();
        let parsed: LoanId = parse_id(&format!(" {id} ")).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn invalid_ids_are_bad_requests() {
        let response = parse_id::<UserId>("42").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn well_formed_query_parses() {
        let query = summary_query("/loans/x/summary?month=6").unwrap();
        assert_eq!(query.month, 6);
    }

    #[test]
    fn malformed_queries_are_bad_requests() {
        for uri in ["/loans/x/summary?month=abc", "/loans/x/summary?month=1.5", "/loans/x/summary"] {
            let response = summary_query(uri).unwrap_err();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }
}
