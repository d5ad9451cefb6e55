use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shopfront_core::DomainError;
use shopfront_infra::StoreError;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        StoreError::Domain(DomainError::Validation(_)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
        StoreError::Domain(DomainError::DuplicateCode(_)) => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_code", message)
        }
        StoreError::Domain(DomainError::InvalidId(_)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", message)
        }
        StoreError::Domain(DomainError::NotFound(_)) => {
            json_error(StatusCode::NOT_FOUND, "not_found", message)
        }
        StoreError::Connection(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable", message)
        }
        StoreError::Decode(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "decode_error", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path id, answering `400 invalid_id` on malformed input.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>()
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let cases = [
            (DomainError::validation("price is required"), StatusCode::BAD_REQUEST),
            (DomainError::duplicate_code("P001"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("nope"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("product x"), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(store_error_to_response(err.into()).status(), status);
        }
    }

    #[test]
    fn infrastructure_errors_are_server_errors() {
        let res = store_error_to_response(StoreError::connection("pool closed"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let res = store_error_to_response(StoreError::Decode("bad document".into()));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_ids_are_bad_requests() {
        let res = parse_id::<shopfront_core::ProductId>("abc").unwrap_err();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
