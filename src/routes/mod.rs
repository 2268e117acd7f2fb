//! HTTP surface of the lead API.

use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{Error, HttpRequest, HttpResponse, web};

use crate::dto::api::ApiError;
use crate::services::ServiceError;

pub mod leads;

/// Maps a service outcome to its status code and error envelope.
///
/// Internal failures are logged here and never described to the client.
pub fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Validation(errors) => {
            HttpResponse::BadRequest().json(ApiError::with_errors("Validation failed", errors))
        }
        ServiceError::TypeConstraint(message) => {
            HttpResponse::BadRequest().json(ApiError::new(message))
        }
        ServiceError::DuplicateEmail => HttpResponse::BadRequest()
            .json(ApiError::new("Lead with this email already exists")),
        ServiceError::NotFound => HttpResponse::NotFound().json(ApiError::new("Lead not found")),
        ServiceError::AccessDenied => {
            HttpResponse::Forbidden().json(ApiError::new("Access denied"))
        }
        ServiceError::Unauthorized => {
            HttpResponse::Unauthorized().json(ApiError::new("Account is deactivated."))
        }
        ServiceError::Internal(message) => {
            log::error!("Request failed: {message}");
            HttpResponse::InternalServerError().json(ApiError::new("Internal server error"))
        }
    }
}

fn bad_request(err: impl std::fmt::Display) -> Error {
    let message = err.to_string();
    log::debug!("Rejected malformed request: {message}");
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(ApiError::new(format!("Validation failed: {message}"))),
    )
    .into()
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    bad_request(err)
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    bad_request(err)
}

/// Ids that are not integers cannot name a lead.
fn path_error(err: PathError, _req: &HttpRequest) -> Error {
    InternalError::from_response(
        err.to_string(),
        HttpResponse::NotFound().json(ApiError::new("Lead not found")),
    )
    .into()
}

/// Registers the lead routes under `/api` with envelope-shaped extractor errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::scope("/api")
                .service(leads::list_leads)
                .service(leads::create_lead)
                .service(leads::lead_stats)
                .service(leads::get_lead)
                .service(leads::update_lead)
                .service(leads::delete_lead),
        );
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use serde_json::Value;

    use super::*;

    async fn body_of(resp: HttpResponse) -> (StatusCode, String) {
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[actix_web::test]
    async fn internal_errors_hide_their_detail() {
        let (status, body) =
            body_of(error_response(ServiceError::Internal("disk I/O error".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("disk I/O error"));

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Internal server error");
        assert!(json.get("errors").is_none());
    }

    #[actix_web::test]
    async fn lookup_failures_map_to_their_status() {
        let (status, body) = body_of(error_response(ServiceError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Lead not found"));

        let (status, _) = body_of(error_response(ServiceError::AccessDenied)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = body_of(error_response(ServiceError::DuplicateEmail)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Lead with this email already exists"));
    }
}
