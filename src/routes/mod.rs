//! HTTP handlers of the `/api/v1` JSON API.
//!
//! Handlers stay thin: extract input, call into [`crate::services`] and wrap
//! the outcome in the [`ApiResponse`] envelope.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{FromRequest, HttpRequest, HttpResponse, Responder, get, web};
use serde::Serialize;
use serde_json::json;

use crate::domain::types::UserId;
use crate::dto::api::{ApiResponse, ResponseCode};
use crate::models::config::ServerConfig;
use crate::pagination::Paginated;
use crate::services::ServiceError;

pub mod activities;
pub mod customers;
pub mod dashboard;
pub mod reminders;
pub mod tags;
pub mod todos;
pub mod users;

/// Header naming the user on whose behalf a request is made.
pub const ACTING_USER_HEADER: &str = "X-User-Id";

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(data))
}

/// Page payload with `total` repeated at the top level of the envelope.
pub fn ok_page<T: Serialize>(page: Paginated<T>) -> HttpResponse {
    let total = page.total;
    HttpResponse::Ok().json(ApiResponse::with_total(page, total))
}

pub fn error_response(code: ResponseCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(code.status()).json(ApiResponse::error(code, message))
}

/// Maps a service failure onto the envelope, logging server side faults.
pub fn service_error(context: &str, err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::NotFound => error_response(ResponseCode::NotFound, ""),
        ServiceError::Form(message) => {
            log::warn!("{context}: {message}");
            error_response(ResponseCode::InvalidParams, message)
        }
        ServiceError::Validation(message) | ServiceError::Conflict(message) => {
            log::warn!("{context}: {message}");
            error_response(ResponseCode::ValidationError, message)
        }
        ServiceError::Repository(err) => {
            log::error!("{context}: {err}");
            error_response(ResponseCode::DatabaseError, "")
        }
        ServiceError::Internal(message) => {
            log::error!("{context}: {message}");
            error_response(ResponseCode::InternalError, "")
        }
    }
}

/// Turns body deserialization failures into a parameter error envelope.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = error_response(ResponseCode::InvalidParams, err.to_string());
    InternalError::from_response(err, response).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = error_response(ResponseCode::InvalidParams, err.to_string());
    InternalError::from_response(err, response).into()
}

/// User performing the request, from the `X-User-Id` header or the
/// configured default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActingUser(pub UserId);

impl ActingUser {
    pub fn id(self) -> UserId {
        self.0
    }

    fn resolve(req: &HttpRequest) -> Result<Self, String> {
        let raw = match req.headers().get(ACTING_USER_HEADER) {
            Some(value) => {
                let value = value
                    .to_str()
                    .map_err(|_| format!("{ACTING_USER_HEADER} is not valid text"))?;
                value
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| format!("{ACTING_USER_HEADER} must be a number"))?
            }
            None => req
                .app_data::<web::Data<ServerConfig>>()
                .map(|config| config.default_user_id)
                .ok_or_else(|| format!("missing {ACTING_USER_HEADER} header"))?,
        };
        UserId::new(raw).map(Self).map_err(|e| e.to_string())
    }
}

impl FromRequest for ActingUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::resolve(req).map_err(|message| {
            let response = error_response(ResponseCode::InvalidParams, message.clone());
            InternalError::from_response(message, response).into()
        }))
    }
}

/// Liveness probe.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Registers every `/api/v1` handler. Fixed segments such as `/stats` are
/// registered ahead of the `{id}` routes sharing their prefix.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    customers::configure(cfg);
    todos::configure(cfg);
    activities::configure(cfg);
    reminders::configure(cfg);
    users::configure(cfg);
    tags::configure(cfg);
    dashboard::configure(cfg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    fn config(default_user_id: i32) -> ServerConfig {
        ServerConfig {
            address: "127.0.0.1".into(),
            port: 0,
            database_url: ":memory:".into(),
            static_dir: ".".into(),
            default_user_id,
            reminder_batch_size: 10,
        }
    }

    #[test]
    fn header_wins_over_default() {
        let req = TestRequest::default()
            .insert_header((ACTING_USER_HEADER, "7"))
            .app_data(web::Data::new(config(1)))
            .to_http_request();
        assert_eq!(ActingUser::resolve(&req).unwrap().id().get(), 7);
    }

    #[test]
    fn default_user_is_used_without_header() {
        let req = TestRequest::default()
            .app_data(web::Data::new(config(3)))
            .to_http_request();
        assert_eq!(ActingUser::resolve(&req).unwrap().id().get(), 3);
    }

    #[test]
    fn malformed_header_is_rejected() {
        let req = TestRequest::default()
            .insert_header((ACTING_USER_HEADER, "abc"))
            .to_http_request();
        assert!(ActingUser::resolve(&req).is_err());
    }

    #[test]
    fn service_errors_map_to_status() {
        assert_eq!(
            service_error("t", ServiceError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            service_error("t", ServiceError::Form("bad".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            service_error("t", ServiceError::Internal("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
