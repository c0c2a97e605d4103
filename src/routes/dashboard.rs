use actix_web::{HttpResponse, Responder, post, web};

use crate::domain::local_now;
use crate::dto::api::ApiResponse;
use crate::forms::dashboard::DashboardSearchForm;
use crate::repository::DieselRepository;
use crate::routes::{ActingUser, service_error};
use crate::services::dashboard as dashboard_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search);
}

/// Grouped follow-up list; `total` counts matching todos.
#[post("/dashboard/search")]
pub async fn search(
    user: ActingUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<DashboardSearchForm>,
) -> impl Responder {
    match dashboard_service::search_dashboard(repo.get_ref(), user.id(), form, local_now()) {
        Ok((total, entries)) => HttpResponse::Ok().json(ApiResponse::with_total(entries, total)),
        Err(err) => service_error("Failed to search dashboard", err),
    }
}
