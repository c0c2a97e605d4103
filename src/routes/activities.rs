use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::local_now;
use crate::dto::activity::{ActivityQuery, PageQuery};
use crate::forms::activity::{CreateActivityForm, FeedbackForm, UpdateActivityForm};
use crate::repository::DieselRepository;
use crate::routes::{ActingUser, ok, ok_page, service_error};
use crate::services::activity as activity_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_activities)
        .service(create_activity)
        .service(need_follow_up)
        .service(customer_statistics)
        .service(customer_activities)
        .service(get_activity)
        .service(update_activity)
        .service(delete_activity)
        .service(record_feedback);
}

#[get("/activities")]
pub async fn list_activities(
    repo: web::Data<DieselRepository>,
    params: web::Query<ActivityQuery>,
) -> impl Responder {
    match activity_service::list_activities(repo.get_ref(), params.into_inner(), local_now()) {
        Ok(page) => ok_page(page),
        Err(err) => service_error("Failed to list activities", err),
    }
}

/// Records an activity, optionally with a follow-up todo.
#[post("/activities")]
pub async fn create_activity(
    user: ActingUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateActivityForm>,
) -> impl Responder {
    match activity_service::create_activity(repo.get_ref(), user.id(), form, local_now()) {
        Ok(created) => ok(created),
        Err(err) => service_error("Failed to create activity", err),
    }
}

#[get("/activities/need-follow-up")]
pub async fn need_follow_up(repo: web::Data<DieselRepository>) -> impl Responder {
    match activity_service::need_follow_up(repo.get_ref(), local_now()) {
        Ok(activities) => ok(activities),
        Err(err) => service_error("Failed to list due follow-ups", err),
    }
}

#[get("/activities/customer/{customer_id}/statistics")]
pub async fn customer_statistics(
    customer_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match activity_service::customer_statistics(repo.get_ref(), customer_id.into_inner()) {
        Ok(stats) => ok(stats),
        Err(err) => service_error("Failed to compute activity statistics", err),
    }
}

#[get("/activities/customer/{customer_id}")]
pub async fn customer_activities(
    customer_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    params: web::Query<PageQuery>,
) -> impl Responder {
    match activity_service::list_customer_activities(
        repo.get_ref(),
        customer_id.into_inner(),
        params.into_inner(),
        local_now(),
    ) {
        Ok(page) => ok_page(page),
        Err(err) => service_error("Failed to list customer activities", err),
    }
}

#[get("/activities/{id}")]
pub async fn get_activity(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match activity_service::get_activity(repo.get_ref(), id.into_inner(), local_now()) {
        Ok(activity) => ok(activity),
        Err(err) => service_error("Failed to get activity", err),
    }
}

#[put("/activities/{id}")]
pub async fn update_activity(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateActivityForm>,
) -> impl Responder {
    match activity_service::update_activity(repo.get_ref(), id.into_inner(), form, local_now()) {
        Ok(activity) => ok(activity),
        Err(err) => service_error("Failed to update activity", err),
    }
}

#[delete("/activities/{id}")]
pub async fn delete_activity(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match activity_service::delete_activity(repo.get_ref(), id.into_inner()) {
        Ok(()) => ok(()),
        Err(err) => service_error("Failed to delete activity", err),
    }
}

#[put("/activities/{id}/feedback")]
pub async fn record_feedback(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<FeedbackForm>,
) -> impl Responder {
    match activity_service::record_feedback(repo.get_ref(), id.into_inner(), form, local_now()) {
        Ok(activity) => ok(activity),
        Err(err) => service_error("Failed to record feedback", err),
    }
}
