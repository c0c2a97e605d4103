use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::local_now;
use crate::dto::user::UserQuery;
use crate::forms::user::{CreateUserForm, UpdateUserForm};
use crate::repository::DieselRepository;
use crate::routes::{ok, ok_page, service_error};
use crate::services::user as user_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(create_user)
        .service(active_users)
        .service(get_user)
        .service(update_user)
        .service(delete_user)
        .service(homepage);
}

#[get("/users")]
pub async fn list_users(
    repo: web::Data<DieselRepository>,
    params: web::Query<UserQuery>,
) -> impl Responder {
    match user_service::list_users(repo.get_ref(), params.into_inner()) {
        Ok(page) => ok_page(page),
        Err(err) => service_error("Failed to list users", err),
    }
}

#[post("/users")]
pub async fn create_user(
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateUserForm>,
) -> impl Responder {
    match user_service::create_user(repo.get_ref(), form) {
        Ok(user) => ok(user),
        Err(err) => service_error("Failed to create user", err),
    }
}

#[get("/users/active")]
pub async fn active_users(repo: web::Data<DieselRepository>) -> impl Responder {
    match user_service::list_active_users(repo.get_ref()) {
        Ok(users) => ok(users),
        Err(err) => service_error("Failed to list active users", err),
    }
}

#[get("/users/{id}")]
pub async fn get_user(id: web::Path<i32>, repo: web::Data<DieselRepository>) -> impl Responder {
    match user_service::get_user(repo.get_ref(), id.into_inner()) {
        Ok(user) => ok(user),
        Err(err) => service_error("Failed to get user", err),
    }
}

#[put("/users/{id}")]
pub async fn update_user(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateUserForm>,
) -> impl Responder {
    match user_service::update_user(repo.get_ref(), id.into_inner(), form, local_now()) {
        Ok(user) => ok(user),
        Err(err) => service_error("Failed to update user", err),
    }
}

#[delete("/users/{id}")]
pub async fn delete_user(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match user_service::delete_user(repo.get_ref(), id.into_inner()) {
        Ok(()) => ok(()),
        Err(err) => service_error("Failed to delete user", err),
    }
}

/// Today's follow-ups of a user.
#[get("/users/{id}/homepage")]
pub async fn homepage(id: web::Path<i32>, repo: web::Data<DieselRepository>) -> impl Responder {
    match user_service::homepage(repo.get_ref(), id.into_inner(), local_now()) {
        Ok(page) => ok(page),
        Err(err) => service_error("Failed to load user homepage", err),
    }
}
