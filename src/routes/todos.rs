use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::local_now;
use crate::dto::todo::{TodoQuery, TodoStatsQuery};
use crate::forms::todo::{CreateTodoForm, UpdateTodoForm};
use crate::repository::DieselRepository;
use crate::routes::{ActingUser, ok, ok_page, service_error};
use crate::services::todo as todo_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_todos)
        .service(create_todo)
        .service(todo_stats)
        .service(get_todo)
        .service(update_todo)
        .service(delete_todo)
        .service(complete_todo)
        .service(cancel_todo)
        .service(todo_logs);
}

#[get("/todos")]
pub async fn list_todos(
    repo: web::Data<DieselRepository>,
    params: web::Query<TodoQuery>,
) -> impl Responder {
    match todo_service::list_todos(repo.get_ref(), params.into_inner(), local_now()) {
        Ok(page) => ok_page(page),
        Err(err) => service_error("Failed to list todos", err),
    }
}

#[post("/todos")]
pub async fn create_todo(
    user: ActingUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateTodoForm>,
) -> impl Responder {
    match todo_service::create_todo(repo.get_ref(), user.id(), form) {
        Ok(todo) => ok(todo),
        Err(err) => service_error("Failed to create todo", err),
    }
}

#[get("/todos/stats")]
pub async fn todo_stats(
    repo: web::Data<DieselRepository>,
    params: web::Query<TodoStatsQuery>,
) -> impl Responder {
    match todo_service::todo_stats(repo.get_ref(), params.into_inner(), local_now()) {
        Ok(stats) => ok(stats),
        Err(err) => service_error("Failed to count todos", err),
    }
}

#[get("/todos/{id}")]
pub async fn get_todo(id: web::Path<i32>, repo: web::Data<DieselRepository>) -> impl Responder {
    match todo_service::get_todo(repo.get_ref(), id.into_inner(), local_now()) {
        Ok(todo) => ok(todo),
        Err(err) => service_error("Failed to get todo", err),
    }
}

#[put("/todos/{id}")]
pub async fn update_todo(
    id: web::Path<i32>,
    user: ActingUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateTodoForm>,
) -> impl Responder {
    match todo_service::update_todo(repo.get_ref(), user.id(), id.into_inner(), form, local_now())
    {
        Ok(todo) => ok(todo),
        Err(err) => service_error("Failed to update todo", err),
    }
}

#[delete("/todos/{id}")]
pub async fn delete_todo(
    id: web::Path<i32>,
    user: ActingUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match todo_service::delete_todo(repo.get_ref(), user.id(), id.into_inner()) {
        Ok(()) => ok(()),
        Err(err) => service_error("Failed to delete todo", err),
    }
}

#[post("/todos/{id}/complete")]
pub async fn complete_todo(
    id: web::Path<i32>,
    user: ActingUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match todo_service::complete_todo(repo.get_ref(), user.id(), id.into_inner(), local_now()) {
        Ok(todo) => ok(todo),
        Err(err) => service_error("Failed to complete todo", err),
    }
}

#[post("/todos/{id}/cancel")]
pub async fn cancel_todo(
    id: web::Path<i32>,
    user: ActingUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match todo_service::cancel_todo(repo.get_ref(), user.id(), id.into_inner(), local_now()) {
        Ok(todo) => ok(todo),
        Err(err) => service_error("Failed to cancel todo", err),
    }
}

/// Audit trail of a todo, newest entry first.
#[get("/todos/{id}/logs")]
pub async fn todo_logs(id: web::Path<i32>, repo: web::Data<DieselRepository>) -> impl Responder {
    match todo_service::list_todo_logs(repo.get_ref(), id.into_inner()) {
        Ok(logs) => ok(logs),
        Err(err) => service_error("Failed to list todo logs", err),
    }
}
