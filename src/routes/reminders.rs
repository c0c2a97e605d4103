use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::local_now;
use crate::dto::reminder::{ReminderQuery, ReminderStatsQuery, TemplateQuery};
use crate::forms::reminder::{
    CreateReminderForm, CreateTemplateForm, ReminderConfigForm, UpdateReminderForm,
};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{ActingUser, ok, ok_page, service_error};
use crate::services::notifier::LogNotifier;
use crate::services::reminder as reminder_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_reminders)
        .service(create_reminder)
        .service(reminder_stats)
        .service(get_config)
        .service(update_config)
        .service(process_reminders)
        .service(list_templates)
        .service(create_template)
        .service(get_reminder)
        .service(update_reminder)
        .service(delete_reminder)
        .service(cancel_reminder);
}

#[get("/reminders")]
pub async fn list_reminders(
    repo: web::Data<DieselRepository>,
    params: web::Query<ReminderQuery>,
) -> impl Responder {
    match reminder_service::list_reminders(repo.get_ref(), params.into_inner()) {
        Ok(page) => ok_page(page),
        Err(err) => service_error("Failed to list reminders", err),
    }
}

#[post("/reminders")]
pub async fn create_reminder(
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateReminderForm>,
) -> impl Responder {
    match reminder_service::create_reminder(repo.get_ref(), form) {
        Ok(reminder) => ok(reminder),
        Err(err) => service_error("Failed to create reminder", err),
    }
}

#[get("/reminders/stats")]
pub async fn reminder_stats(
    repo: web::Data<DieselRepository>,
    params: web::Query<ReminderStatsQuery>,
) -> impl Responder {
    match reminder_service::reminder_stats(repo.get_ref(), params.into_inner(), local_now()) {
        Ok(stats) => ok(stats),
        Err(err) => service_error("Failed to count reminders", err),
    }
}

/// Reminder settings of the acting user, created with defaults on first read.
#[get("/reminders/config")]
pub async fn get_config(user: ActingUser, repo: web::Data<DieselRepository>) -> impl Responder {
    match reminder_service::get_reminder_config(repo.get_ref(), user.id()) {
        Ok(config) => ok(config),
        Err(err) => service_error("Failed to load reminder config", err),
    }
}

#[put("/reminders/config")]
pub async fn update_config(
    user: ActingUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ReminderConfigForm>,
) -> impl Responder {
    match reminder_service::update_reminder_config(repo.get_ref(), user.id(), form) {
        Ok(config) => ok(config),
        Err(err) => service_error("Failed to save reminder config", err),
    }
}

/// Runs one dispatch sweep and reports its counters.
#[post("/reminders/process")]
pub async fn process_reminders(
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    match reminder_service::dispatch_due_reminders(
        repo.get_ref(),
        &LogNotifier,
        local_now(),
        server_config.reminder_batch_size,
    ) {
        Ok(report) => ok(report),
        Err(err) => service_error("Failed to process reminders", err),
    }
}

#[get("/reminder-templates")]
pub async fn list_templates(
    repo: web::Data<DieselRepository>,
    params: web::Query<TemplateQuery>,
) -> impl Responder {
    match reminder_service::list_templates(repo.get_ref(), params.into_inner()) {
        Ok(templates) => ok(templates),
        Err(err) => service_error("Failed to list reminder templates", err),
    }
}

#[post("/reminder-templates")]
pub async fn create_template(
    user: ActingUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateTemplateForm>,
) -> impl Responder {
    match reminder_service::create_template(repo.get_ref(), user.id(), form) {
        Ok(template) => ok(template),
        Err(err) => service_error("Failed to create reminder template", err),
    }
}

#[get("/reminders/{id}")]
pub async fn get_reminder(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match reminder_service::get_reminder(repo.get_ref(), id.into_inner()) {
        Ok(reminder) => ok(reminder),
        Err(err) => service_error("Failed to get reminder", err),
    }
}

#[put("/reminders/{id}")]
pub async fn update_reminder(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateReminderForm>,
) -> impl Responder {
    match reminder_service::update_reminder(repo.get_ref(), id.into_inner(), form, local_now()) {
        Ok(reminder) => ok(reminder),
        Err(err) => service_error("Failed to update reminder", err),
    }
}

#[delete("/reminders/{id}")]
pub async fn delete_reminder(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match reminder_service::delete_reminder(repo.get_ref(), id.into_inner()) {
        Ok(()) => ok(()),
        Err(err) => service_error("Failed to delete reminder", err),
    }
}

#[post("/reminders/{id}/cancel")]
pub async fn cancel_reminder(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match reminder_service::cancel_reminder(repo.get_ref(), id.into_inner(), local_now()) {
        Ok(reminder) => ok(reminder),
        Err(err) => service_error("Failed to cancel reminder", err),
    }
}
