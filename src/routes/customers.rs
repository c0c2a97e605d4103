use actix_multipart::form::MultipartForm;
use actix_web::http::header::CONTENT_DISPOSITION;
use actix_web::{HttpResponse, Responder, delete, get, post, put, web};

use crate::domain::local_now;
use crate::dto::customer::{CustomerQuery, SpecialCustomerQuery};
use crate::forms::customer::{
    CustomerForm, CustomerSearchForm, FavorsForm, ImportCustomersForm, RemarkForm, SystemTagsForm,
};
use crate::repository::DieselRepository;
use crate::routes::{ActingUser, ok, ok_page, service_error};
use crate::services::customer as customer_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_customers)
        .service(create_customer)
        .service(search_customers)
        .service(special_customers)
        .service(import_customers)
        .service(export_customers)
        .service(get_customer)
        .service(update_customer)
        .service(delete_customer)
        .service(update_favors)
        .service(update_remark)
        .service(update_system_tags);
}

#[get("/customers")]
pub async fn list_customers(
    repo: web::Data<DieselRepository>,
    params: web::Query<CustomerQuery>,
) -> impl Responder {
    match customer_service::list_customers(repo.get_ref(), params.into_inner()) {
        Ok(page) => ok_page(page),
        Err(err) => service_error("Failed to list customers", err),
    }
}

#[post("/customers")]
pub async fn create_customer(
    user: ActingUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CustomerForm>,
) -> impl Responder {
    match customer_service::create_customer(repo.get_ref(), user.id(), form) {
        Ok(customer) => ok(customer),
        Err(err) => service_error("Failed to create customer", err),
    }
}

#[post("/customers/search")]
pub async fn search_customers(
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CustomerSearchForm>,
) -> impl Responder {
    match customer_service::search_customers(repo.get_ref(), form) {
        Ok(page) => ok_page(page),
        Err(err) => service_error("Failed to search customers", err),
    }
}

/// Segments: `no_order_half_year`, `never_ordered`.
#[get("/customers/special")]
pub async fn special_customers(
    repo: web::Data<DieselRepository>,
    params: web::Query<SpecialCustomerQuery>,
) -> impl Responder {
    match customer_service::special_customers(repo.get_ref(), params.into_inner(), local_now()) {
        Ok(page) => ok_page(page),
        Err(err) => service_error("Failed to list special customers", err),
    }
}

#[post("/customers/import")]
pub async fn import_customers(
    user: ActingUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<ImportCustomersForm>,
) -> impl Responder {
    match customer_service::import_customers(repo.get_ref(), user.id(), &form) {
        Ok(summary) => ok(summary),
        Err(err) => service_error("Failed to import customers", err),
    }
}

#[get("/customers/export")]
pub async fn export_customers(repo: web::Data<DieselRepository>) -> impl Responder {
    match customer_service::export_customers(repo.get_ref()) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((CONTENT_DISPOSITION, "attachment; filename=\"customers.csv\""))
            .body(bytes),
        Err(err) => service_error("Failed to export customers", err),
    }
}

#[get("/customers/{id}")]
pub async fn get_customer(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match customer_service::get_customer(repo.get_ref(), id.into_inner()) {
        Ok(customer) => ok(customer),
        Err(err) => service_error("Failed to get customer", err),
    }
}

#[put("/customers/{id}")]
pub async fn update_customer(
    id: web::Path<i32>,
    user: ActingUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CustomerForm>,
) -> impl Responder {
    match customer_service::update_customer(repo.get_ref(), user.id(), id.into_inner(), form) {
        Ok(customer) => ok(customer),
        Err(err) => service_error("Failed to update customer", err),
    }
}

#[delete("/customers/{id}")]
pub async fn delete_customer(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match customer_service::delete_customer(repo.get_ref(), id.into_inner()) {
        Ok(()) => ok(()),
        Err(err) => service_error("Failed to delete customer", err),
    }
}

#[put("/customers/{id}/favors")]
pub async fn update_favors(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<FavorsForm>,
) -> impl Responder {
    match customer_service::update_favors(repo.get_ref(), id.into_inner(), form) {
        Ok(customer) => ok(customer),
        Err(err) => service_error("Failed to update favors", err),
    }
}

#[put("/customers/{id}/remark")]
pub async fn update_remark(
    id: web::Path<i32>,
    user: ActingUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<RemarkForm>,
) -> impl Responder {
    match customer_service::update_remark(repo.get_ref(), user.id(), id.into_inner(), form) {
        Ok(customer) => ok(customer),
        Err(err) => service_error("Failed to update remark", err),
    }
}

#[put("/customers/{id}/system-tags")]
pub async fn update_system_tags(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<SystemTagsForm>,
) -> impl Responder {
    match customer_service::update_system_tags(repo.get_ref(), id.into_inner(), form) {
        Ok(customer) => ok(customer),
        Err(err) => service_error("Failed to update system tags", err),
    }
}
