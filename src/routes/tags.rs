use actix_web::{Responder, delete, get, post, put, web};

use crate::dto::tag::TagQuery;
use crate::forms::tag::{CreateDimensionForm, CreateTagForm, UpdateDimensionForm, UpdateTagForm};
use crate::repository::DieselRepository;
use crate::routes::{ok, ok_page, service_error};
use crate::services::tag as tag_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_dimensions)
        .service(create_dimension)
        .service(get_dimension)
        .service(update_dimension)
        .service(delete_dimension)
        .service(list_tags)
        .service(create_tag)
        .service(active_tags)
        .service(tags_by_dimension)
        .service(get_tag)
        .service(update_tag)
        .service(delete_tag);
}

#[get("/tag-dimensions")]
pub async fn list_dimensions(repo: web::Data<DieselRepository>) -> impl Responder {
    match tag_service::list_dimensions_with_tags(repo.get_ref()) {
        Ok(dimensions) => ok(dimensions),
        Err(err) => service_error("Failed to list tag dimensions", err),
    }
}

#[post("/tag-dimensions")]
pub async fn create_dimension(
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateDimensionForm>,
) -> impl Responder {
    match tag_service::create_dimension(repo.get_ref(), form) {
        Ok(dimension) => ok(dimension),
        Err(err) => service_error("Failed to create tag dimension", err),
    }
}

#[get("/tag-dimensions/{id}")]
pub async fn get_dimension(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match tag_service::get_dimension(repo.get_ref(), id.into_inner()) {
        Ok(dimension) => ok(dimension),
        Err(err) => service_error("Failed to get tag dimension", err),
    }
}

#[put("/tag-dimensions/{id}")]
pub async fn update_dimension(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateDimensionForm>,
) -> impl Responder {
    match tag_service::update_dimension(repo.get_ref(), id.into_inner(), form) {
        Ok(dimension) => ok(dimension),
        Err(err) => service_error("Failed to update tag dimension", err),
    }
}

/// Removes the dimension and every tag under it.
#[delete("/tag-dimensions/{id}")]
pub async fn delete_dimension(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match tag_service::delete_dimension(repo.get_ref(), id.into_inner()) {
        Ok(()) => ok(()),
        Err(err) => service_error("Failed to delete tag dimension", err),
    }
}

#[get("/tags")]
pub async fn list_tags(
    repo: web::Data<DieselRepository>,
    params: web::Query<TagQuery>,
) -> impl Responder {
    match tag_service::list_tags(repo.get_ref(), params.into_inner()) {
        Ok(page) => ok_page(page),
        Err(err) => service_error("Failed to list tags", err),
    }
}

#[post("/tags")]
pub async fn create_tag(
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateTagForm>,
) -> impl Responder {
    match tag_service::create_tag(repo.get_ref(), form) {
        Ok(tag) => ok(tag),
        Err(err) => service_error("Failed to create tag", err),
    }
}

#[get("/tags/active")]
pub async fn active_tags(repo: web::Data<DieselRepository>) -> impl Responder {
    match tag_service::list_active_tags(repo.get_ref()) {
        Ok(tags) => ok(tags),
        Err(err) => service_error("Failed to list active tags", err),
    }
}

#[get("/tags/dimension/{dimension_id}")]
pub async fn tags_by_dimension(
    dimension_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match tag_service::tags_by_dimension(repo.get_ref(), dimension_id.into_inner()) {
        Ok(tags) => ok(tags),
        Err(err) => service_error("Failed to list dimension tags", err),
    }
}

#[get("/tags/{id}")]
pub async fn get_tag(id: web::Path<i32>, repo: web::Data<DieselRepository>) -> impl Responder {
    match tag_service::get_tag(repo.get_ref(), id.into_inner()) {
        Ok(tag) => ok(tag),
        Err(err) => service_error("Failed to get tag", err),
    }
}

#[put("/tags/{id}")]
pub async fn update_tag(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateTagForm>,
) -> impl Responder {
    match tag_service::update_tag(repo.get_ref(), id.into_inner(), form) {
        Ok(tag) => ok(tag),
        Err(err) => service_error("Failed to update tag", err),
    }
}

#[delete("/tags/{id}")]
pub async fn delete_tag(id: web::Path<i32>, repo: web::Data<DieselRepository>) -> impl Responder {
    match tag_service::delete_tag(repo.get_ref(), id.into_inner()) {
        Ok(()) => ok(()),
        Err(err) => service_error("Failed to delete tag", err),
    }
}
