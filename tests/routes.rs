use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use crm_backend::configure_app;
use crm_backend::models::config::ServerConfig;
use crm_backend::repository::DieselRepository;

mod common;

fn server_config(default_user_id: i32) -> ServerConfig {
    ServerConfig {
        address: "127.0.0.1".into(),
        port: 0,
        database_url: String::new(),
        static_dir: "./static".into(),
        default_user_id,
        reminder_batch_size: 50,
    }
}

macro_rules! app {
    ($repo:expr, $default_user:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($repo.clone()))
                .app_data(web::Data::new(server_config($default_user)))
                .configure(|cfg| configure_app(cfg, "./static")),
        )
        .await
    };
}

fn seed(repo: &DieselRepository) -> i32 {
    common::seed_user(repo, "Operator").id.get()
}

#[actix_web::test]
async fn test_health_probe() {
    let test_db = common::TestDb::new("test_health_probe.db");
    let repo = test_db.repo();
    let app = app!(repo, 1);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"status": "ok"}));
}

#[actix_web::test]
async fn test_customer_lifecycle_envelopes() {
    let test_db = common::TestDb::new("test_customer_lifecycle_envelopes.db");
    let repo = test_db.repo();
    let user_id = seed(&repo);
    let app = app!(repo, user_id);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers")
        .set_json(json!({"name": "Tea House", "phones": ["138"], "city": "杭州"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["message"], "操作成功");
    assert_eq!(body["data"]["name"], "Tea House");
    assert_eq!(body["data"]["created_by"], user_id);
    let id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri("/api/v1/customers?page=1&page_size=10")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], id);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/customers/{id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/customers/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 3);
    assert!(body.get("data").is_none());
}

#[actix_web::test]
async fn test_invalid_input_is_reported_in_envelope() {
    let test_db = common::TestDb::new("test_invalid_input_is_reported_in_envelope.db");
    let repo = test_db.repo();
    let app = app!(repo, 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/customers/special?type=bad")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1);

    let req = test::TestRequest::post()
        .uri("/api/v1/dashboard/search")
        .set_json(json!({"time_filter": "明天"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 5);
}

#[actix_web::test]
async fn test_todo_flow_uses_acting_user_header() {
    let test_db = common::TestDb::new("test_todo_flow_uses_acting_user_header.db");
    let repo = test_db.repo();
    let default_user = seed(&repo);
    let operator = common::seed_user(&repo, "Second").id.get();
    let customer = common::seed_customer(&repo, "Shop").id.get();
    let app = app!(repo, default_user);

    let req = test::TestRequest::post()
        .uri("/api/v1/todos")
        .insert_header(("X-User-Id", operator.to_string()))
        .set_json(json!({
            "customer_id": customer,
            "title": "回访",
            "planned_time": "2030-01-01 09:00"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["creator_id"], operator);
    assert_eq!(body["data"]["executor_id"], operator);
    let todo = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/todos/{todo}/complete"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["status"], "completed");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/todos/{todo}/logs"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let logs = body["data"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["action"], "complete");
    assert_eq!(logs[0]["operator_id"], default_user);
    assert_eq!(logs[1]["action"], "create");

    let req = test::TestRequest::post()
        .uri("/api/v1/dashboard/search")
        .insert_header(("X-User-Id", "abc"))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_unknown_customer_todo_is_rejected() {
    let test_db = common::TestDb::new("test_unknown_customer_todo_is_rejected.db");
    let repo = test_db.repo();
    let user = seed(&repo);
    let app = app!(repo, user);

    let req = test::TestRequest::post()
        .uri("/api/v1/todos")
        .set_json(json!({
            "customer_id": 99,
            "title": "回访",
            "planned_time": "2030-01-01"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 5);
}

#[actix_web::test]
async fn test_huge_page_number_returns_empty_page() {
    let test_db = common::TestDb::new("test_huge_page_number_returns_empty_page.db");
    let repo = test_db.repo();
    let user = seed(&repo);
    common::seed_customer(&repo, "Shop");
    let app = app!(repo, user);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/customers?page={}&page_size=20", usize::MAX))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["total"], 1);
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
}
