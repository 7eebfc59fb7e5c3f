//! Integration tests for student and instructor endpoints

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_student_applies_defaults() {
    let app = common::TestApp::new().await;

    let student = app.create_student().await;

    assert_eq!(student["status"], "active");
    assert_eq!(student["total_classes"], 0);
    assert!(student["last_class"].is_null());
    assert!(student["age"].as_i64().unwrap() >= 30);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_duplicate_student_email_is_conflict() {
    let app = common::TestApp::new().await;
    let mut body = common::student_body();
    let (status, _) = app.post("/api/v1/students", &body).await;
    assert_eq!(status, StatusCode::CREATED);

    // Same address in a different case
    let email = body["email"].as_str().unwrap().to_uppercase();
    body["email"] = Value::String(email);
    let (status, response) = app.post("/api/v1/students", &body).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(response.contains("Email already in use"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_invalid_student_reports_field() {
    let app = common::TestApp::new().await;
    let mut body = common::student_body();
    body["phone"] = json!("123");

    let (status, response) = app.post("/api/v1/students", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(json["error"]["field"], "phone");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_and_fetch_student_by_email() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let id = student["id"].as_str().unwrap();

    let mut body = common::student_body();
    body["email"] = student["email"].clone();
    body["status"] = json!("suspended");
    let (status, response) = app.put(&format!("/api/v1/students/{}", id), &body).await;
    assert_eq!(status, StatusCode::OK, "{}", response);

    let email = student["email"].as_str().unwrap();
    let fetched = app.get_json(&format!("/api/v1/students/email/{}", email)).await;
    assert_eq!(fetched["id"], student["id"]);
    assert_eq!(fetched["status"], "suspended");
    // Registration date survives a replace that omits it
    assert_eq!(fetched["registration_date"], student["registration_date"]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_search_students() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let email = student["email"].as_str().unwrap();

    let found = app
        .get_json(&format!("/api/v1/students?search={}", email))
        .await;

    let ids: Vec<&Value> = found.as_array().unwrap().iter().map(|s| &s["id"]).collect();
    assert_eq!(ids, vec![&student["id"]]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_student() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let path = format!("/api/v1/students/{}", student["id"].as_str().unwrap());

    let (status, _) = app.delete(&path).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_student_with_schedules_cannot_be_deleted() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let instructor = app.create_instructor().await;
    let (status, _) = app
        .book(&student, &instructor, "2030-03-04", "08:00:00", "09:00:00")
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .delete(&format!("/api/v1/students/{}", student["id"].as_str().unwrap()))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_instructor_lookup_by_formatted_cpf() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let cpf = instructor["cpf"].as_str().unwrap();
    assert_eq!(cpf.len(), 11);

    let formatted = format!("{}.{}.{}-{}", &cpf[0..3], &cpf[3..6], &cpf[6..9], &cpf[9..11]);
    let fetched = app
        .get_json(&format!("/api/v1/instructors/cpf/{}", formatted))
        .await;

    assert_eq!(fetched["id"], instructor["id"]);
    assert_eq!(fetched["total_students"], 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_duplicate_cpf_is_conflict() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;

    let mut body = common::instructor_body();
    body["cpf"] = instructor["cpf"].clone();
    let (status, response) = app.post("/api/v1/instructors", &body).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(response.contains("CPF already registered"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_invalid_cpf_is_rejected() {
    let app = common::TestApp::new().await;
    let mut body = common::instructor_body();
    body["cpf"] = json!("111.111.111-11");

    let (status, response) = app.post("/api/v1/instructors", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(json["error"]["field"], "cpf");
}
