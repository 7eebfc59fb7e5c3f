//! Integration tests for evolution records and physical evaluations

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

fn note(student: &Value, instructor: &Value, date: &str, rating: i32) -> Value {
    json!({
        "student_id": student["id"],
        "instructor_id": instructor["id"],
        "date": date,
        "focus": "Core e respiração",
        "exercises_performed": ["Hundred", "Roll up"],
        "overall_rating": rating,
    })
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_sessions_are_numbered_per_student() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let instructor = app.create_instructor().await;

    let mut sessions = Vec::new();
    for (date, rating) in [("2030-06-03", 3), ("2030-06-10", 5)] {
        let (status, body) = app
            .post("/api/v1/evolution-records", &note(&student, &instructor, date, rating))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let record: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(record["duration_minutes"], 60);
        sessions.push(record["session"].as_i64().unwrap());
    }
    assert_eq!(sessions, vec![1, 2]);

    let student_id = student["id"].as_str().unwrap();
    let next = app
        .get_json(&format!(
            "/api/v1/evolution-records/student/{}/next-session",
            student_id
        ))
        .await;
    assert_eq!(next["next_session"], 3);

    let average = app
        .get_json(&format!(
            "/api/v1/evolution-records/student/{}/average-rating",
            student_id
        ))
        .await;
    assert_eq!(average["average_rating"], 4.0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_reused_session_number_is_conflict() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let instructor = app.create_instructor().await;

    let mut body = note(&student, &instructor, "2030-06-03", 4);
    body["session"] = json!(7);
    let (status, _) = app.post("/api/v1/evolution-records", &body).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = app.post("/api/v1/evolution-records", &body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(response.contains("Session number already used"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_keeps_session_number() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let instructor = app.create_instructor().await;

    let (_, body) = app
        .post("/api/v1/evolution-records", &note(&student, &instructor, "2030-06-03", 3))
        .await;
    let record: Value = serde_json::from_str(&body).unwrap();

    let mut replacement = note(&student, &instructor, "2030-06-04", 4);
    replacement["focus"] = json!("Mobilidade de quadril");
    let (status, body) = app
        .put(
            &format!("/api/v1/evolution-records/{}", record["id"].as_str().unwrap()),
            &replacement,
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let updated: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(updated["session"], record["session"]);
    assert_eq!(updated["focus"], "Mobilidade de quadril");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_rating_out_of_range_is_rejected() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let instructor = app.create_instructor().await;

    let (status, body) = app
        .post("/api/v1/evolution-records", &note(&student, &instructor, "2030-06-03", 6))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["field"], "overall_rating");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_history_of_unknown_student_is_not_found() {
    let app = common::TestApp::new().await;

    let (status, _) = app
        .get("/api/v1/evolution-records/student/00000000-0000-0000-0000-000000000000/history")
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_evaluation_derives_bmi() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let instructor = app.create_instructor().await;

    let body = json!({
        "student_id": student["id"],
        "instructor_id": instructor["id"],
        "date": "2030-06-01",
        "evaluation_type": "initial",
        "weight_kg": "70.0",
        "height_m": "1.75",
        "strength": { "core": 3, "grip": 4 },
        "balance": { "static": 2 },
    });
    let (status, response) = app.post("/api/v1/physical-evaluations", &body).await;

    assert_eq!(status, StatusCode::CREATED, "{}", response);
    let evaluation: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(evaluation["bmi"], "22.9");
    assert_eq!(evaluation["bmi_category"], "normal");
    assert_eq!(evaluation["balance"]["static"], 2);
    assert_eq!(evaluation["strength"]["grip"], 4);

    let count = app
        .get_json("/api/v1/physical-evaluations/type/initial")
        .await;
    assert!(count
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["id"] == evaluation["id"]));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_evaluation_with_nested_error_names_the_path() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let instructor = app.create_instructor().await;

    let body = json!({
        "student_id": student["id"],
        "instructor_id": instructor["id"],
        "date": "2030-06-01",
        "weight_kg": "70.0",
        "height_m": "1.75",
        "strength": { "core": 9 },
    });
    let (status, response) = app.post("/api/v1/physical-evaluations", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(json["error"]["field"], "strength.core");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_implausible_anthropometrics_are_bad_requests() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let instructor = app.create_instructor().await;

    for (weight, height, field) in [
        ("70.0", "0.05", "height_m"),
        ("70.0", "0.001", "height_m"),
        ("12000", "1.75", "weight_kg"),
    ] {
        let body = json!({
            "student_id": student["id"],
            "instructor_id": instructor["id"],
            "date": "2030-06-01",
            "weight_kg": weight,
            "height_m": height,
        });
        let (status, response) = app.post("/api/v1/physical-evaluations", &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{} / {}: {}", weight, height, response);
        let json: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(json["error"]["field"], field);
    }
}
