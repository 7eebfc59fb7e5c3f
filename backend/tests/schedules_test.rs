//! Integration tests for bookings: conflicts, transitions and counters

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

fn id(value: &Value) -> &str {
    value["id"].as_str().unwrap()
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_book_class_with_defaults() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let instructor = app.create_instructor().await;

    let (status, body) = app
        .book(&student, &instructor, "2030-04-01", "07:00:00", "07:50:00")
        .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let schedule: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(schedule["status"], "scheduled");
    assert_eq!(schedule["payment_status"], "pending");
    assert_eq!(schedule["class_type"], "Pilates Solo");
    assert_eq!(schedule["room"], "Sala 1");
    assert_eq!(schedule["duration_minutes"], 50);
    assert_eq!(schedule["is_future"], true);
    assert_eq!(schedule["student_name"], student["name"]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_overlapping_booking_is_conflict() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let first = app.create_student().await;
    let second = app.create_student().await;

    let (status, _) = app
        .book(&first, &instructor, "2030-04-02", "08:00:00", "09:00:00")
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .book(&second, &instructor, "2030-04-02", "08:30:00", "09:30:00")
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("08:00 to 09:00"));

    // Back-to-back is fine
    let (status, _) = app
        .book(&second, &instructor, "2030-04-02", "09:00:00", "10:00:00")
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_cancelled_class_frees_the_slot() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let student = app.create_student().await;

    let (_, body) = app
        .book(&student, &instructor, "2030-04-03", "10:00:00", "11:00:00")
        .await;
    let schedule: Value = serde_json::from_str(&body).unwrap();

    let (status, _) = app
        .patch(
            &format!("/api/v1/schedules/{}/status", id(&schedule)),
            &json!({ "status": "cancelled" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .book(&student, &instructor, "2030-04-03", "10:00:00", "11:00:00")
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_completion_updates_counters_once() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let student = app.create_student().await;

    let (_, body) = app
        .book(&student, &instructor, "2030-04-04", "18:00:00", "19:00:00")
        .await;
    let schedule: Value = serde_json::from_str(&body).unwrap();
    let status_path = format!("/api/v1/schedules/{}/status", id(&schedule));

    for status in ["confirmed", "completed", "completed"] {
        let (code, response) = app.patch(&status_path, &json!({ "status": status })).await;
        assert_eq!(code, StatusCode::OK, "{}: {}", status, response);
    }

    let student = app
        .get_json(&format!("/api/v1/students/{}", id(&student)))
        .await;
    assert_eq!(student["total_classes"], 1);
    assert_eq!(student["last_class"], "2030-04-04T18:00:00");

    let instructor = app
        .get_json(&format!("/api/v1/instructors/{}", id(&instructor)))
        .await;
    assert_eq!(instructor["total_classes"], 1);
    assert_eq!(instructor["total_students"], 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_returning_student_does_not_count_as_new() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let student = app.create_student().await;

    for day in ["2030-04-08", "2030-04-09"] {
        let (_, body) = app
            .book(&student, &instructor, day, "08:00:00", "09:00:00")
            .await;
        let schedule: Value = serde_json::from_str(&body).unwrap();
        let (code, _) = app
            .patch(
                &format!("/api/v1/schedules/{}/status", id(&schedule)),
                &json!({ "status": "completed" }),
            )
            .await;
        assert_eq!(code, StatusCode::OK);
    }

    let instructor = app
        .get_json(&format!("/api/v1/instructors/{}", id(&instructor)))
        .await;
    assert_eq!(instructor["total_classes"], 2);
    assert_eq!(instructor["total_students"], 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_terminal_status_cannot_change() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let student = app.create_student().await;

    let (_, body) = app
        .book(&student, &instructor, "2030-04-05", "08:00:00", "09:00:00")
        .await;
    let schedule: Value = serde_json::from_str(&body).unwrap();
    let status_path = format!("/api/v1/schedules/{}/status", id(&schedule));

    let (code, _) = app.patch(&status_path, &json!({ "status": "no_show" })).await;
    assert_eq!(code, StatusCode::OK);

    let (code, _) = app.patch(&status_path, &json!({ "status": "completed" })).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_booking_unknown_student_is_not_found() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let ghost = json!({ "id": "00000000-0000-0000-0000-000000000000" });

    let (status, _) = app
        .book(&ghost, &instructor, "2030-04-06", "08:00:00", "09:00:00")
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_capacity_groups_by_slot() {
    let app = common::TestApp::new().await;
    let student = app.create_student().await;
    let first = app.create_instructor().await;
    let second = app.create_instructor().await;

    for instructor in [&first, &second] {
        let (status, _) = app
            .book(&student, instructor, "2031-01-07", "08:00:00", "09:00:00")
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let capacity = app.get_json("/api/v1/schedules/capacity/2031-01-07").await;
    let slot = capacity["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["slot"] == "08:00-09:00")
        .unwrap();
    assert!(slot["count"].as_i64().unwrap() >= 2);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_inverted_date_range_is_rejected() {
    let app = common::TestApp::new().await;

    let (status, body) = app
        .get("/api/v1/schedules/date-range?start_date=2030-05-10&end_date=2030-05-01")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("end_date"));
}

fn put_body(student: &Value, instructor: &Value, date: &str, start: &str, end: &str) -> Value {
    json!({
        "student_id": student["id"],
        "instructor_id": instructor["id"],
        "date": date,
        "start_time": start,
        "end_time": end,
    })
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_onto_own_window_is_allowed() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let student = app.create_student().await;

    let (_, body) = app
        .book(&student, &instructor, "2030-05-06", "08:00:00", "09:00:00")
        .await;
    let schedule: Value = serde_json::from_str(&body).unwrap();

    let mut replacement = put_body(&student, &instructor, "2030-05-06", "08:00:00", "09:00:00");
    replacement["notes"] = json!("Trazer meias antiderrapantes");
    let (status, body) = app
        .put(&format!("/api/v1/schedules/{}", id(&schedule)), &replacement)
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let updated: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(updated["notes"], "Trazer meias antiderrapantes");

    // Shrinking inside the old window is also fine
    let shorter = put_body(&student, &instructor, "2030-05-06", "08:15:00", "08:45:00");
    let (status, _) = app
        .put(&format!("/api/v1/schedules/{}", id(&schedule)), &shorter)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_into_other_class_is_conflict() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let student = app.create_student().await;

    let (status, _) = app
        .book(&student, &instructor, "2030-05-07", "08:00:00", "09:00:00")
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = app
        .book(&student, &instructor, "2030-05-07", "10:00:00", "11:00:00")
        .await;
    let second: Value = serde_json::from_str(&body).unwrap();

    let moved = put_body(&student, &instructor, "2030-05-07", "08:30:00", "09:30:00");
    let (status, body) = app
        .put(&format!("/api/v1/schedules/{}", id(&second)), &moved)
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("08:00 to 09:00"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_completion_through_update_counts_once() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let student = app.create_student().await;

    let (_, body) = app
        .book(&student, &instructor, "2030-05-08", "08:00:00", "09:00:00")
        .await;
    let schedule: Value = serde_json::from_str(&body).unwrap();
    let path = format!("/api/v1/schedules/{}", id(&schedule));

    let mut completed = put_body(&student, &instructor, "2030-05-08", "08:00:00", "09:00:00");
    completed["status"] = json!("completed");
    for _ in 0..2 {
        let (status, body) = app.put(&path, &completed).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    let student = app
        .get_json(&format!("/api/v1/students/{}", id(&student)))
        .await;
    assert_eq!(student["total_classes"], 1);
    let instructor = app
        .get_json(&format!("/api/v1/instructors/{}", id(&instructor)))
        .await;
    assert_eq!(instructor["total_classes"], 1);
    assert_eq!(instructor["total_students"], 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_illegal_transition_through_update_is_rejected() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let student = app.create_student().await;

    let (_, body) = app
        .book(&student, &instructor, "2030-05-09", "08:00:00", "09:00:00")
        .await;
    let schedule: Value = serde_json::from_str(&body).unwrap();
    let (code, _) = app
        .patch(
            &format!("/api/v1/schedules/{}/status", id(&schedule)),
            &json!({ "status": "cancelled" }),
        )
        .await;
    assert_eq!(code, StatusCode::OK);

    let mut reopened = put_body(&student, &instructor, "2030-05-09", "08:00:00", "09:00:00");
    reopened["status"] = json!("scheduled");
    let (status, _) = app
        .put(&format!("/api/v1/schedules/{}", id(&schedule)), &reopened)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_completed_class_keeps_its_participants() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let other_instructor = app.create_instructor().await;
    let student = app.create_student().await;

    let (_, body) = app
        .book(&student, &instructor, "2030-05-10", "08:00:00", "09:00:00")
        .await;
    let schedule: Value = serde_json::from_str(&body).unwrap();
    let (code, _) = app
        .patch(
            &format!("/api/v1/schedules/{}/status", id(&schedule)),
            &json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(code, StatusCode::OK);

    let moved = put_body(&student, &other_instructor, "2030-05-10", "08:00:00", "09:00:00");
    let (status, _) = app
        .put(&format!("/api/v1/schedules/{}", id(&schedule)), &moved)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let other = app
        .get_json(&format!("/api/v1/instructors/{}", id(&other_instructor)))
        .await;
    assert_eq!(other["total_classes"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires database"]
async fn test_concurrent_completions_count_pairing_once() {
    let app = common::TestApp::new().await;

    for round in 0..10 {
        let instructor = app.create_instructor().await;
        let student = app.create_student().await;

        let mut paths = Vec::new();
        for (start, end) in [("08:00:00", "09:00:00"), ("10:00:00", "11:00:00")] {
            let (status, body) = app
                .book(&student, &instructor, "2030-05-13", start, end)
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
            let schedule: Value = serde_json::from_str(&body).unwrap();
            paths.push(format!("/api/v1/schedules/{}/status", id(&schedule)));
        }

        let completed = json!({ "status": "completed" });
        let (first, second) = tokio::join!(
            app.patch(&paths[0], &completed),
            app.patch(&paths[1], &completed)
        );
        assert_eq!(first.0, StatusCode::OK, "{}", first.1);
        assert_eq!(second.0, StatusCode::OK, "{}", second.1);

        let instructor = app
            .get_json(&format!("/api/v1/instructors/{}", id(&instructor)))
            .await;
        assert_eq!(instructor["total_classes"], 2, "round {}", round);
        assert_eq!(instructor["total_students"], 1, "round {}", round);
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_schedule() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let student = app.create_student().await;

    let (_, body) = app
        .book(&student, &instructor, "2030-05-14", "08:00:00", "09:00:00")
        .await;
    let schedule: Value = serde_json::from_str(&body).unwrap();
    let path = format!("/api/v1/schedules/{}", id(&schedule));

    let (status, _) = app.delete(&path).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.delete(&path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_completed_and_revenue_stats() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let student = app.create_student().await;
    let range = "start_date=2033-07-01&end_date=2033-07-31";

    let completed_path = format!("/api/v1/schedules/stats/completed-classes?{}", range);
    let revenue_path = format!("/api/v1/schedules/stats/revenue?{}", range);
    let completed_before = app.get_json(&completed_path).await["count"].as_i64().unwrap();
    let revenue_before: f64 = app.get_json(&revenue_path).await["revenue"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    let mut body = put_body(&student, &instructor, "2033-07-04", "08:00:00", "09:00:00");
    body["price"] = json!("95.50");
    body["payment_status"] = json!("paid");
    body["status"] = json!("completed");
    let (status, response) = app.post("/api/v1/schedules", &body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", response);

    let completed = app.get_json(&completed_path).await;
    assert_eq!(completed["count"].as_i64().unwrap(), completed_before + 1);

    let revenue = app.get_json(&revenue_path).await;
    assert_eq!(revenue["start_date"], "2033-07-01");
    let revenue_after: f64 = revenue["revenue"].as_str().unwrap().parse().unwrap();
    assert!((revenue_after - revenue_before - 95.5).abs() < 1e-9);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_confirmed_today_counts_confirmed_classes() {
    let app = common::TestApp::new().await;
    let instructor = app.create_instructor().await;
    let student = app.create_student().await;
    let today = app.get_json("/api/v1/schedules/today").await;
    assert!(today.is_array());

    let before = app.get_json("/api/v1/schedules/stats/confirmed-today").await["count"]
        .as_i64()
        .unwrap();

    // Studio local date at the default offset
    let date = (chrono::Utc::now() - chrono::Duration::minutes(180))
        .date_naive()
        .to_string();
    let mut body = put_body(&student, &instructor, &date, "06:00:00", "06:30:00");
    body["status"] = json!("confirmed");
    let (status, response) = app.post("/api/v1/schedules", &body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", response);

    let after = app.get_json("/api/v1/schedules/stats/confirmed-today").await["count"]
        .as_i64()
        .unwrap();
    assert_eq!(after, before + 1);
}
