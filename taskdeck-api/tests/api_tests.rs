/// HTTP tests for the Taskdeck API
///
/// These drive the full router against the in-memory store:
/// - user registration, lookup, login, and conflicts
/// - task, category, and reminder CRUD with their 404s
/// - duplicate category and reminder window rules
/// - statistics and the tasks-with-reminders listing
/// - error envelopes and response headers

mod common;

use axum::http::{header, Method, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use common::TestContext;
use serde_json::json;

#[tokio::test]
async fn test_user_registration_lookup_and_duplicate() {
    let ctx = TestContext::new();

    let response = ctx
        .post(
            "/api/users",
            json!({
                "username": "alice",
                "password": "p1",
                "email": "a@x.com",
                "full_name": "Alice A",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let user = &response.body["user"];
    let user_id = user["user_id"].as_i64().unwrap();
    assert!(user_id > 0);
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());

    let response = ctx.get(&format!("/api/users/{}", user_id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "User retrieved successfully");
    assert_eq!(response.body["user"]["username"], "alice");
    assert_eq!(response.body["user"]["email"], "a@x.com");
    assert_eq!(response.body["user"]["full_name"], "Alice A");

    let response = ctx
        .post(
            "/api/users",
            json!({
                "username": "alice",
                "password": "p2",
                "email": "other@x.com",
                "full_name": "Alice B",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "Username already exists");
}

#[tokio::test]
async fn test_registration_validation() {
    let ctx = TestContext::new();

    let response = ctx
        .post(
            "/api/users",
            json!({
                "username": "bob",
                "password": "pw",
                "email": "not-an-email",
                "full_name": "Bob",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["details"][0]["field"], "email");

    let response = ctx
        .post("/api/users", json!({ "username": "bob", "email": "b@x.com" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_login_success_and_uniform_failures() {
    let ctx = TestContext::new();
    ctx.post(
        "/api/users",
        json!({
            "username": "alice",
            "password": "p1",
            "email": "a@x.com",
            "full_name": "Alice A",
        }),
    )
    .await;

    let response = ctx
        .post("/api/users/login", json!({ "username": "alice", "password": "p1" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Login successful");
    assert_eq!(response.body["user"]["username"], "alice");
    assert!(response.body["user"]["last_login"].is_string());
    assert!(response.body["user"].get("password_hash").is_none());

    let wrong_password = ctx
        .post("/api/users/login", json!({ "username": "alice", "password": "nope" }))
        .await;
    let unknown_user = ctx
        .post("/api/users/login", json!({ "username": "mallory", "password": "p1" }))
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_user_update_and_delete() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;
    let other_id = ctx.create_user().await;
    let other = ctx.get(&format!("/api/users/{}", other_id)).await.body["user"].clone();

    let response = ctx
        .put(
            &format!("/api/users/{}", user_id),
            json!({ "username": "renamed", "email": "renamed@x.com", "full_name": "Re Named" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "User updated successfully");
    assert_eq!(response.body["user"]["username"], "renamed");

    let response = ctx
        .put(
            &format!("/api/users/{}", user_id),
            json!({ "username": "renamed", "email": other["email"], "full_name": "Re Named" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "Email already exists");

    let response = ctx.delete(&format!("/api/users/{}", user_id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "User deleted successfully");

    let response = ctx.get(&format!("/api/users/{}", user_id)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "User not found");
}

#[tokio::test]
async fn test_missing_rows_are_not_found() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;

    for uri in [
        "/api/users/999",
        "/api/tasks/999",
        "/api/categories/999",
        "/api/reminders/999",
    ] {
        assert_eq!(ctx.get(uri).await.status, StatusCode::NOT_FOUND, "GET {}", uri);
        assert_eq!(ctx.delete(uri).await.status, StatusCode::NOT_FOUND, "DELETE {}", uri);
    }

    let response = ctx
        .put(
            "/api/tasks/999",
            json!({ "title": "t", "description": "d", "status": "Completed" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = ctx
        .put("/api/categories/999", json!({ "category_name": "Work" }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = ctx
        .put(
            "/api/reminders/999",
            json!({ "reminder_time": Utc::now(), "user_id": user_id }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // nothing was created along the way
    let tasks = ctx.get(&format!("/api/users/{}/tasks", user_id)).await;
    assert_eq!(tasks.body, json!([]));
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let ctx = TestContext::new();

    let response = ctx.get("/api/tasks/abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid ID");
}

#[tokio::test]
async fn test_task_crud_round_trip() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;
    let deadline = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();

    let before = Utc::now();
    let response = ctx
        .post(
            "/api/tasks",
            json!({
                "title": "Ship release",
                "description": "Tag and publish",
                "deadline": deadline,
                "priority": "High",
                "user_id": user_id,
                "category_id": 0,
            }),
        )
        .await;
    let after = Utc::now();
    assert_eq!(response.status, StatusCode::CREATED);
    let task_id = response.body["task_id"].as_i64().unwrap();
    assert!(task_id > 0);
    assert_eq!(response.body["status"], "Pending");
    assert!(response.body["category_id"].is_null());

    let response = ctx.get(&format!("/api/tasks/{}", task_id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Ship release");
    assert_eq!(response.body["description"], "Tag and publish");
    assert_eq!(response.body["priority"], "High");
    assert_eq!(response.body["user_id"], user_id);
    let stored_deadline: chrono::DateTime<Utc> =
        serde_json::from_value(response.body["deadline"].clone()).unwrap();
    assert_eq!(stored_deadline, deadline);
    let created_at: chrono::DateTime<Utc> =
        serde_json::from_value(response.body["created_at"].clone()).unwrap();
    assert!(before <= created_at && created_at <= after);

    let response = ctx
        .put(
            &format!("/api/tasks/{}", task_id),
            json!({
                "title": "Ship release",
                "description": "Tag and publish",
                "priority": "Low",
                "status": "In Progress",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "In Progress");
    assert_eq!(response.body["priority"], "Low");
    let kept_deadline: chrono::DateTime<Utc> =
        serde_json::from_value(response.body["deadline"].clone()).unwrap();
    assert_eq!(kept_deadline, deadline);

    let response = ctx.get(&format!("/api/users/{}/tasks", user_id)).await;
    assert_eq!(response.body.as_array().unwrap().len(), 1);

    let response = ctx.delete(&format!("/api/tasks/{}", task_id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Task deleted successfully");
}

#[tokio::test]
async fn test_task_with_unknown_owner_or_category_is_bad_request() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;

    let response = ctx
        .post(
            "/api/tasks",
            json!({ "title": "t", "description": "d", "user_id": 4242 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx
        .post(
            "/api/tasks",
            json!({ "title": "t", "description": "d", "user_id": user_id, "category_id": 77 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Referenced category does not exist");
}

#[tokio::test]
async fn test_overlong_labels_are_validation_errors() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;

    let response = ctx
        .post(
            "/api/tasks",
            json!({
                "title": "t",
                "description": "d",
                "priority": "x".repeat(60),
                "status": "y".repeat(60),
                "user_id": user_id,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = response.body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["priority", "status"]);

    let task_id = ctx.create_task(user_id, "Pending").await;
    let response = ctx
        .put(
            &format!("/api/tasks/{}", task_id),
            json!({ "title": "t", "description": "d", "priority": "x".repeat(51) }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx
        .post(
            "/api/categories",
            json!({ "category_name": "Work", "color": "c".repeat(40), "user_id": user_id }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["details"][0]["field"], "color");

    let response = ctx.get(&format!("/api/users/{}/tasks", user_id)).await;
    assert_eq!(response.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_category_is_conflict() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;
    let body = json!({
        "category_name": "Work",
        "color": "#FF5733",
        "user_id": user_id,
        "description": "Office things",
    });

    let response = ctx.post("/api/categories", body.clone()).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let category_id = response.body["category_id"].as_i64().unwrap();

    let response = ctx.post("/api/categories", body).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "Category already exists");

    let response = ctx.get(&format!("/api/users/{}/categories", user_id)).await;
    assert_eq!(response.body.as_array().unwrap().len(), 1);

    let response = ctx
        .put(
            &format!("/api/categories/{}", category_id),
            json!({ "category_name": "Work", "color": "#000000", "description": "" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["color"], "#000000");
}

#[tokio::test]
async fn test_deleting_category_uncategorizes_task() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;
    let category = ctx
        .post(
            "/api/categories",
            json!({ "category_name": "Home", "user_id": user_id }),
        )
        .await;
    let category_id = category.body["category_id"].as_i64().unwrap();

    let task = ctx
        .post(
            "/api/tasks",
            json!({ "title": "t", "description": "d", "user_id": user_id, "category_id": category_id }),
        )
        .await;
    assert_eq!(task.body["category_id"], category_id);
    let task_id = task.body["task_id"].as_i64().unwrap();

    let response = ctx.delete(&format!("/api/categories/{}", category_id)).await;
    assert_eq!(response.body["message"], "Category deleted successfully");

    let task = ctx.get(&format!("/api/tasks/{}", task_id)).await;
    assert!(task.body["category_id"].is_null());
}

#[tokio::test]
async fn test_reminder_window() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;
    let task_id = ctx.create_task(user_id, "Pending").await;
    let at = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();

    let reminder = |offset_secs: i64| {
        json!({
            "task_id": task_id,
            "user_id": user_id,
            "reminder_time": at + Duration::seconds(offset_secs),
        })
    };

    let response = ctx.post("/api/reminders", reminder(0)).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.body["id"].as_i64().unwrap() > 0);
    assert_eq!(response.body["is_sent"], false);

    let response = ctx.post("/api/reminders", reminder(60)).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = ctx.post("/api/reminders", reminder(-60)).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = ctx.post("/api/reminders", reminder(61)).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = ctx.get(&format!("/api/tasks/{}/reminders", task_id)).await;
    assert_eq!(response.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reminder_update_and_delete() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;
    let task_id = ctx.create_task(user_id, "Pending").await;
    let at = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();

    let created = ctx
        .post(
            "/api/reminders",
            json!({ "task_id": task_id, "user_id": user_id, "reminder_time": at }),
        )
        .await;
    let reminder_id = created.body["id"].as_i64().unwrap();

    let moved = at + Duration::hours(1);
    let response = ctx
        .put(
            &format!("/api/reminders/{}", reminder_id),
            json!({ "reminder_time": moved, "is_sent": true, "user_id": user_id }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_sent"], true);

    let response = ctx.get(&format!("/api/reminders/{}", reminder_id)).await;
    let stored: chrono::DateTime<Utc> =
        serde_json::from_value(response.body["reminder_time"].clone()).unwrap();
    assert_eq!(stored, moved);

    let response = ctx.delete(&format!("/api/reminders/{}", reminder_id)).await;
    assert_eq!(response.body["message"], "Reminder deleted successfully");
}

#[tokio::test]
async fn test_tasks_with_reminders_lists_each_task_once() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;
    let with_reminders = ctx.create_task(user_id, "Pending").await;
    let _without = ctx.create_task(user_id, "Pending").await;
    let at = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();

    for hours in 0..3 {
        let response = ctx
            .post(
                "/api/reminders",
                json!({
                    "task_id": with_reminders,
                    "user_id": user_id,
                    "reminder_time": at + Duration::hours(hours),
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let response = ctx
        .get(&format!("/api/users/{}/tasks-with-reminders", user_id))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let tasks = response.body.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["task_id"], with_reminders);
}

#[tokio::test]
async fn test_statistics_for_user_without_tasks() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;

    let response = ctx.get(&format!("/api/users/{}/statistics", user_id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "user_id": user_id,
            "total_tasks": 0,
            "completed_tasks": 0,
            "in_progress_tasks": 0,
            "pending_tasks": 0,
            "overdue_tasks": 0,
            "tasks_by_month": {},
            "completed_by_month": {},
        })
    );
}

#[tokio::test]
async fn test_statistics_by_month() {
    let ctx = TestContext::new();
    let user_id = ctx.create_user().await;

    let jan = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
    let mar = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
    let layout = [
        (jan, "Completed"),
        (jan, "Pending"),
        (mar, "In Progress"),
    ];
    for (created_at, status) in layout {
        let response = ctx
            .post(
                "/api/tasks",
                json!({
                    "title": "t",
                    "description": "d",
                    "deadline": created_at + Duration::days(7),
                    "status": status,
                    "user_id": user_id,
                }),
            )
            .await;
        let task_id = response.body["task_id"].as_i64().unwrap();
        assert!(ctx.store.backdate_task(task_id, created_at).await);
    }

    let response = ctx.get(&format!("/api/users/{}/statistics", user_id)).await;
    assert_eq!(response.status, StatusCode::OK);

    let stats = &response.body;
    assert_eq!(stats["total_tasks"], 3);
    assert_eq!(stats["completed_tasks"], 1);
    assert_eq!(stats["in_progress_tasks"], 1);
    assert_eq!(stats["pending_tasks"], 1);
    // every deadline is in the past; only the completed task is not overdue
    assert_eq!(stats["overdue_tasks"], 2);
    assert_eq!(stats["tasks_by_month"], json!({ "Jan": 2, "Mar": 1 }));
    assert_eq!(stats["completed_by_month"], json!({ "Jan": 1, "Mar": 0 }));
}

#[tokio::test]
async fn test_json_responses_declare_utf8() {
    let ctx = TestContext::new();

    let ok = ctx.get("/health").await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["status"], "healthy");
    assert_eq!(
        ok.headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json; charset=utf-8"
    );

    let missing = ctx.get("/api/nope").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(
        missing.headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json; charset=utf-8"
    );
    assert_eq!(missing.body["error"], "Route not found");
}

#[tokio::test]
async fn test_wrong_method_is_json_error() {
    let ctx = TestContext::new();

    let response = ctx.send(Method::PATCH, "/api/tasks/1", None).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json; charset=utf-8"
    );
    assert_eq!(response.body["error"], "Method not allowed");
}
