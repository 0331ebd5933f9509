mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::TestServer;

#[tokio::test]
async fn list_filters_combine() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (status, body) = server.get("/api/tasks?projectId=1&priority=high", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = server.get("/api/tasks?projectId=1&status=in_progress", &token).await?;
    assert_eq!(body["data"][0]["title"], "Design API endpoints");

    let (_, body) = server.get("/api/tasks?assignedTo=2", &token).await?;
    assert_eq!(body["data"][0]["id"], 3);

    let (status, body) = server.get("/api/tasks?priority=critical", &token).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E005");
    Ok(())
}

#[tokio::test]
async fn create_applies_defaults_and_parses_due_date() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (status, body) = server
        .post(
            "/api/tasks",
            &token,
            json!({"title": "Bad date", "description": "x", "projectId": 1, "dueDate": "soon"}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E9006");

    let (status, _) = server
        .post(
            "/api/tasks",
            &token,
            json!({"title": "Bad priority", "description": "x", "projectId": 1, "priority": "critical"}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Rejected requests do not consume ids
    let (status, body) = server
        .post(
            "/api/tasks",
            &token,
            json!({"title": "Calibrate sensors", "description": "Station 2", "projectId": 1, "dueDate": "2024-02-01"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], 4);
    assert_eq!(body["data"]["status"], "todo");
    assert_eq!(body["data"]["priority"], "medium");
    assert!(body["data"]["dueDate"].as_str().unwrap().starts_with("2024-02-01T00:00:00"));
    Ok(())
}

#[tokio::test]
async fn put_clears_optional_fields_patch_keeps_them() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (status, body) = server
        .patch("/api/tasks/2", &token, json!({"status": "blocked"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "blocked");
    assert_eq!(body["data"]["assignedTo"], 1);
    assert!(body["data"]["dueDate"].is_string());

    let (status, body) = server
        .put(
            "/api/tasks/2",
            &token,
            json!({
                "title": "Design API endpoints",
                "description": "REST surface",
                "projectId": 1,
                "status": "completed",
                "priority": "low"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["priority"], "low");
    assert!(body["data"].get("assignedTo").is_none());
    assert!(body["data"].get("dueDate").is_none());

    let (status, body) = server.put("/api/tasks/2", &token, json!({"title": "Only"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 4);
    Ok(())
}

#[tokio::test]
async fn update_rejects_unknown_enum_values() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (status, body) = server
        .patch("/api/tasks/1", &token, json!({"priority": "critical", "title": "Renamed"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E005");

    let (status, body) = server.patch("/api/tasks/1", &token, json!({"status": "done"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E004");

    let (_, body) = server.get("/api/tasks/1", &token).await?;
    assert_eq!(body["data"]["priority"], "high");
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["title"], "Setup project structure");
    assert!(body["data"].get("updatedAt").is_none());
    Ok(())
}

#[tokio::test]
async fn rejects_bad_ids_and_missing_tasks() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (status, body) = server.get("/api/tasks/one", &token).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E9003");

    let (status, body) = server.delete("/api/tasks/42", &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "E404T");
    Ok(())
}
