mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::TestServer;

#[tokio::test]
async fn filters_by_status_type_and_station() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (status, body) = server.get("/api/alerts", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["data"][0]["id"], "alert-2");

    let (_, body) = server.get("/api/alerts?status=active", &token).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], "alert-1");

    let (_, body) = server.get("/api/alerts?type=airQuality", &token).await?;
    assert_eq!(body["data"][0]["id"], "alert-3");
    assert_eq!(body["data"][0]["type"], "airQuality");

    let (_, body) = server.get("/api/alerts?stationId=station-2", &token).await?;
    assert_eq!(body["data"][0]["currentValue"], 64.5);

    let (status, body) = server.get("/api/alerts?status=snoozed", &token).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E004");
    Ok(())
}

#[tokio::test]
async fn create_starts_active() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (status, body) = server
        .post(
            "/api/alerts",
            &token,
            json!({"stationId": "station-1", "type": "rainfall", "threshold": 40.0, "currentValue": 41.2}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["type"], "rainfall");

    let (status, _) = server
        .post(
            "/api/alerts",
            &token,
            json!({"stationId": "station-1", "type": "wind", "threshold": 40.0, "currentValue": 41.2}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .post("/api/alerts", &token, json!({"stationId": "station-1"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 3);
    Ok(())
}

#[tokio::test]
async fn update_changes_status_only() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (status, body) = server
        .put("/api/alerts/alert-1", &token, json!({"status": "acknowledged"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "acknowledged");
    assert_eq!(body["data"]["threshold"], 30.0);

    let (status, body) = server
        .put("/api/alerts/alert-2", &token, json!({"status": "closed"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E004");
    let (_, body) = server.get("/api/alerts/alert-2", &token).await?;
    assert_eq!(body["data"]["status"], "acknowledged");

    let (status, body) = server.put("/api/alerts/alert-1", &token, json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Status is required");

    let (status, body) = server
        .put("/api/alerts/alert-77", &token, json!({"status": "resolved"}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Sensor alert not found");

    let (status, _) = server.delete("/api/alerts/alert-1", &token).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.get("/api/alerts/alert-1", &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
