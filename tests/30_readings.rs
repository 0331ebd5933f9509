mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

fn ids(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn lists_newest_first() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (status, body) = server.get("/api/readings", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["reading-2", "reading-3", "reading-1", "reading-4"]);
    assert_eq!(body["data"][0]["airQuality"], 55.0);
    Ok(())
}

#[tokio::test]
async fn filters_by_station_and_date_window() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (_, body) = server.get("/api/readings?stationId=station-1", &token).await?;
    assert_eq!(ids(&body), vec!["reading-2", "reading-1"]);

    // endDate includes the whole of the named day
    let (_, body) = server
        .get("/api/readings?startDate=2024-01-15&endDate=2024-01-15", &token)
        .await?;
    assert_eq!(ids(&body), vec!["reading-3", "reading-1"]);

    let (status, body) = server.get("/api/readings?startDate=yesterday", &token).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E9006");

    let (status, _) = server.get("/api/readings?stationId=station-42", &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn create_checks_ranges_and_station() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (status, body) = server
        .post(
            "/api/readings",
            &token,
            json!({
                "stationId": "station-2",
                "temperature": 30.0,
                "humidity": 120.0,
                "airQuality": 600.0,
                "rainfall": -1.0
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 3);

    let (status, body) = server
        .post(
            "/api/readings",
            &token,
            json!({
                "stationId": "station-404",
                "temperature": 30.0,
                "humidity": 70.0,
                "airQuality": 60.0,
                "rainfall": 0.0
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Weather station not found");

    let (status, body) = server
        .post(
            "/api/readings",
            &token,
            json!({
                "stationId": "station-2",
                "temperature": 30.5,
                "humidity": 70.0,
                "airQuality": 60.0,
                "rainfall": 2.5
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(body["data"]["recordedAt"].is_string());

    // Fresh readings sort ahead of the seeded history
    let (_, body) = server.get("/api/readings?limit=1", &token).await?;
    assert_eq!(body["data"][0]["id"], id.as_str());
    assert_eq!(body["pagination"]["total"], 5);
    Ok(())
}

#[tokio::test]
async fn get_and_delete_by_id() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = server.get("/api/readings/reading-4", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stationId"], "station-3");

    let (status, _) = server.delete("/api/readings/reading-4", &token).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.delete("/api/readings/reading-4", &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Sensor reading not found");
    Ok(())
}
