mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

use common::{send, TestServer};

#[tokio::test]
async fn list_hides_password_hashes() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = server.get("/api/users", &token).await?;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));

    let (_, body) = server.get("/api/users?role=operator", &token).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["username"], "operator");

    let (status, _) = server.get("/api/users?role=superuser", &token).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_update_delete_user() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = server
        .post(
            "/api/users",
            &token,
            json!({"username": "analyst", "email": "analyst@example.com", "role": "wizard"}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "role");

    let (status, body) = server
        .post(
            "/api/users",
            &token,
            json!({"username": "analyst", "email": "analyst@example.com", "role": "operator"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = server
        .post(
            "/api/users",
            &token,
            json!({"username": "analyst2", "email": "ANALYST@example.com", "role": "operator"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already exists");

    let path = format!("/api/users/{}", id);
    let (status, body) = server.put(&path, &token, json!({"role": "admin"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["username"], "analyst");
    assert!(body["data"]["updatedAt"].is_string());

    let (status, _) = server.put(&path, &token, json!({"username": "admin"})).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = server.delete(&path, &token).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = server.get(&path, &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "E404U");
    Ok(())
}

#[tokio::test]
async fn update_rejects_unknown_role() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = server
        .put("/api/users/user-2", &token, json!({"role": "root", "username": "renamed"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "role");

    let (_, body) = server.get("/api/users/user-2", &token).await?;
    assert_eq!(body["data"]["role"], "operator");
    assert_eq!(body["data"]["username"], "operator");
    Ok(())
}

#[tokio::test]
async fn self_registered_operator_cannot_mint_admins() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, session) = send(
        server
            .request(Method::POST, "/api/auth/register", None)
            .json(&json!({"username": "eve", "email": "eve@example.com", "password": "eve-password"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let eve = session["data"]["token"].as_str().unwrap().to_string();
    let eve_id = session["data"]["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = server
        .post(
            "/api/users",
            &eve,
            json!({"username": "mallory", "email": "mallory@example.com", "role": "admin", "password": "mallory-pass"}),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");

    let (status, _) = server
        .put(&format!("/api/users/{}", eve_id), &eve, json!({"role": "admin"}))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin accounts are out of reach for operators
    let (status, _) = server
        .put("/api/users/user-1", &eve, json!({"password": "taken-over"}))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.delete("/api/users/user-1", &eve).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Operators still manage operator accounts
    let (status, body) = server
        .post(
            "/api/users",
            &eve,
            json!({"username": "trent", "email": "trent@example.com", "role": "operator"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "operator");

    let (_, body) = server.get(&format!("/api/users/{}", eve_id), &eve).await?;
    assert_eq!(body["data"]["role"], "operator");

    let admin = server.admin_token().await?;
    let (_, body) = server.get("/api/users?role=admin", &admin).await?;
    assert_eq!(body["pagination"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn admin_can_promote_users() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = server
        .put("/api/users/user-2", &token, json!({"role": "admin"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn nested_user_orders() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.operator_token().await?;

    let (status, body) = server.get("/api/users/1/orders", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);

    let (_, body) = server.get("/api/users/1/orders?status=delivered", &token).await?;
    assert_eq!(body["data"][0]["orderNumber"], "ORD-001");

    let (status, body) = server.get("/api/users/abc/orders", &token).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid user ID");
    assert_eq!(body["error"]["code"], "E9001");

    let (status, body) = server
        .post(
            "/api/users/2/orders",
            &token,
            json!({"items": ["Anemometer"], "totalAmount": 89.5}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["userId"], 2);
    assert_eq!(body["data"]["orderNumber"], "ORD-004");

    // Orders placed through a user are visible in the flat collection
    let (_, body) = server.get("/api/orders/4", &token).await?;
    assert_eq!(body["data"]["totalAmount"], 89.5);

    let (status, body) = server
        .post("/api/users/2/orders", &token, json!({"items": [], "totalAmount": 10}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Items array is required and must not be empty");
    Ok(())
}
