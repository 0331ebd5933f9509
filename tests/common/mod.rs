#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

use climate_dashboard_api::{app, auth, AppConfig, AppState};

pub const ADMIN_ID: &str = "user-1";
pub const OPERATOR_ID: &str = "user-2";

/// An in-process server on its own port with freshly seeded memory storage
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(AppConfig::development()).await
    }

    pub async fn start_with(mut config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        config.server.port = port;

        let state = AppState::build(config).await.context("failed to build state")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            state,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Token for a seeded user, signed with the server's secret
    pub async fn token_for(&self, user_id: &str) -> Result<String> {
        let user = self
            .state
            .users
            .find(user_id)
            .await?
            .with_context(|| format!("seeded user {} missing", user_id))?;
        Ok(auth::issue_token(&user, &self.state.config.security)?)
    }

    pub async fn admin_token(&self) -> Result<String> {
        self.token_for(ADMIN_ID).await
    }

    pub async fn operator_token(&self) -> Result<String> {
        self.token_for(OPERATOR_ID).await
    }

    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        send(self.request(Method::GET, path, Some(token))).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.request(Method::POST, path, Some(token)).json(&body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.request(Method::PUT, path, Some(token)).json(&body)).await
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.request(Method::PATCH, path, Some(token)).json(&body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        send(self.request(Method::DELETE, path, Some(token))).await
    }
}

/// Send a request and decode the JSON envelope
pub async fn send(builder: RequestBuilder) -> Result<(StatusCode, Value)> {
    let res = builder.send().await?;
    let status = res.status();
    let body = res.json::<Value>().await.context("response was not JSON")?;
    Ok((status, body))
}
