#![allow(dead_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use bond_service::config::AppConfig;
use bond_service::{app, AppState};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const PASSWORD: &str = "correct-horse-42";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve a fresh in-memory app on an unused port for the current test
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        let router = app(AppState::in_memory(AppConfig::development()));

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
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

    /// Register `email` and return the response body's `data`
    pub async fn register(&self, email: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/api/registration/"))
            .json(&json!({"email": email, "password1": PASSWORD, "password2": PASSWORD}))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "registration failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }

    /// Register `email` and return its access token
    pub async fn access_token(&self, email: &str) -> Result<String> {
        let data = self.register(email).await?;
        data["access"]
            .as_str()
            .map(str::to_string)
            .context("registration returned no access token")
    }

    pub async fn get(&self, token: &str, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await?;
        Self::decode(res).await
    }

    pub async fn send(
        &self,
        method: reqwest::Method,
        token: &str,
        path: &str,
        body: &Value,
    ) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .request(method, self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::decode(res).await
    }

    async fn decode(res: reqwest::Response) -> Result<(StatusCode, Value)> {
        let status = res.status();
        let text = res.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).with_context(|| format!("non-JSON body: {}", text))?
        };
        Ok((status, body))
    }
}

/// A valid bond payload; `isin` must carry a correct check digit
pub fn bond_body(name: &str, isin: &str, value: &str) -> Value {
    json!({
        "name": name,
        "isin": isin,
        "value": value,
        "interest_rate": "5.00",
        "purchase_date": "2024-01-01",
        "maturity_date": "2030-01-01",
        "interest_payment_frequency": "Annually"
    })
}
