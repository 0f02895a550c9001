//! 推論エンドポイントへの送信
//!
//! `Transport` をクライアントに差し込むことで、テストでは
//! ネットワークなしで固定レスポンスを返せる。

use super::types::{GenerateRequest, GenerateResponse};
use crate::error::{CounterError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// 1回のリクエスト/レスポンス交換
///
/// 失敗はすべて `CounterError::Transport` で返す。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse>;
}

/// reqwestによるHTTP実装
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CounterError::Transport(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn url_for(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse> {
        let url = self.url_for(model);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CounterError::Transport(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CounterError::Transport(format!(
                "API error {}: {}",
                status, body
            )));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| CounterError::Transport(format!("invalid response body: {}", e)))
    }
}
