//! Gemini推論クライアント
//!
//! 画像1枚 + 固定の計数指示 + 構造化出力スキーマを送り、
//! 返ってきたJSONを検証して `CountResult` にする。
//! 呼び出し間で状態は持たない。リトライもしない。

use super::transport::{HttpTransport, Transport};
use super::types::{
    Content, GenerateRequest, GenerationConfig, InlineData, Part, ThinkingConfig,
};
use crate::config::ClientConfig;
use crate::encoder::EncodedImage;
use crate::error::{CounterError, Result};
use object_counter_common::{parse_count_response, CountResult, ResponseSchema, COUNT_INSTRUCTION};
use std::sync::Arc;
use tracing::{debug, error};

pub struct GeminiClient {
    config: ClientConfig,
    schema: ResponseSchema,
    transport: Arc<dyn Transport>,
}

impl GeminiClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            schema: ResponseSchema::count_result(),
            transport,
        }
    }

    /// HTTPトランスポートでクライアントを作成
    pub fn with_http(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.endpoint.clone(), config.timeout)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn build_request(&self, data: &str, mime_type: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: data.to_string(),
                        },
                    },
                    Part::Text {
                        text: COUNT_INSTRUCTION.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: self.schema.to_gemini_json(),
                thinking_config: self
                    .config
                    .thinking_budget
                    .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            },
        }
    }

    /// Base64画像を解析して物体の数を返す
    pub async fn analyze(&self, data: &str, mime_type: &str) -> Result<CountResult> {
        // 認証情報がなければ通信しない
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(CounterError::MissingApiKey)?;

        let request = self.build_request(data, mime_type);
        debug!(
            "analyze: model={} mime_type={} payload={} chars",
            self.config.model,
            mime_type,
            data.len()
        );

        let response = self
            .transport
            .generate_content(&self.config.model, api_key, &request)
            .await
            .map_err(|e| {
                error!("Error analyzing image: {}", e.detail());
                e
            })?;

        let text = response.text().ok_or_else(|| {
            error!("No response text received from the model");
            CounterError::EmptyResponse
        })?;

        debug!("response: {} chars", text.len());

        parse_count_response(&text).map_err(|e| {
            error!("Malformed response: {}", e);
            CounterError::MalformedResponse(e.to_string())
        })
    }

    pub async fn analyze_image(&self, image: &EncodedImage) -> Result<CountResult> {
        self.analyze(image.data(), image.mime_type()).await
    }
}
