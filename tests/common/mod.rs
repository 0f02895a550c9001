//! 結合テスト用のトランスポート

use async_trait::async_trait;
use object_counter::analyzer::{GenerateRequest, GenerateResponse, Transport};
use object_counter::config::ClientConfig;
use object_counter::error::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// 用意した応答を順番に返すトランスポート
///
/// `gated()` で作ると、`open()` されるまで応答を保留する。
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
    gate: Option<Notify>,
}

impl ScriptedTransport {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn gated(replies: &[&str]) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new(replies)
        }
    }

    pub fn open(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn generate_content(
        &self,
        _model: &str,
        _api_key: &str,
        _request: &GenerateRequest,
    ) -> Result<GenerateResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let reply = self.replies.lock().unwrap().pop_front();
        Ok(reply.map(GenerateResponse::from_text).unwrap_or_default())
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig {
        api_key: Some("test-key".to_string()),
        ..Default::default()
    }
}
