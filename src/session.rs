//! 解析セッションの状態管理
//!
//! Idle → Analyzing → Success / Failed の遷移と、現在の画像・結果を保持する。
//! 解析の開始ごとに世代番号を進め、古い世代の応答は捨てる。
//! 通信のキャンセルはできないため、画像の差し替えやリセット後に
//! 届いた応答はこの世代チェックで無視される。

use crate::analyzer::GeminiClient;
use crate::encoder::EncodedImage;
use crate::error::Result;
use object_counter_common::CountResult;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// セッション状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Analyzing,
    Success(CountResult),
    Failed(String),
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Analyzing => "analyzing",
            SessionState::Success(_) => "success",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// 送信中の解析1件
///
/// `begin_analysis` で発行され、結果は発行時の世代番号とともに
/// `finish_analysis` に返す。
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    generation: u64,
    image: Arc<EncodedImage>,
}

impl AnalysisTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn image(&self) -> &EncodedImage {
        &self.image
    }
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    image: Option<Arc<EncodedImage>>,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn image(&self) -> Option<&EncodedImage> {
        self.image.as_deref()
    }

    pub fn result(&self) -> Option<&CountResult> {
        match &self.state {
            SessionState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_analyzing(&self) -> bool {
        self.state == SessionState::Analyzing
    }

    /// 新しい画像を選択。以前の結果・エラーは捨て、送信中の解析は無効になる
    pub fn select_image(&mut self, image: EncodedImage) {
        info!("image selected: {} ({})", image.file_name(), image.mime_type());
        self.image = Some(Arc::new(image));
        self.enter_idle();
    }

    /// 画像を外してIdleに戻る
    pub fn clear_image(&mut self) {
        self.image = None;
        self.enter_idle();
    }

    /// 結果・エラーを捨ててIdleに戻る。画像は保持したまま
    pub fn reset(&mut self) {
        self.enter_idle();
    }

    fn enter_idle(&mut self) {
        if self.is_analyzing() {
            debug!("discarding in-flight analysis (generation {})", self.generation);
        }
        self.generation += 1;
        self.state = SessionState::Idle;
    }

    /// 解析を開始
    ///
    /// 画像がない、または解析中の場合は何もせず `None` を返す。
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        if self.is_analyzing() {
            debug!("analyze ignored: already analyzing (generation {})", self.generation);
            return None;
        }
        let Some(image) = self.image.clone() else {
            debug!("analyze ignored: no image selected");
            return None;
        };

        self.generation += 1;
        self.state = SessionState::Analyzing;
        info!("analyzing {} (generation {})", image.file_name(), self.generation);

        Some(AnalysisTicket {
            generation: self.generation,
            image,
        })
    }

    /// 解析結果を反映
    ///
    /// 世代が一致しない、または解析中でない場合は反映せず `false` を返す。
    pub fn finish_analysis(&mut self, generation: u64, outcome: Result<CountResult>) -> bool {
        if !self.is_analyzing() || generation != self.generation {
            warn!(
                "stale analysis response ignored (generation {}, current {})",
                generation, self.generation
            );
            return false;
        }

        self.state = match outcome {
            Ok(result) => {
                info!("analysis complete: {} x{}", result.subject_label, result.count);
                SessionState::Success(result)
            }
            Err(e) => {
                error!("analysis failed: {}", e.detail());
                SessionState::Failed(e.user_message())
            }
        };
        true
    }
}

/// 共有セッションで解析を1回実行
///
/// ロックは開始時と反映時だけ取り、通信中は保持しない。
/// 開始できなかった場合は `None`、結果を反映できたかを `Some(bool)` で返す。
pub async fn run_analysis(session: &Mutex<Session>, client: &GeminiClient) -> Option<bool> {
    let ticket = {
        let mut guard = session.lock().unwrap_or_else(PoisonError::into_inner);
        guard.begin_analysis()
    }?;

    let outcome = client.analyze_image(ticket.image()).await;

    let mut guard = session.lock().unwrap_or_else(PoisonError::into_inner);
    Some(guard.finish_analysis(ticket.generation(), outcome))
}
