use thiserror::Error;

/// 解析失敗時にエンドユーザーへ見せる固定メッセージ
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze image. Please try again.";

#[derive(Error, Debug)]
pub enum CounterError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API key is missing. Set GEMINI_API_KEY or run `object-counter config --set-api-key YOUR_KEY`")]
    MissingApiKey,

    #[error("設定エラー: {0}")]
    Config(String),

    // 詳細はログ用。表示は固定文言
    #[error("{}", ANALYSIS_FAILED_MESSAGE)]
    Transport(String),

    #[error("No response text received from the model")]
    EmptyResponse,

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl CounterError {
    /// セッションのFailed状態に載せるメッセージ
    ///
    /// 通信・空レスポンス・スキーマ違反は区別せず同じ文言にまとめる。
    pub fn user_message(&self) -> String {
        match self {
            CounterError::Transport(_)
            | CounterError::EmptyResponse
            | CounterError::MalformedResponse(_)
            | CounterError::JsonParse(_) => ANALYSIS_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// 内部診断用の詳細（ログ出力向け）
    pub fn detail(&self) -> String {
        match self {
            CounterError::Transport(detail) => format!("transport: {}", detail),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CounterError>;
