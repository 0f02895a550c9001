use crate::error::{CounterError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 認証情報を読む環境変数（先頭優先）
const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub thinking_budget: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout_seconds: 120,
            thinking_budget: Some(2048), // 正確に数えるための思考時間
        }
    }
}

/// 推論クライアントに渡す設定
///
/// 起動時に一度だけ解決し、クライアントはグローバル状態を参照しない。
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub thinking_budget: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Config::default().client_config()
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数のAPIキーで上書きする
    ///
    /// ファイルが壊れている場合は `CounterError::Config` を返す。
    pub fn load() -> Result<Self> {
        let mut config = Self::read_file(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    /// 壊れた設定ファイルを既定値で置き換えて読み込む
    ///
    /// `config` サブコマンドがファイルを修復できるように使う。
    pub fn load_or_default() -> Result<Self> {
        let mut config = Self::read_file_or_default(&Self::config_path()?);
        config.apply_env();
        Ok(config)
    }

    /// 指定パスの設定を読む。ファイルが無ければ既定値
    pub fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CounterError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn read_file_or_default(path: &Path) -> Self {
        Self::read_file(path).unwrap_or_else(|e| {
            warn!("設定ファイルを読めないため既定値を使用: {}", e);
            Self::default()
        })
    }

    fn apply_env(&mut self) {
        if let Some(key) = api_key_from_env() {
            self.api_key = Some(key);
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CounterError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("object-counter").join("config.json"))
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            thinking_budget: self.thinking_budget,
        }
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|key| !key.trim().is_empty())
}
