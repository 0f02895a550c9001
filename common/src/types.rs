//! 解析結果の型定義
//!
//! CountResult: 画像内の主要な物体グループを数えた結果

use serde::{Deserialize, Serialize};

/// AI計数結果
///
/// `objectName` / `reasoning` は旧フォーマットのフィールド名として受け付ける。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResult {
    /// 数えた物体の名前（例: "Red Apples"）
    ///
    /// 旧名 `objectName` も読めるが、両方ある返答は不正として扱う。
    #[serde(alias = "objectName")]
    pub subject_label: String,

    /// 物体の個数
    pub count: u32,

    /// 数え方の説明（曖昧な点を含む）
    #[serde(alias = "reasoning")]
    pub rationale: String,
}

impl CountResult {
    pub fn new(subject_label: impl Into<String>, count: u32, rationale: impl Into<String>) -> Self {
        Self {
            subject_label: subject_label.into(),
            count,
            rationale: rationale.into(),
        }
    }
}
