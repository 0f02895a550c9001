//! 構造化出力スキーマ
//!
//! モデル出力の形（フィールド名・型・必須）を宣言的に定義する。
//! 同じ定義を
//! - リクエスト送信時の `responseSchema`（Gemini OpenAPIサブセット形式）
//! - レスポンス受信時の検証
//!
//! の両方に使い、期待する形とパーサーがずれないようにする。

use crate::error::{Error, Result};
use serde_json::{json, Map, Value};

/// フィールド型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
}

impl FieldKind {
    /// Gemini API上の型名
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "STRING",
            FieldKind::Integer => "INTEGER",
        }
    }
}

/// スキーマの1フィールド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
    pub required: bool,
    /// Integerの下限
    pub minimum: Option<i64>,
    /// 旧フォーマットで使われていたフィールド名
    ///
    /// 正式名との併用は `validate` で拒否する（優先順位は持たない）。
    pub aliases: &'static [&'static str],
}

/// レスポンススキーマ（OBJECT型のみ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    fields: Vec<SchemaField>,
}

impl ResponseSchema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    /// 計数結果のスキーマ: subjectLabel / count / rationale すべて必須
    pub fn count_result() -> Self {
        Self::new(vec![
            SchemaField {
                name: "subjectLabel",
                kind: FieldKind::String,
                description: "The name of the main object being counted (e.g., 'Red Apples', 'Books', 'Cars').",
                required: true,
                minimum: None,
                aliases: &["objectName"],
            },
            SchemaField {
                name: "count",
                kind: FieldKind::Integer,
                description: "The total number of these objects found in the image.",
                required: true,
                minimum: Some(0),
                aliases: &[],
            },
            SchemaField {
                name: "rationale",
                kind: FieldKind::String,
                description: "A brief explanation of how the objects were identified and counted, noting any potential ambiguity.",
                required: true,
                minimum: None,
                aliases: &["reasoning"],
            },
        ])
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect()
    }

    /// `generationConfig.responseSchema` に渡すJSON
    pub fn to_gemini_json(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = json!({
                "type": field.kind.as_str(),
                "description": field.description,
            });
            if let Some(min) = field.minimum {
                prop["minimum"] = json!(min);
            }
            properties.insert(field.name.to_string(), prop);
        }

        let ordering: Vec<&str> = self.fields.iter().map(|f| f.name).collect();

        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": self.required_fields(),
            "propertyOrdering": ordering,
        })
    }

    /// 値がスキーマに適合するか検証
    ///
    /// 必須フィールドの欠落、型の不一致、下限違反を `Error::Schema` で返す。
    /// 正式名と別名が同時に現れた場合もどちらを採るか決められないため違反とする。
    /// スキーマにないフィールドは無視する。
    pub fn validate(&self, value: &Value) -> Result<()> {
        let Some(map) = value.as_object() else {
            return Err(Error::Schema("JSON object expected".into()));
        };

        for field in &self.fields {
            let present: Vec<&str> = std::iter::once(field.name)
                .chain(field.aliases.iter().copied())
                .filter(|key| map.contains_key(*key))
                .collect();
            if present.len() > 1 {
                return Err(Error::Schema(format!(
                    "field `{}` given more than once ({})",
                    field.name,
                    present.join(", ")
                )));
            }

            let found = std::iter::once(field.name)
                .chain(field.aliases.iter().copied())
                .find_map(|key| map.get(key).filter(|v| !v.is_null()));

            let Some(v) = found else {
                if field.required {
                    return Err(Error::Schema(format!(
                        "missing required field `{}`",
                        field.name
                    )));
                }
                continue;
            };

            match field.kind {
                FieldKind::String => {
                    if !v.is_string() {
                        return Err(Error::Schema(format!(
                            "field `{}` must be a string",
                            field.name
                        )));
                    }
                }
                FieldKind::Integer => {
                    let Some(n) = v.as_i64() else {
                        return Err(Error::Schema(format!(
                            "field `{}` must be an integer",
                            field.name
                        )));
                    };
                    if let Some(min) = field.minimum {
                        if n < min {
                            return Err(Error::Schema(format!(
                                "field `{}` must be >= {} (got {})",
                                field.name, min, n
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
