//! 画像エンコーダ
//!
//! ユーザーが選んだ画像ファイルを、APIに送れるBase64文字列と
//! MIMEタイプの組に変換する。ネットワークアクセスはしない。

use crate::error::{CounterError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::path::Path;

/// エンコード済み画像
///
/// 選択ごとに1回だけ作られ、以後は変更されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    file_name: String,
    data: String,
    mime_type: String,
    byte_len: usize,
}

impl EncodedImage {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Base64エンコードされたデータ（プレフィックスなし）
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// 元ファイルのバイト数
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// 元のバイト列に戻す
    pub fn decode(&self) -> Vec<u8> {
        // 生成時に自分でエンコードした値なので失敗しない
        STANDARD.decode(&self.data).unwrap_or_default()
    }

    /// プレビュー用のData URL
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// MIMEタイプが画像か判定（`image/*`）
pub fn is_image_mime_type(mime_type: &str) -> bool {
    mime_type
        .trim()
        .to_ascii_lowercase()
        .strip_prefix("image/")
        .is_some_and(|subtype| !subtype.is_empty())
}

/// 拡張子から宣言MIMEタイプを判定
pub fn mime_type_from_path(path: &Path) -> Result<&'static str> {
    let format = ImageFormat::from_path(path).map_err(|_| {
        CounterError::InvalidInput(format!("not an image file: {}", path.display()))
    })?;
    Ok(format.to_mime_type())
}

/// 画像ファイルを読み込んでエンコード
///
/// 拡張子が画像形式でなければファイルを読まずに `InvalidInput` を返す。
pub async fn encode_file(path: &Path) -> Result<EncodedImage> {
    let mime_type = mime_type_from_path(path)?;

    let bytes = tokio::fs::read(path).await?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    encode_bytes(file_name, &bytes, mime_type)
}

/// メモリ上のバイト列を、呼び出し側が宣言したMIMEタイプでエンコード
pub fn encode_bytes(
    file_name: impl Into<String>,
    bytes: &[u8],
    declared_mime_type: &str,
) -> Result<EncodedImage> {
    if !is_image_mime_type(declared_mime_type) {
        return Err(CounterError::InvalidInput(format!(
            "Please upload an image file (got `{}`)",
            declared_mime_type
        )));
    }

    Ok(EncodedImage {
        file_name: file_name.into(),
        data: STANDARD.encode(bytes),
        mime_type: declared_mime_type.trim().to_string(),
        byte_len: bytes.len(),
    })
}

/// `data:image/png;base64,...` 形式のData URLからエンコード済み画像を作る
pub fn parse_data_url(file_name: impl Into<String>, data_url: &str) -> Result<EncodedImage> {
    let invalid = || CounterError::InvalidInput("Invalid data URL".into());

    let rest = data_url.strip_prefix("data:").ok_or_else(invalid)?;
    let (header, data) = rest.split_once(',').ok_or_else(invalid)?;
    let mime_type = header.strip_suffix(";base64").ok_or_else(invalid)?;

    if !is_image_mime_type(mime_type) {
        return Err(CounterError::InvalidInput(format!(
            "Please upload an image file (got `{}`)",
            mime_type
        )));
    }

    let bytes = STANDARD.decode(data).map_err(|_| invalid())?;

    Ok(EncodedImage {
        file_name: file_name.into(),
        data: data.to_string(),
        mime_type: mime_type.to_string(),
        byte_len: bytes.len(),
    })
}
