//! 画像エンコードテスト

use object_counter::encoder::{encode_file, parse_data_url};
use object_counter::error::CounterError;
use tempfile::tempdir;

/// 各形式でデコード結果が元ファイルと一致し、MIMEタイプが拡張子どおり
#[tokio::test]
async fn test_encode_roundtrip_for_image_types() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cases = [
        ("photo.jpg", "image/jpeg"),
        ("photo.jpeg", "image/jpeg"),
        ("photo.png", "image/png"),
        ("photo.webp", "image/webp"),
        ("photo.gif", "image/gif"),
    ];

    for (i, (name, mime)) in cases.iter().enumerate() {
        let content: Vec<u8> = (0..=255u8).cycle().skip(i * 7).take(1000 + i).collect();
        let path = dir.path().join(name);
        std::fs::write(&path, &content).unwrap();

        let encoded = encode_file(&path).await.expect("エンコード失敗");
        assert_eq!(encoded.mime_type(), *mime, "{}", name);
        assert_eq!(encoded.decode(), content, "{}", name);
        assert_eq!(encoded.byte_len(), content.len());
    }
}

/// 画像以外のファイルは拒否される
#[tokio::test]
async fn test_encode_rejects_non_image_files() {
    let dir = tempdir().expect("Failed to create temp dir");

    for name in ["notes.txt", "data.json", "report.pdf", "archive.zip"] {
        let path = dir.path().join(name);
        std::fs::write(&path, b"not an image").unwrap();

        let result = encode_file(&path).await;
        assert!(
            matches!(result, Err(CounterError::InvalidInput(_))),
            "{} should be rejected",
            name
        );
    }
}

/// エンコード結果のData URLから同じ画像を復元できる
#[tokio::test]
async fn test_data_url_preview_roundtrip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("pixel.png");
    std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

    let encoded = encode_file(&path).await.unwrap();
    let restored = parse_data_url("pixel.png", &encoded.data_url()).unwrap();

    assert_eq!(restored, encoded);
}
