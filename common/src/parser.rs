//! APIレスポンスパーサー
//!
//! モデルが返したテキストからJSONを抽出し、
//! `ResponseSchema` で検証してから `CountResult` に変換する

use crate::error::{Error, Result};
use crate::schema::ResponseSchema;
use crate::types::CountResult;

/// APIレスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} オブジェクト
/// 3. エラー
///
/// # Examples
/// ```
/// use object_counter_common::extract_json;
///
/// let response = "Result: {\"count\": 3}";
/// let json = extract_json(response).unwrap();
/// assert_eq!(json, "{\"count\": 3}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    // 生の {...} を探す
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSON object not found".into()))
}

/// 計数レスポンスをパース
///
/// # Returns
/// * `Ok(CountResult)` - パース・検証成功
/// * `Err(Error::Parse)` - JSONが見つからない、または不正
/// * `Err(Error::Schema)` - 必須フィールド欠落・型不一致
pub fn parse_count_response(response: &str) -> Result<CountResult> {
    let json_str = extract_json(response)?;
    let value: serde_json::Value = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("JSON parse error: {}", e)))?;

    ResponseSchema::count_result().validate(&value)?;

    serde_json::from_value(value).map_err(|e| Error::Schema(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // extract_json テスト
    // =============================================

    #[test]
    fn test_extract_json_with_block() {
        let response = r#"Here is the analysis:
```json
{"subjectLabel": "apples", "count": 7, "rationale": "visible"}
```
Some additional text."#;

        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.contains("apples"));
    }

    #[test]
    fn test_extract_json_raw() {
        let response = r#"{"count": 1}"#;
        assert_eq!(extract_json(response).unwrap(), r#"{"count": 1}"#);
    }

    #[test]
    fn test_extract_json_error() {
        let result = extract_json("No JSON here, just plain text.");
        if let Err(Error::Parse(msg)) = result {
            assert!(msg.contains("not found"));
        } else {
            panic!("Expected Parse error");
        }
    }

    #[test]
    fn test_extract_json_empty_response() {
        assert!(extract_json("").is_err());
    }

    // =============================================
    // parse_count_response テスト
    // =============================================

    #[test]
    fn test_parse_count_response() {
        let response = r#"{"subjectLabel":"apples","count":7,"rationale":"counted visible apples"}"#;

        let result = parse_count_response(response).unwrap();
        assert_eq!(result.subject_label, "apples");
        assert_eq!(result.count, 7);
        assert_eq!(result.rationale, "counted visible apples");
    }

    #[test]
    fn test_parse_count_response_fenced() {
        let response = "```json\n{\n  \"subjectLabel\": \"coins\",\n  \"count\": 0,\n  \"rationale\": \"none\"\n}\n```";

        let result = parse_count_response(response).unwrap();
        assert_eq!(result.subject_label, "coins");
        assert_eq!(result.count, 0);
    }

    #[test]
    fn test_parse_count_response_extra_fields_ignored() {
        let response = r#"{"subjectLabel":"cars","count":2,"rationale":"","confidence":0.9}"#;
        assert_eq!(parse_count_response(response).unwrap().count, 2);
    }

    #[test]
    fn test_parse_count_response_missing_count() {
        let response = r#"{"subjectLabel":"apples","rationale":"counted visible apples"}"#;

        let result = parse_count_response(response);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_parse_count_response_invalid_json() {
        let response = r#"{"subjectLabel": "apples", "count": }"#;

        let result = parse_count_response(response);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_count_response_plain_text() {
        let result = parse_count_response("There are seven apples.");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_count_response_negative_count() {
        let response = r#"{"subjectLabel":"apples","count":-2,"rationale":""}"#;
        assert!(matches!(parse_count_response(response), Err(Error::Schema(_))));
    }

    #[test]
    fn test_parse_count_response_count_too_large() {
        // u32に収まらない値
        let response = r#"{"subjectLabel":"grains","count":5000000000,"rationale":""}"#;
        assert!(matches!(parse_count_response(response), Err(Error::Schema(_))));
    }

    #[test]
    fn test_parse_count_response_duplicate_label_is_schema_error() {
        let response = r#"{"subjectLabel":"apples","objectName":"pears","count":3,"rationale":""}"#;

        match parse_count_response(response) {
            Err(Error::Schema(msg)) => assert!(msg.contains("more than once")),
            other => panic!("Expected Schema error, got {:?}", other),
        }
    }
}
