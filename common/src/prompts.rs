//! プロンプト定義
//!
//! 計数指示は固定文言。出力形式はプロンプトではなく
//! `ResponseSchema` で制約する。

/// 画像内の主要な物体グループを数える指示
pub const COUNT_INSTRUCTION: &str = "Analyze this image. Identify the primary group of similar items \
(e.g., a pile of fruit, a row of books, scattered coins) and count them precisely. \
Be thorough in your examination, and note any ambiguity in your reasoning.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_instruction_content() {
        assert!(COUNT_INSTRUCTION.contains("primary group of similar items"));
        assert!(COUNT_INSTRUCTION.contains("count them precisely"));
        assert!(COUNT_INSTRUCTION.contains("ambiguity"));
    }

    #[test]
    fn test_count_instruction_single_line() {
        // 行継続で改行が入っていないこと
        assert!(!COUNT_INSTRUCTION.contains('\n'));
        assert!(!COUNT_INSTRUCTION.contains("  "));
    }
}
