//! Object Counter Common Library
//!
//! CLIと将来のWeb(WASM)フロントエンドで共有される型とユーティリティ。
//! ネットワーク・ファイルI/Oには依存しない。

pub mod types;
pub mod error;
pub mod schema;
pub mod prompts;
pub mod parser;

pub use types::CountResult;
pub use error::{Error, Result};
pub use schema::{FieldKind, ResponseSchema, SchemaField};
pub use prompts::COUNT_INSTRUCTION;
pub use parser::{extract_json, parse_count_response};
