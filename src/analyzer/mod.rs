mod client;
mod transport;
pub mod types;

pub use client::GeminiClient;
pub use transport::{HttpTransport, Transport};
pub use types::{GenerateRequest, GenerateResponse};
pub use object_counter_common::CountResult;
