//! Chat providers for the external AI service.

pub mod openai;
pub mod traits;

pub use openai::OpenAiClient;
pub use traits::ChatProvider;
