pub mod gemini;
pub mod traits;

pub use traits::{GenerateRequest, GenerativeProvider, GroundingChunk, InlineData, ModelResponse};
