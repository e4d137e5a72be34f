/// Gemini image generation
///
/// - `types.rs` - serde wire types for `generateContent`
/// - `client.rs` - request assembly, HTTP call and image extraction

pub mod client;
pub mod types;

pub use client::{GeminiClient, GenerationError, TryOnClient};
