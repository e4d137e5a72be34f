/// Gemini try-on client
///
/// Builds the multi-part request (person photo, clothing photos in
/// canonical order, then the instruction text), sends it once, and pulls
/// the first inline image out of the response.

use std::future::Future;

use reqwest::StatusCode;

use super::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};
use crate::config::Config;
use crate::media::decoder::{strip_encoding_prefix, wrap_payload};
use crate::state::data::{EncodedImage, OutfitRole, OutfitSlots};

/// The only failure a caller ever sees from a generation attempt
///
/// Raw model and transport errors are logged, not shown; they are rarely
/// something the user can act on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to generate image. The model may be unable to process the request. Please try with different images.")]
pub struct GenerationError;

/// Detailed causes, kept for the logs
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not parse response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("response contained no candidate content")]
    NoCandidate,
    #[error("no image was generated in the response")]
    NoImage,
}

/// Anything that can turn a person photo plus outfit into a try-on image
///
/// The session talks to this trait so tests can swap the network out.
pub trait TryOnClient {
    /// Returns the generated image as a data URI
    fn request_try_on(
        &self,
        subject: &EncodedImage,
        outfit: &OutfitSlots,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// HTTP client for the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_http(config, reqwest::Client::new())
    }

    /// Build a client around an already configured `reqwest::Client`
    pub fn with_http(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.clone(),
        }
    }

    /// Full URL of the generate endpoint for the configured model
    pub fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    /// Send one request and extract the image, keeping the detailed error
    pub async fn generate(&self, request: &GenerateContentRequest) -> Result<String, GeminiError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GeminiError::Status {
                status,
                body: body.trim().chars().take(500).collect(),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        extract_first_image(&parsed)
    }
}

impl TryOnClient for GeminiClient {
    fn request_try_on(
        &self,
        subject: &EncodedImage,
        outfit: &OutfitSlots,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send {
        let request = build_request(subject, outfit);
        let roles: Vec<&str> = outfit.filled().map(|(role, _)| role.name()).collect();

        tracing::info!(
            model = %self.model,
            roles = ?roles,
            parts = request.contents[0].parts.len(),
            "Requesting try-on image"
        );

        async move {
            match self.generate(&request).await {
                Ok(data_uri) => {
                    tracing::info!(bytes = data_uri.len(), "Try-on image received");
                    Ok(data_uri)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Error generating image with Gemini");
                    Err(GenerationError)
                }
            }
        }
    }
}

// Keeps the API key out of logs
impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Instruction text for the filled roles, in the order they were sent
pub fn build_prompt(roles: &[OutfitRole]) -> String {
    let names: Vec<&str> = roles.iter().map(|role| role.name()).collect();
    format!(
        "Generate a realistic image of the person from the first image wearing the provided clothing items. \
         The subsequent images are for the {}. \
         The background should be simple and neutral. \
         The final output should only be the image of the person wearing the clothing.",
        names.join(", ")
    )
}

/// Assemble the request: subject first, clothing in canonical order, text last
pub fn build_request(subject: &EncodedImage, outfit: &OutfitSlots) -> GenerateContentRequest {
    let mut parts = vec![image_part(subject)];
    let mut roles = Vec::new();

    for (role, image) in outfit.filled() {
        parts.push(image_part(image));
        roles.push(role);
    }

    parts.push(Part::text(build_prompt(&roles)));

    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig::image_only(),
    }
}

/// First inline image of the first candidate, re-wrapped as a data URI
pub fn extract_first_image(response: &GenerateContentResponse) -> Result<String, GeminiError> {
    let parts = response.primary_parts().ok_or(GeminiError::NoCandidate)?;

    match parts.iter().find_map(|part| part.inline_data.as_ref()) {
        Some(inline) => Ok(wrap_payload(&inline.mime_type, &inline.data)),
        None => {
            let finish_reason = response
                .candidates
                .first()
                .and_then(|candidate| candidate.finish_reason.as_deref());
            tracing::warn!(?finish_reason, parts = parts.len(), "Response had no inline image");
            Err(GeminiError::NoImage)
        }
    }
}

fn image_part(image: &EncodedImage) -> Part {
    Part::inline_image(
        image.media_type.clone(),
        strip_encoding_prefix(&image.data_uri),
    )
}
