/// File decoder for uploaded images
///
/// Reads a user-selected file and turns it into a data URI that works both
/// as a preview source and, once the prefix is stripped, as an API payload.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tokio::task;

use crate::state::data::EncodedImage;

/// Formats offered in the upload dialog and accepted by the decoder
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Errors that can occur while reading an uploaded file
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is empty")]
    Empty(PathBuf),
    #[error("{0} is not a PNG, JPEG or WEBP image")]
    Unsupported(PathBuf),
    #[error("decode task failed: {0}")]
    Join(String),
}

/// Read a file and encode it as a data URI
///
/// The read happens on the blocking pool so large photos do not stall
/// the UI thread.
pub async fn decode(path: PathBuf) -> Result<EncodedImage, DecodeError> {
    task::spawn_blocking(move || decode_blocking(&path))
        .await
        .map_err(|e| DecodeError::Join(e.to_string()))?
}

/// Blocking implementation of `decode`
pub fn decode_blocking(path: &Path) -> Result<EncodedImage, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.is_empty() {
        return Err(DecodeError::Empty(path.to_path_buf()));
    }

    let media_type = media_type_for(&bytes, path)
        .ok_or_else(|| DecodeError::Unsupported(path.to_path_buf()))?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string());

    tracing::debug!(
        file = ?file_name,
        media_type,
        bytes = bytes.len(),
        "Decoded upload"
    );

    Ok(EncodedImage {
        data_uri: encode_data_uri(media_type, &bytes),
        media_type: media_type.to_string(),
        file_name,
    })
}

/// Work out the media type of an uploaded file
///
/// Content sniffing wins; the extension is only consulted when the magic
/// bytes are not recognised. Anything outside PNG/JPEG/WEBP is rejected.
pub fn media_type_for(bytes: &[u8], path: &Path) -> Option<&'static str> {
    let format = image::guess_format(bytes)
        .or_else(|_| ImageFormat::from_path(path))
        .ok()?;

    match format {
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP => Some(format.to_mime_type()),
        _ => None,
    }
}

/// Encode raw bytes as `data:<media_type>;base64,<payload>`
pub fn encode_data_uri(media_type: &str, bytes: &[u8]) -> String {
    wrap_payload(media_type, &BASE64.encode(bytes))
}

/// Wrap an already base64-encoded payload into a data URI
pub fn wrap_payload(media_type: &str, payload: &str) -> String {
    format!("data:{};base64,{}", media_type, payload)
}

/// Return only the payload of a `<prefix>,<payload>` string
///
/// Input without a comma is returned unchanged.
pub fn strip_encoding_prefix(encoded: &str) -> &str {
    match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    }
}

/// Media type declared in a data URI header, if any
pub fn media_type_of(data_uri: &str) -> Option<&str> {
    let (header, _) = data_uri.split_once(',')?;
    let media_type = header
        .strip_prefix("data:")?
        .split(';')
        .next()
        .unwrap_or_default();

    if media_type.is_empty() {
        None
    } else {
        Some(media_type)
    }
}

/// Decode the base64 payload of a data URI back into bytes
pub fn payload_bytes(data_uri: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(strip_encoding_prefix(data_uri))
}
