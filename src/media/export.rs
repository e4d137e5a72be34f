/// Saving a generated try-on image to disk
use std::path::PathBuf;

use super::decoder;

/// Base name for downloaded results
const RESULT_BASE_NAME: &str = "virtual-try-on";

/// Extension used when the media type cannot be read
const FALLBACK_EXTENSION: &str = "png";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("result image is not valid base64: {0}")]
    Payload(#[from] base64::DecodeError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// File extension for a result data URI ("image/jpeg" -> "jpeg")
pub fn extension_for_data_uri(data_uri: &str) -> &str {
    decoder::media_type_of(data_uri)
        .and_then(|media_type| media_type.split_once('/'))
        .map(|(_, subtype)| subtype)
        .filter(|subtype| !subtype.is_empty())
        .unwrap_or(FALLBACK_EXTENSION)
}

/// Default file name offered in the save dialog
pub fn suggested_file_name(data_uri: &str) -> String {
    format!("{}.{}", RESULT_BASE_NAME, extension_for_data_uri(data_uri))
}

/// Directory the save dialog opens in
pub fn default_save_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(dirs::home_dir)
}

/// Write a result data URI to `path` as raw image bytes
///
/// Returns the path that was written so the UI can report it.
pub async fn save_result(path: PathBuf, data_uri: String) -> Result<PathBuf, ExportError> {
    let bytes = decoder::payload_bytes(&data_uri)?;

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved try-on result");
    Ok(path)
}
