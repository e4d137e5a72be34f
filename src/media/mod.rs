/// Image file handling
///
/// This module handles:
/// - Reading uploaded photos into data URIs (decoder.rs)
/// - Saving the generated result to disk (export.rs)

pub mod decoder;
pub mod export;
