/// Decoded preview handles for everything on screen
///
/// Data URIs are decoded once when a slot changes, not on every redraw.
use iced::widget::image::Handle;

use super::upload_slot::SlotTarget;
use crate::media::decoder;
use crate::state::data::EncodedImage;

#[derive(Debug, Default)]
pub struct Previews {
    slots: [Option<Handle>; SlotTarget::COUNT],
    result: Option<Handle>,
}

impl Previews {
    pub fn get(&self, target: SlotTarget) -> Option<&Handle> {
        self.slots[target.index()].as_ref()
    }

    /// Replace the preview for `target` with the image now held there
    pub fn refresh(&mut self, target: SlotTarget, image: Option<&EncodedImage>) {
        self.slots[target.index()] = image.and_then(|image| handle_for(&image.data_uri));
    }

    pub fn result(&self) -> Option<&Handle> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, data_uri: Option<&str>) {
        self.result = data_uri.and_then(handle_for);
    }
}

/// Image handle for a data URI, or None if the payload is not base64
pub fn handle_for(data_uri: &str) -> Option<Handle> {
    match decoder::payload_bytes(data_uri) {
        Ok(bytes) => Some(Handle::from_bytes(bytes)),
        Err(e) => {
            tracing::warn!(error = %e, "Could not decode preview");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::OutfitRole;

    fn image(payload: &str) -> EncodedImage {
        EncodedImage {
            data_uri: format!("data:image/png;base64,{}", payload),
            media_type: "image/png".to_string(),
            file_name: None,
        }
    }

    #[test]
    fn test_refresh_and_clear() {
        let mut previews = Previews::default();
        let top = SlotTarget::Outfit(OutfitRole::Top);

        previews.refresh(top, Some(&image("QUJD")));
        assert!(previews.get(top).is_some());
        assert!(previews.get(SlotTarget::Outfit(OutfitRole::Head)).is_none());
        assert!(previews.get(SlotTarget::Subject).is_none());

        previews.refresh(top, None);
        assert!(previews.get(top).is_none());
    }

    #[test]
    fn test_invalid_payload_has_no_preview() {
        assert!(handle_for("data:image/png;base64,***").is_none());

        let mut previews = Previews::default();
        previews.set_result(Some("data:image/png;base64,QUJD"));
        assert!(previews.result().is_some());
        previews.set_result(None);
        assert!(previews.result().is_none());
    }
}
