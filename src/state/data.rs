/// Shared data structures for the application state
///
/// These types describe what the user has uploaded and where the
/// current try-on generation stands. They carry no UI types so the
/// session logic can be tested without a window.

use std::fmt;

/// An uploaded or generated image held as a data URI
///
/// `data_uri` has the form `data:<media-type>;base64,<payload>` and can be
/// shown directly as a preview; the payload alone (see
/// `media::decoder::strip_encoding_prefix`) is what goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Self-describing encoded image (`data:image/png;base64,...`)
    pub data_uri: String,
    /// Media type, e.g. "image/jpeg"
    pub media_type: String,
    /// Base name of the source file, if the image came from disk
    pub file_name: Option<String>,
}

/// One of the four clothing categories a user can fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutfitRole {
    Head,
    Top,
    Bottom,
    Shoes,
}

impl OutfitRole {
    /// All roles in canonical order. The prompt and the request parts
    /// follow this order no matter how the user filled the slots.
    pub const ALL: [OutfitRole; 4] = [
        OutfitRole::Head,
        OutfitRole::Top,
        OutfitRole::Bottom,
        OutfitRole::Shoes,
    ];

    /// Lowercase name used in prompts and messages
    pub fn name(self) -> &'static str {
        match self {
            OutfitRole::Head => "head",
            OutfitRole::Top => "top",
            OutfitRole::Bottom => "bottom",
            OutfitRole::Shoes => "shoes",
        }
    }

    /// Slot heading
    pub fn title(self) -> &'static str {
        match self {
            OutfitRole::Head => "Head",
            OutfitRole::Top => "Top",
            OutfitRole::Bottom => "Bottom",
            OutfitRole::Shoes => "Shoes",
        }
    }

    /// Short hint shown under the heading
    pub fn description(self) -> &'static str {
        match self {
            OutfitRole::Head => "Caps, beanies",
            OutfitRole::Top => "Shirts, jackets",
            OutfitRole::Bottom => "Pants, jeans",
            OutfitRole::Shoes => "Sneakers, boots",
        }
    }
}

impl fmt::Display for OutfitRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The four clothing slots
///
/// Each role has its own field, so there are always exactly four slots
/// and a role can never hold two images at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutfitSlots {
    pub head: Option<EncodedImage>,
    pub top: Option<EncodedImage>,
    pub bottom: Option<EncodedImage>,
    pub shoes: Option<EncodedImage>,
}

impl OutfitSlots {
    /// Create four empty slots
    pub fn new() -> Self {
        Self::default()
    }

    /// Image currently held for `role`
    pub fn get(&self, role: OutfitRole) -> Option<&EncodedImage> {
        self.slot(role).as_ref()
    }

    /// Put an image into `role`, replacing whatever was there
    pub fn set(&mut self, role: OutfitRole, image: EncodedImage) {
        *self.slot_mut(role) = Some(image);
    }

    /// Empty `role`, returning the discarded image
    pub fn clear(&mut self, role: OutfitRole) -> Option<EncodedImage> {
        self.slot_mut(role).take()
    }

    /// True when no role holds an image
    pub fn is_empty(&self) -> bool {
        OutfitRole::ALL.iter().all(|role| self.get(*role).is_none())
    }

    /// Filled roles in canonical order
    pub fn filled(&self) -> impl Iterator<Item = (OutfitRole, &EncodedImage)> + '_ {
        OutfitRole::ALL
            .into_iter()
            .filter_map(move |role| self.get(role).map(|image| (role, image)))
    }

    fn slot(&self, role: OutfitRole) -> &Option<EncodedImage> {
        match role {
            OutfitRole::Head => &self.head,
            OutfitRole::Top => &self.top,
            OutfitRole::Bottom => &self.bottom,
            OutfitRole::Shoes => &self.shoes,
        }
    }

    fn slot_mut(&mut self, role: OutfitRole) -> &mut Option<EncodedImage> {
        match role {
            OutfitRole::Head => &mut self.head,
            OutfitRole::Top => &mut self.top,
            OutfitRole::Bottom => &mut self.bottom,
            OutfitRole::Shoes => &mut self.shoes,
        }
    }
}

/// Where the current try-on generation stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Nothing has been requested yet
    #[default]
    Idle,
    /// A request is in flight
    InProgress,
    /// The model returned an image (data URI)
    Succeeded(String),
    /// The last attempt failed; the message is safe to show
    Failed(String),
}

impl GenerationOutcome {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, GenerationOutcome::InProgress)
    }

    /// Generated image, if the last attempt succeeded
    pub fn result(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Succeeded(data_uri) => Some(data_uri),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(tag: &str) -> EncodedImage {
        EncodedImage {
            data_uri: format!("data:image/png;base64,{}", tag),
            media_type: "image/png".to_string(),
            file_name: None,
        }
    }

    #[test]
    fn test_new_slots_are_empty() {
        let slots = OutfitSlots::new();
        assert!(slots.is_empty());
        assert_eq!(slots.filled().count(), 0);
    }

    #[test]
    fn test_set_replaces_existing_image() {
        let mut slots = OutfitSlots::new();
        slots.set(OutfitRole::Top, image("first"));
        slots.set(OutfitRole::Top, image("second"));

        assert_eq!(slots.get(OutfitRole::Top), Some(&image("second")));
        assert_eq!(slots.filled().count(), 1);
    }

    #[test]
    fn test_filled_uses_canonical_order() {
        let mut slots = OutfitSlots::new();
        slots.set(OutfitRole::Shoes, image("shoes"));
        slots.set(OutfitRole::Head, image("head"));
        slots.set(OutfitRole::Bottom, image("bottom"));

        let roles: Vec<OutfitRole> = slots.filled().map(|(role, _)| role).collect();
        assert_eq!(roles, vec![OutfitRole::Head, OutfitRole::Bottom, OutfitRole::Shoes]);
    }

    #[test]
    fn test_clear_only_touches_one_role() {
        let mut slots = OutfitSlots::new();
        slots.set(OutfitRole::Head, image("head"));
        slots.set(OutfitRole::Top, image("top"));

        let removed = slots.clear(OutfitRole::Head);

        assert_eq!(removed, Some(image("head")));
        assert!(slots.get(OutfitRole::Head).is_none());
        assert_eq!(slots.get(OutfitRole::Top), Some(&image("top")));
    }

    #[test]
    fn test_outcome_result() {
        assert_eq!(GenerationOutcome::Idle.result(), None);
        assert_eq!(GenerationOutcome::Failed("nope".into()).result(), None);
        assert_eq!(
            GenerationOutcome::Succeeded("data:image/png;base64,AA".into()).result(),
            Some("data:image/png;base64,AA")
        );
        assert!(GenerationOutcome::InProgress.is_in_progress());
    }
}
