/// Reusable image upload slot
///
/// Shows either a preview with a remove control or an empty prompt.
/// It keeps no state of its own: the image, what an upload does and what
/// a removal does all come from the owner as a handle and two messages.
use iced::alignment::Horizontal;
use iced::widget::{button, column, container, image, stack, text, Space};
use iced::{Alignment, ContentFit, Element, Length};

use crate::state::data::OutfitRole;

/// Which part of the session a slot edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTarget {
    /// The person photo
    Subject,
    /// One of the clothing categories
    Outfit(OutfitRole),
}

impl SlotTarget {
    /// Number of distinct slots: the person photo plus four clothing items
    pub const COUNT: usize = 5;

    /// Stable position of the slot, `0..COUNT`
    pub fn index(self) -> usize {
        match self {
            SlotTarget::Subject => 0,
            SlotTarget::Outfit(OutfitRole::Head) => 1,
            SlotTarget::Outfit(OutfitRole::Top) => 2,
            SlotTarget::Outfit(OutfitRole::Bottom) => 3,
            SlotTarget::Outfit(OutfitRole::Shoes) => 4,
        }
    }

    /// Title for the native file dialog
    pub fn dialog_title(self) -> String {
        match self {
            SlotTarget::Subject => "Select Your Photo".to_string(),
            SlotTarget::Outfit(role) => format!("Select {} Item", role.title()),
        }
    }
}

/// What a slot does when clicked, provided by whoever owns the images
pub trait SlotActions {
    type Message;

    /// Message sent when the slot body is clicked
    fn on_upload(&self, target: SlotTarget) -> Self::Message;

    /// Message sent when the remove control is clicked
    fn on_remove(&self, target: SlotTarget) -> Self::Message;
}

/// Newest upload ticket handed out per slot
///
/// Every pick takes a ticket and its decode carries it back. Only a decode
/// holding the slot's current ticket may land, so the latest pick wins and
/// a removal cannot be undone by a decode that finishes afterwards.
#[derive(Debug, Default)]
pub struct UploadTickets {
    issued: [u64; SlotTarget::COUNT],
}

impl UploadTickets {
    /// Start a new upload for `target`, superseding any in flight
    pub fn issue(&mut self, target: SlotTarget) -> u64 {
        let ticket = &mut self.issued[target.index()];
        *ticket += 1;
        *ticket
    }

    /// Drop every upload in flight for `target`
    pub fn invalidate(&mut self, target: SlotTarget) {
        self.issued[target.index()] += 1;
    }

    pub fn is_current(&self, target: SlotTarget, ticket: u64) -> bool {
        self.issued[target.index()] == ticket
    }
}

/// Builder for one upload slot
pub struct UploadSlot<'a, Message> {
    title: &'a str,
    description: &'a str,
    preview: Option<&'a image::Handle>,
    file_name: Option<&'a str>,
    placeholder: &'a str,
    width: f32,
    height: f32,
    on_upload: Message,
    on_remove: Message,
}

impl<'a, Message: Clone + 'a> UploadSlot<'a, Message> {
    /// `on_upload` fires when the slot body is clicked, `on_remove` when the
    /// remove control is clicked
    pub fn new(title: &'a str, description: &'a str, on_upload: Message, on_remove: Message) -> Self {
        Self {
            title,
            description,
            preview: None,
            file_name: None,
            placeholder: "+",
            width: 160.0,
            height: 200.0,
            on_upload,
            on_remove,
        }
    }

    /// Slot for `target` whose clicks are answered by `actions`
    pub fn for_target<A>(actions: &A, target: SlotTarget, title: &'a str, description: &'a str) -> Self
    where
        A: SlotActions<Message = Message>,
    {
        Self::new(
            title,
            description,
            actions.on_upload(target),
            actions.on_remove(target),
        )
    }

    /// Image currently held by the slot
    pub fn preview(mut self, preview: Option<&'a image::Handle>) -> Self {
        self.preview = preview;
        self
    }

    /// Source file name shown under the preview
    pub fn file_name(mut self, file_name: Option<&'a str>) -> Self {
        self.file_name = file_name;
        self
    }

    /// Glyph shown while the slot is empty
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn view(self) -> Element<'a, Message> {
        let body: Element<'a, Message> = match self.preview {
            Some(handle) => {
                let picture = button(
                    image(handle.clone())
                        .content_fit(ContentFit::Contain)
                        .width(Length::Fill)
                        .height(Length::Fill),
                )
                .on_press(self.on_upload)
                .padding(0)
                .style(button::text)
                .width(Length::Fill)
                .height(Length::Fill);

                // Drawn above the picture, so a click here never reaches the
                // picture button underneath
                let remove = button(text("×").size(12))
                    .on_press(self.on_remove)
                    .padding([2, 8])
                    .style(button::danger);

                stack![
                    picture,
                    container(remove)
                        .width(Length::Fill)
                        .align_x(Horizontal::Right)
                        .padding(6),
                ]
                .into()
            }
            None => button(
                container(
                    column![
                        text(self.placeholder).size(32),
                        text("Click to upload").size(12),
                    ]
                    .spacing(6)
                    .align_x(Alignment::Center),
                )
                .center_x(Length::Fill)
                .center_y(Length::Fill),
            )
            .on_press(self.on_upload)
            .style(button::text)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        };

        let footer: Element<'a, Message> = match self.file_name {
            Some(name) if self.preview.is_some() => text(name).size(11).into(),
            _ => Space::with_height(Length::Fixed(11.0)).into(),
        };

        container(
            column![
                text(self.title).size(16),
                text(self.description).size(12),
                body,
                footer,
            ]
            .spacing(4),
        )
        .padding(10)
        .width(Length::Fixed(self.width))
        .height(Length::Fixed(self.height))
        .style(container::rounded_box)
        .into()
    }
}

impl<'a, Message: Clone + 'a> From<UploadSlot<'a, Message>> for Element<'a, Message> {
    fn from(slot: UploadSlot<'a, Message>) -> Self {
        slot.view()
    }
}
