/// Result panel: placeholder, progress, error or the generated image
use iced::widget::{button, column, container, image, text, Column};
use iced::{Alignment, ContentFit, Element, Length};

use crate::state::data::GenerationOutcome;
use crate::Message;

/// Shown when a result exists but its bytes would not decode as an image
const NO_PREVIEW_MESSAGE: &str = "The result could not be previewed. You can still download it.";

/// What the panel shows for an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Idle,
    Generating,
    Failed,
    /// A result exists; `preview` says whether it can be drawn
    Result { preview: bool },
}

impl Panel {
    fn for_outcome(outcome: &GenerationOutcome, has_preview: bool) -> Self {
        match outcome {
            GenerationOutcome::Idle => Panel::Idle,
            GenerationOutcome::InProgress => Panel::Generating,
            GenerationOutcome::Failed(_) => Panel::Failed,
            GenerationOutcome::Succeeded(_) => Panel::Result { preview: has_preview },
        }
    }

    fn offers_download(self) -> bool {
        matches!(self, Panel::Result { .. })
    }
}

pub fn view<'a>(
    outcome: &'a GenerationOutcome,
    result: Option<&'a image::Handle>,
    save_status: Option<&'a str>,
) -> Element<'a, Message> {
    let panel = Panel::for_outcome(outcome, result.is_some());

    let mut content: Column<'a, Message> = match (outcome, result) {
        (GenerationOutcome::InProgress, _) => column![
            text("Generating your new look...").size(22),
            text("This can take up to a minute. Please wait.").size(14),
        ],
        (GenerationOutcome::Failed(message), _) => column![
            text("Generation Failed").size(22).style(text::danger),
            text(message.as_str()).size(14),
        ],
        (GenerationOutcome::Succeeded(_), Some(handle)) => column![image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)],
        (GenerationOutcome::Succeeded(_), None) => column![
            text("Result ready").size(22),
            text(NO_PREVIEW_MESSAGE).size(14).style(text::danger),
        ],
        (GenerationOutcome::Idle, _) => column![
            text("Your virtual try-on will appear here").size(20),
            text("Upload your photo and outfit, then click \"Try It On!\" to see the magic.").size(14),
        ],
    };

    if panel.offers_download() {
        content = content.push(
            button(text("Download").size(16))
                .on_press(Message::Download)
                .padding(10),
        );

        if let Some(status) = save_status {
            content = content.push(text(status).size(13));
        }
    }

    container(content.spacing(12).align_x(Alignment::Center))
        .padding(16)
        .center_x(Length::Fill)
        .center_y(Length::Fixed(600.0))
        .style(container::rounded_box)
        .into()
}
