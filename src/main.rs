use iced::widget::{button, column, container, row, scrollable, text, Column, Row};
use iced::alignment::Vertical;
use iced::{Alignment, Length};
use iced::{Element, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod gemini;
mod media;
mod state;
mod ui;

use config::Config;
use gemini::{GeminiClient, GenerationError, TryOnClient};
use media::decoder::{self, DecodeError};
use media::export::{self, ExportError};
use state::data::{EncodedImage, OutfitRole};
use state::session::Session;
use ui::preview::Previews;
use ui::upload_slot::{SlotActions, SlotTarget, UploadSlot, UploadTickets};

/// Main application state
struct VirtualTryOn {
    /// Uploaded photos and generation status
    session: Session,
    /// Client for the image generation API
    client: GeminiClient,
    /// Decoded previews for the slots and the result
    previews: Previews,
    /// Newest upload per slot; older decodes are dropped
    uploads: UploadTickets,
    /// Outcome of the last download, shown under the result
    save_status: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked a slot and wants to pick a file for it
    PickImage(SlotTarget),
    /// Background file read finished, tagged with the upload ticket
    ImageDecoded(SlotTarget, u64, Result<EncodedImage, Arc<DecodeError>>),
    /// User clicked a slot's remove control
    RemoveImage(SlotTarget),
    /// User clicked "Try It On!"
    Generate,
    /// The generation request completed
    GenerationFinished(Result<String, GenerationError>),
    /// User clicked "Download" on the result
    Download,
    /// Background save completed
    Saved(Result<PathBuf, Arc<ExportError>>),
}

impl VirtualTryOn {
    /// Create a new instance of the application
    fn new(client: GeminiClient) -> (Self, Task<Message>) {
        tracing::info!(?client, "🎨 Virtual try-on ready");

        (
            VirtualTryOn {
                session: Session::new(),
                client,
                previews: Previews::default(),
                uploads: UploadTickets::default(),
                save_status: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage(target) => {
                // Native picker, limited to the formats the API accepts
                let file = FileDialog::new()
                    .set_title(target.dialog_title())
                    .add_filter("Images", &decoder::ACCEPTED_EXTENSIONS[..])
                    .pick_file();

                if let Some(path) = file {
                    let ticket = self.uploads.issue(target);
                    tracing::debug!(?target, ticket, path = %path.display(), "Decoding upload");
                    return Task::perform(decoder::decode(path), move |result| {
                        Message::ImageDecoded(target, ticket, result.map_err(Arc::new))
                    });
                }

                Task::none()
            }
            Message::ImageDecoded(target, ticket, result) => {
                // A newer pick or a removal happened since this read started
                if !self.uploads.is_current(target, ticket) {
                    tracing::debug!(?target, ticket, "Dropping superseded upload");
                    return Task::none();
                }

                match target {
                    SlotTarget::Subject => self.session.set_subject_image(result),
                    SlotTarget::Outfit(role) => self.session.set_outfit_image(role, result),
                }
                self.refresh_preview(target);
                Task::none()
            }
            Message::RemoveImage(target) => {
                self.uploads.invalidate(target);
                match target {
                    SlotTarget::Subject => self.session.clear_subject_image(),
                    SlotTarget::Outfit(role) => self.session.clear_outfit_image(role),
                }
                self.refresh_preview(target);
                Task::none()
            }
            Message::Generate => {
                let Some(request) = self.session.begin_generation() else {
                    return Task::none();
                };

                self.previews.set_result(None);
                self.save_status = None;

                let client = self.client.clone();
                Task::perform(
                    async move {
                        client
                            .request_try_on(&request.subject, &request.outfit)
                            .await
                    },
                    Message::GenerationFinished,
                )
            }
            Message::GenerationFinished(result) => {
                self.session.finish_generation(result);
                self.previews.set_result(self.session.outcome().result());
                Task::none()
            }
            Message::Download => {
                // Only reachable once a result exists
                let Some(data_uri) = self.session.outcome().result() else {
                    return Task::none();
                };

                let mut dialog = FileDialog::new()
                    .set_title("Save Try-On Image")
                    .set_file_name(export::suggested_file_name(data_uri));
                if let Some(dir) = export::default_save_dir() {
                    dialog = dialog.set_directory(dir);
                }

                if let Some(path) = dialog.save_file() {
                    self.save_status = Some(format!("Saving to {}...", path.display()));
                    return Task::perform(
                        export::save_result(path, data_uri.to_string()),
                        |result| Message::Saved(result.map_err(Arc::new)),
                    );
                }

                Task::none()
            }
            Message::Saved(result) => {
                self.save_status = Some(match result {
                    Ok(path) => format!("✅ Saved to {}", path.display()),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to save result");
                        format!("⚠️ Could not save image: {}", e)
                    }
                });
                Task::none()
            }
        }
    }

    /// Re-decode the preview for a slot after its image changed
    fn refresh_preview(&mut self, target: SlotTarget) {
        let image = match target {
            SlotTarget::Subject => self.session.subject(),
            SlotTarget::Outfit(role) => self.session.outfit().get(role),
        };
        self.previews.refresh(target, image);
    }

    /// Build one upload slot wired to its target
    fn slot<'a>(&'a self, target: SlotTarget, title: &'a str, description: &'a str) -> UploadSlot<'a, Message> {
        let image = match target {
            SlotTarget::Subject => self.session.subject(),
            SlotTarget::Outfit(role) => self.session.outfit().get(role),
        };

        UploadSlot::for_target(self, target, title, description)
            .preview(self.previews.get(target))
            .file_name(image.and_then(|image| image.file_name.as_deref()))
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = column![
            text("Virtual Cloth Try-On").size(36),
            text("Create your perfect outfit with the power of AI").size(16),
        ]
        .spacing(6)
        .align_x(Alignment::Center);

        let subject_section = column![
            text("1. Upload Your Photo").size(20),
            self.slot(SlotTarget::Subject, "Your Photo", "A clear, front view.")
                .placeholder("👤")
                .size(240.0, 320.0)
                .view(),
        ]
        .spacing(12)
        .align_x(Alignment::Center);

        // 2x2 grid of clothing slots in canonical order
        let mut grid = Column::new().spacing(12);
        for pair in OutfitRole::ALL.chunks(2) {
            let mut line = Row::new().spacing(12);
            for role in pair {
                line = line.push(
                    self.slot(SlotTarget::Outfit(*role), role.title(), role.description())
                        .placeholder(&role.title()[..1])
                        .view(),
                );
            }
            grid = grid.push(line);
        }

        let outfit_section = column![text("2. Add Your Outfit").size(20), grid]
            .spacing(12)
            .align_x(Alignment::Center);

        let generating = self.session.outcome().is_in_progress();
        let generate_button = button(
            text(if generating { "Generating..." } else { "✨ Try It On!" }).size(20),
        )
        .padding([14, 32])
        .on_press_maybe(self.session.can_generate().then_some(Message::Generate));

        let mut actions = column![generate_button]
            .spacing(8)
            .align_x(Alignment::Center);
        if let Some(error) = self.session.upload_error() {
            actions = actions.push(text(error).size(14).style(text::danger));
        }

        let result_section = column![
            text("Result").size(20),
            ui::result_panel::view(
                self.session.outcome(),
                self.previews.result(),
                self.save_status.as_deref(),
            ),
        ]
        .spacing(12)
        .max_width(720.0)
        .align_x(Alignment::Center);

        let content = column![
            header,
            row![subject_section, outfit_section]
                .spacing(48)
                .align_y(Vertical::Top),
            actions,
            result_section,
        ]
        .spacing(40)
        .padding(32)
        .align_x(Alignment::Center);

        scrollable(container(content).center_x(Length::Fill)).into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

impl SlotActions for VirtualTryOn {
    type Message = Message;

    fn on_upload(&self, target: SlotTarget) -> Message {
        Message::PickImage(target)
    }

    fn on_remove(&self, target: SlotTarget) -> Message {
        Message::RemoveImage(target)
    }
}

/// Initialise structured logging; `RUST_LOG` overrides the default level
fn init_tracing() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_target(false)
        .with_file(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn main() -> iced::Result {
    init_tracing();

    // Without an API key every request would fail, so refuse to start
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Startup configuration invalid");
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let client = GeminiClient::new(&config);

    iced::application(
        "Virtual Cloth Try-On",
        VirtualTryOn::update,
        VirtualTryOn::view,
    )
    .theme(VirtualTryOn::theme)
    .centered()
    .run_with(move || VirtualTryOn::new(client))
}
