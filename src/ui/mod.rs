/// User interface building blocks
///
/// - `upload_slot.rs` - reusable photo slot (person and clothing)
/// - `result_panel.rs` - generation status and result display
/// - `preview.rs` - decoded image handles for the previews

pub mod preview;
pub mod result_panel;
pub mod upload_slot;
