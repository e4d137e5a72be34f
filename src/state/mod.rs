/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The session controller that owns uploads and generation status (session.rs)

pub mod data;
pub mod session;
