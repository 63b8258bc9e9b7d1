// LinkSaver shared type definitions
// Each submodule defines types used across the application.

pub mod bookmark;
pub mod errors;
pub mod settings;
