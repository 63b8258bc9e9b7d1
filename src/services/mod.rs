// LinkSaver services
// Services provide supporting functionality: summaries, titles, settings, logging.

pub mod logging;
pub mod settings_engine;
pub mod summary_service;
pub mod title_extractor;
