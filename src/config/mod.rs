//! Configuration module for the trainer application.

// Can all be private now because we have a public re-export.
mod api;
mod categories;
mod debug;
mod modes;
mod types;

// Can't be private because we don't re-export it
pub mod plot;

// Re-export commonly used items
pub use api::{AppConfig, TRAINER_API, TrainerApiConfig};
pub use categories::{CATEGORIES, Category, CategoryId};
pub use debug::DF;
pub use modes::{
    DEFAULT_MODE, MANUAL_RESPONSE, MANUAL_TITLE, MODES, ModeAction, ModeConfig, ModeId,
    RequestShape, ResponseShape, lookup, mode,
};
pub use plot::PLOT_CONFIG;
pub use types::{Direction, Timeframe};
