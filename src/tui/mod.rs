//! TUI module: Terminal User Interface using Ratatui.
//!
//! One form screen for the 13 clinical parameters and one result screen
//! with the input echo and the risk message.

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
pub use ui::form::{Field, FormState};
pub use ui::result::ResultState;
