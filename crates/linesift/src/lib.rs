// linesift front end exports

pub mod app;
pub mod cli;
pub mod config;
pub mod file_manager;
pub mod status_manager;
pub mod text_width;
pub mod ui;

pub use app::{App, FileOutcome, Mode};
pub use config::Config;
pub use file_manager::FileManager;
