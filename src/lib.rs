//! Derive a Material 3 color scheme from a wallpaper and spread it across
//! templates, config files and the desktop.

pub mod app;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod system;
pub mod theme;

pub use error::{Error, Result};
