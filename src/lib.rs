//! Visual Studio Code as the external script editor of a Unity project.
//!
//! [`Integration`] reacts to the host editor's hooks: it patches the
//! generated solution and project files, writes `.vscode/launch.json` with
//! the editor's debugger port, and points the host's script editor
//! preferences at Code while remembering what they were before.

pub mod config;
pub mod debug;
pub mod editor;
pub mod integration;
pub mod project;
pub mod update;
pub mod workspace;

mod error;

pub use config::{FilePreferences, MemoryPreferences, Preferences};
pub use error::{Error, Result};
pub use integration::Integration;
pub use project::ProjectFileGenerator;
