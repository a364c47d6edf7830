//! # Meshgrad I/O
//!
//! Everything that touches the filesystem: the durable session file, editor
//! settings, gallery records, and export artifacts (SVG, PNG, WebP, CSS).

pub mod export;
pub mod record;
pub mod settings;
pub mod storage;

pub use export::{export, Export, ExportError, ExportFormat, ExportOptions};
pub use record::GradientRecord;
pub use settings::{EditorSettings, SettingsError};
pub use storage::{LocalStore, StorageError};
