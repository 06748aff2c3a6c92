//! Import and export of ticket collections.
//!
//! Two import shapes are recognized: a chat export (`{"messages": [...]}`),
//! whose free-text messages are parsed into drafts, and this system's own
//! backup array as produced by [`serialize_backup`].

mod export;
mod import;
mod message;

pub use export::{backup_file_name, serialize_backup};
pub use import::{parse_import, ImportNormalizer, MessageText, TextFragment};
pub use message::{parse_imported_message, ParsedMessage};
