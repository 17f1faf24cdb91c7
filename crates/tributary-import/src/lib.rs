//! # tributary-import — Graph snapshot import.
//!
//! Deserializes an exported task snapshot (JSON) into validated node and
//! edge value objects ready for graph construction. Recoverable data-quality
//! defects (duplicate rows, citations of unknown nodes, rows without an
//! assignee) become warnings and are repaired or dropped; structural
//! damage (malformed JSON, unparseable numbers, empty ids) is a hard error.

pub mod error;
pub mod snapshot;

pub use error::ImportError;
pub use snapshot::{parse_snapshot, Imported, ImportWarning};
