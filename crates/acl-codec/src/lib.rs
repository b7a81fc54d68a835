//! Binary artifact format for compiled ACLang adventures.
//!
//! The [`Compiler`] checks an [`Adventure`](acl_core::Adventure), assigns IDs
//! to its game objects and writes the tagged byte stream described in
//! [`tags`]. [`decode`] reads an artifact back into [`Record`]s for
//! inspection and testing.
//!
//! ```text
//! ACLANG <version> VERSION_RUNTIME_SEP <runtimes> END_RUNTIME
//! STARTING_ROOM <id> END_RECORD
//! ADVENTURE_NAME <name> END_RECORD
//! ADVENTURE_START_TEXT <text> END_RECORD
//! BEGIN_LOOKUP <record>* END_LOOKUP
//! ```

/// Compiler configuration.
pub mod config;
/// Artifact decoder.
pub mod decoder;
/// Artifact encoder.
pub mod encoder;
pub mod tags;

pub use config::{ACLANG_VERSION, CompilerConfig};
pub use decoder::{Artifact, Record, RecordKind, decode};
pub use encoder::{Compiler, check_payload, compile, encode_entity};
