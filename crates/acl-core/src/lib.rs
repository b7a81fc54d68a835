//! Core types for ACLang: versions, game objects, and the adventure graph.
//!
//! This crate defines the object model that the compiler encodes. It is
//! independent of the script parser: an [`Adventure`] is built in code by
//! registering [`GameObject`]s and wiring them together through [`Handle`]s.

/// The adventure arena, registration, ID assignment and validation.
pub mod adventure;
/// Game object shapes, handles, IDs and property values.
pub mod entity;
/// Error types used throughout the toolchain.
pub mod error;
/// The monotonic ID allocator.
pub mod id;
/// Semantic versions and supported-version ranges.
pub mod version;

/// Re-export the adventure model.
pub use adventure::Adventure;
/// Re-export game object types.
pub use entity::{
    Argument, ArgumentType, Code, Descriptions, Direction, EntityKind, GameObject, Handle, Item,
    Keyword, ObjectId, PropertyValue, Room, Verb,
};
/// Re-export error types.
pub use error::{AclError, AclResult};
/// Re-export the ID allocator.
pub use id::IdAllocator;
/// Re-export version types.
pub use version::{SupportedVersion, Version};
