use crate::entity::Handle;

/// Alias for `Result<T, AclError>`.
pub type AclResult<T> = Result<T, AclError>;

/// Errors that abort a compile.
///
/// None of these are recoverable within a single compile invocation: the
/// compiler performs no partial output, retry, or rollback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AclError {
    /// A version string or source statement is malformed.
    #[error("format error: {0}")]
    Format(String),

    /// The compiler version is not accepted by the adventure's declared range.
    #[error("ACLang version {compiler} does not match {supported}")]
    VersionMismatch {
        /// The running compiler's version.
        compiler: String,
        /// The adventure's supported-version range.
        supported: String,
    },

    /// The ID space is used up.
    #[error("too many game objects: the ID space of {limit} identifiers is exhausted")]
    ResourceExhausted {
        /// Number of identifiers the allocator can hand out.
        limit: u64,
    },

    /// An entity references something outside the adventure's reachable set,
    /// or something of the wrong kind.
    #[error("invalid reference from {from:?}: {reason}")]
    Referential {
        /// The referencing entity, or `None` for the adventure itself.
        from: Option<Handle>,
        /// What is wrong with the reference.
        reason: String,
    },

    /// An entity has a shape the encoder does not know how to write.
    #[error("unknown game object of kind \"{kind}\" at {handle:?}")]
    UnknownEntity {
        /// The offending entity.
        handle: Handle,
        /// The entity's declared kind name.
        kind: String,
    },

    /// Payload text contains a byte reserved for structural tags.
    #[error("payload {text:?} contains reserved byte 0x{byte:02X}")]
    ReservedPayload {
        /// The offending payload text.
        text: String,
        /// The first reserved byte found.
        byte: u8,
    },
}
