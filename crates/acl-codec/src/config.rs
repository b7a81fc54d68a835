//! Configuration for the artifact compiler.

use acl_core::{SupportedVersion, Version};

/// Version of this compiler and of the artifact format it writes.
pub const ACLANG_VERSION: Version = Version::new(0, 1, 0);

/// Configuration for a [`Compiler`](crate::Compiler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Compiler version, checked against each adventure's supported range
    /// and written into the artifact header.
    pub version: Version,
    /// Runtime versions able to load the produced artifacts.
    pub runtimes: SupportedVersion,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            version: ACLANG_VERSION,
            runtimes: SupportedVersion::or_higher(ACLANG_VERSION),
        }
    }
}

impl CompilerConfig {
    /// Set the compiler version.
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Set the supported runtime range.
    pub fn with_runtimes(mut self, runtimes: SupportedVersion) -> Self {
        self.runtimes = runtimes;
        self
    }
}
