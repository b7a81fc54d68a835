use std::path::PathBuf;

/// Errors raised while expanding `&use(..)` directives.
///
/// All of them are fatal for the current parse.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    /// No library with this name exists.
    #[error("library \"{name}\" not found")]
    LibraryNotFound {
        /// The requested library name.
        name: String,
    },

    /// A library includes itself, directly or through others.
    #[error("include cycle: {}", chain.join(" -> "))]
    IncludeCycle {
        /// Library names from the outermost include to the repeated one.
        chain: Vec<String>,
    },

    /// A library file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path of the library file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
