//! `&use(name)` expansion.
//!
//! Directives are found with the lexer, so a `&use(..)` inside a comment or a
//! string literal is left alone. Included text is expanded recursively.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::PreprocessError;
use crate::lexer::{self, Token};

/// File extension of library sources.
pub const LIBRARY_EXTENSION: &str = "acl";

/// A source of named library texts.
pub trait Library {
    /// Text of the library called `name`, or `None` if there is no such library.
    fn load(&self, name: &str) -> Result<Option<String>, PreprocessError>;
}

/// Libraries stored as `<dir>/<name>.acl` files.
#[derive(Debug, Clone)]
pub struct DirLibrary {
    root: PathBuf,
}

impl DirLibrary {
    /// A library rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory searched for library files.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Library for DirLibrary {
    fn load(&self, name: &str) -> Result<Option<String>, PreprocessError> {
        // Names are plain file stems; anything that could leave the root is unknown.
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Ok(None);
        }
        let path = self.root.join(format!("{name}.{LIBRARY_EXTENSION}"));
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PreprocessError::Io { path, source }),
        }
    }
}

/// Libraries held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryLibrary {
    entries: HashMap<String, String>,
}

impl MemoryLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(name.into(), text.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }
}

impl Library for MemoryLibrary {
    fn load(&self, name: &str) -> Result<Option<String>, PreprocessError> {
        Ok(self.entries.get(name).cloned())
    }
}

/// Replace every `&use(name)` directive in `source` with the expanded text of
/// that library.
///
/// Only the first comma-separated argument names the library. Other
/// directives are left in place.
pub fn expand(source: &str, library: &dyn Library) -> Result<String, PreprocessError> {
    let mut chain = Vec::new();
    expand_with(source, library, &mut chain)
}

fn expand_with(
    source: &str,
    library: &dyn Library,
    chain: &mut Vec<String>,
) -> Result<String, PreprocessError> {
    let (tokens, _) = lexer::lex(source);
    let mut out = String::with_capacity(source.len());
    let mut copied = 0;

    for (token, span) in tokens {
        let Token::Directive { name, args } = token else {
            continue;
        };
        if name != "use" {
            continue;
        }
        let lib = args.split(',').next().unwrap_or_default().trim().to_string();

        if chain.contains(&lib) {
            let mut cycle = chain.clone();
            cycle.push(lib);
            return Err(PreprocessError::IncludeCycle { chain: cycle });
        }
        let text = library
            .load(&lib)?
            .ok_or_else(|| PreprocessError::LibraryNotFound { name: lib.clone() })?;
        tracing::debug!(library = %lib, bytes = text.len(), "expanding &use");

        chain.push(lib);
        let expanded = expand_with(&text, library, chain)?;
        chain.pop();

        out.push_str(&source[copied..span.start]);
        out.push_str(&expanded);
        copied = span.end;
    }

    out.push_str(&source[copied..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_nested_uses() {
        let lib = MemoryLibrary::new()
            .with("std", "verb: look;\n&use(core)")
            .with("core", "verb: wait;");
        let out = expand("&use(std)\nroom: Hall;", &lib).unwrap();
        assert_eq!(out, "verb: look;\nverb: wait;\nroom: Hall;");
    }

    #[test]
    fn only_first_argument_names_the_library() {
        let lib = MemoryLibrary::new().with("std", "X");
        assert_eq!(expand("&use( std , ignored)", &lib).unwrap(), "X");
    }

    #[test]
    fn missing_library_is_fatal() {
        let err = expand("&use(nope)", &MemoryLibrary::new()).unwrap_err();
        assert!(matches!(err, PreprocessError::LibraryNotFound { ref name } if name == "nope"));
        assert_eq!(err.to_string(), "library \"nope\" not found");
    }

    #[test]
    fn include_cycles_are_detected() {
        let lib = MemoryLibrary::new().with("a", "&use(b)").with("b", "&use(a)");
        let err = expand("&use(a)", &lib).unwrap_err();
        assert_eq!(err.to_string(), "include cycle: a -> b -> a");
    }

    #[test]
    fn repeated_use_is_not_a_cycle() {
        let lib = MemoryLibrary::new().with("std", "S");
        assert_eq!(expand("&use(std) &use(std)", &lib).unwrap(), "S S");
    }

    #[test]
    fn directives_in_comments_and_strings_are_kept() {
        let source = "// &use(std)\nsay: \"&use(std)\";";
        let out = expand(source, &MemoryLibrary::new()).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn other_directives_are_untouched() {
        let out = expand("&define(x) room: Hall;", &MemoryLibrary::new()).unwrap();
        assert_eq!(out, "&define(x) room: Hall;");
    }

    #[test]
    fn dir_library_reads_acl_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("std.acl"), "verb: look;").unwrap();
        let lib = DirLibrary::new(dir.path());

        assert_eq!(lib.load("std").unwrap().as_deref(), Some("verb: look;"));
        assert!(lib.load("missing").unwrap().is_none());
        assert!(lib.load("../std").unwrap().is_none());
        assert_eq!(expand("&use(std)", &lib).unwrap(), "verb: look;");
    }
}
