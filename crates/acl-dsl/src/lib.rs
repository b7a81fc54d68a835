//! Front-end for ACLang adventure scripts.
//!
//! Source text goes through three steps:
//! 1. [`preprocess::expand`] replaces `&use(name)` directives with library text
//! 2. [`lexer::normalize`] strips comments and splits the text into statements
//! 3. [`parser::Parser`] builds a [`SyntaxTree`] of keyword commands and
//!    brace groupings
//!
//! [`parse_source`] runs all three with the default keyword table.

/// Author-facing diagnostics and their terminal rendering.
pub mod diagnostics;
/// Preprocessor errors.
pub mod error;
/// Reserved keyword tables.
pub mod keywords;
/// Tokenizer and statement normalizer.
pub mod lexer;
/// Statement parser.
pub mod parser;
pub mod preprocess;
pub mod syntax;

pub use diagnostics::{Diagnostic, Severity, render_diagnostics};
pub use error::PreprocessError;
pub use keywords::KeywordTable;
pub use parser::{ParseOutput, Parser};
pub use preprocess::{DirLibrary, Library, MemoryLibrary};
pub use syntax::{NodeId, SyntaxKind, SyntaxNode, SyntaxTree};

/// A parse together with the preprocessed text its spans refer to.
#[derive(Debug, Clone)]
pub struct SourceParse {
    /// Source after `&use` expansion.
    pub expanded: String,
    /// Tree and diagnostics.
    pub output: ParseOutput,
}

/// Preprocess, normalize and parse `source` with the default keyword table.
///
/// Only preprocessing can fail; everything else is reported as diagnostics.
pub fn parse_source(source: &str, library: &dyn Library) -> Result<SourceParse, PreprocessError> {
    parse_source_with(source, library, &KeywordTable::default())
}

/// [`parse_source`] with a caller-supplied keyword table.
pub fn parse_source_with(
    source: &str,
    library: &dyn Library,
    keywords: &KeywordTable,
) -> Result<SourceParse, PreprocessError> {
    let expanded = preprocess::expand(source, library)?;
    let normalized = lexer::normalize(&expanded);
    let mut output = Parser::new(keywords).parse(normalized.statements);

    let mut diagnostics = normalized.diagnostics;
    diagnostics.append(&mut output.diagnostics);
    output.diagnostics = diagnostics;

    tracing::info!(
        nodes = output.tree.node_count(),
        diagnostics = output.diagnostics.len(),
        "parsed source"
    );
    Ok(SourceParse { expanded, output })
}
