pub mod check;
pub mod inspect;
pub mod parse;
pub mod sample;

use std::path::Path;

use acl_dsl::diagnostics::{Severity, render_diagnostics};
use acl_dsl::{DirLibrary, SourceParse};

/// Read, preprocess and parse a script, printing its diagnostics.
fn parse_file(file: &Path, lib: Option<&Path>) -> Result<SourceParse, String> {
    let source = std::fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;

    let root = match lib {
        Some(dir) => dir.to_path_buf(),
        None => file.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let library = DirLibrary::new(root);

    let parse = acl_dsl::parse_source(&source, &library).map_err(|e| e.to_string())?;
    print_diagnostics(&parse, file);
    Ok(parse)
}

/// Print diagnostics to stderr using ariadne.
fn print_diagnostics(parse: &SourceParse, file: &Path) {
    let diagnostics = &parse.output.diagnostics;
    if diagnostics.is_empty() {
        return;
    }

    let filename = file.display().to_string();
    let rendered = render_diagnostics(&parse.expanded, &filename, diagnostics);
    eprint!("{rendered}");

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics.len() - errors;

    if errors > 0 {
        eprintln!(
            "  {} error{}, {} warning{}",
            errors,
            if errors == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" },
        );
    } else {
        eprintln!(
            "  {} warning{}",
            warnings,
            if warnings == 1 { "" } else { "s" },
        );
    }
}
