use std::path::Path;

use acl_dsl::SyntaxKind;

pub fn run(file: &Path, lib: Option<&Path>) -> Result<(), String> {
    let parse = super::parse_file(file, lib)?;
    if parse.output.has_errors() {
        return Err("check failed with errors".into());
    }

    let tree = &parse.output.tree;
    let count = |kinds: &[SyntaxKind]| {
        tree.nodes()
            .skip(1)
            .filter(|n| kinds.contains(&n.data.kind))
            .count()
    };

    println!("  All checks passed for '{}'.", file.display());
    println!("  {} statements", tree.node_count());
    println!(
        "    {:>4} commands",
        count(&[SyntaxKind::Command, SyntaxKind::GroupingCommand])
    );
    println!(
        "    {:>4} groupings",
        count(&[SyntaxKind::Grouping, SyntaxKind::GroupingCommand])
    );
    println!("    {:>4} values", count(&[SyntaxKind::Value]));
    Ok(())
}
