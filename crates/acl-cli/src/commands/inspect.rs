use std::path::Path;

use acl_codec::{Record, RecordKind, decode, tags};
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn run(artifact: &Path) -> Result<(), String> {
    let bytes = std::fs::read(artifact)
        .map_err(|e| format!("cannot read {}: {e}", artifact.display()))?;
    let decoded = decode(&bytes).map_err(|e| e.to_string())?;

    println!("  {}", decoded.name.bold());
    println!("  {} {}", "compiler:".dimmed(), decoded.compiler_version);
    println!("  {} {}", "runtimes:".dimmed(), decoded.runtimes);
    println!("  {} {}", "starting room:".dimmed(), decoded.starting_room);
    if !decoded.starting_text.is_empty() {
        println!("  {} {}", "starting text:".dimmed(), decoded.starting_text.italic());
    }
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Type", "Summary", "Properties"]);

    for record in &decoded.records {
        table.add_row(vec![
            record.id.to_string(),
            kind_name(record.kind).to_string(),
            truncate(&summary(record)),
            record.properties.len().to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} records", decoded.records.len());
    Ok(())
}

fn kind_name(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Room => "room",
        RecordKind::Descriptions => "descriptions",
        RecordKind::Item => "item",
        RecordKind::Verb => "verb",
        RecordKind::Argument => "argument",
        RecordKind::Code => "code",
        RecordKind::Rendered => "rendered",
    }
}

fn summary(record: &Record) -> String {
    let text = |tag| record.text(tag).unwrap_or_default().to_string();
    match record.kind {
        RecordKind::Room => text(tags::ROOM_NAME),
        RecordKind::Descriptions => text(tags::DESCS_DEFAULT),
        RecordKind::Item => text(tags::ITEM_NAME),
        RecordKind::Verb => text(tags::VERB_NAME),
        RecordKind::Argument => match record.argument_type() {
            Some(kind) => format!("{} ({kind:?})", text(tags::ARGUMENT_NAME)),
            None => text(tags::ARGUMENT_NAME),
        },
        RecordKind::Code => {
            let keyword = record.keyword().map_or("?", |k| k.as_str());
            let args = record.list(tags::CODE_ARGUMENTS).unwrap_or_default();
            format!("{keyword} {}", args.join(" ")).trim_end().to_string()
        }
        RecordKind::Rendered => record.rendering.clone().unwrap_or_default(),
    }
}

fn truncate(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else if s.chars().count() > 60 {
        format!("{}...", s.chars().take(57).collect::<String>())
    } else {
        s.to_string()
    }
}
