use crate::output::print_json;
use erk_core::schema::{self, FieldError};
use erk_core::scan::scan_all;
use erk_core::ErkError;
use serde::Serialize;

#[derive(Serialize)]
struct BlockReport {
    kind: String,
    valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

/// Validate every block in `text`. Fails if any known block is invalid.
pub fn run(text: &str, json: bool) -> anyhow::Result<()> {
    let reports: Vec<BlockReport> = scan_all(text)
        .into_iter()
        .map(|block| match schema::validate(&block.kind, &block.data) {
            Ok(()) => BlockReport {
                kind: block.kind,
                valid: true,
                errors: Vec::new(),
                note: None,
            },
            Err(ErkError::Validation(failure)) => BlockReport {
                kind: block.kind,
                valid: false,
                errors: failure.errors,
                note: None,
            },
            Err(other) => BlockReport {
                kind: block.kind,
                valid: true,
                errors: Vec::new(),
                note: Some(other.to_string()),
            },
        })
        .collect();

    let invalid = reports.iter().filter(|r| !r.valid).count();

    if json {
        print_json(&reports)?;
    } else if reports.is_empty() {
        println!("No metadata blocks found.");
    } else {
        for r in &reports {
            let status = if r.valid { "ok" } else { "INVALID" };
            println!("{:<24} {}", r.kind, status);
            for e in &r.errors {
                println!("  - {e}");
            }
            if let Some(note) = &r.note {
                println!("  ({note})");
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{invalid} invalid metadata block(s)");
    }
    Ok(())
}
