//! Export and import command handlers

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;

use linkbox_core::{export_document, import_links, to_json, ImportOutcome, RecordStore};

use crate::output::{import_message, Output};

/// Export every link as JSON, to a file or stdout
pub async fn export(store: &RecordStore, path: Option<&Path>, output: &Output) -> Result<()> {
    let links = store.get_all().await.context("Failed to load links")?;
    let doc = export_document(&links, Utc::now());
    let json = to_json(&doc).context("Failed to serialize export")?;

    match path {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write export file: {:?}", path))?;
            output.success(&format!(
                "Exported {} link(s) to {}",
                doc.links.len(),
                path.display()
            ));
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Import links from an export file, skipping URLs already saved
///
/// A file that is not valid JSON is an error; every other outcome is
/// reported.
pub async fn import(store: &RecordStore, path: &Path, output: &Output) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read import file: {:?}", path))?;

    let existing = store.get_all().await.context("Failed to load links")?;
    let report = import_links(store, &bytes, &existing, Utc::now())
        .await
        .context("Failed to import links")?;

    if let ImportOutcome::InvalidJson(_) = report.outcome {
        bail!("{} ({})", import_message(&report), path.display());
    }

    output.print_import_report(&report);
    Ok(())
}
