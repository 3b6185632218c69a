//! Tag command handlers

use anyhow::{Context, Result};

use linkbox_core::{tag_counts, RecordStore};

use crate::output::Output;

/// List all tags with usage counts
pub async fn list(store: &RecordStore, output: &Output) -> Result<()> {
    let links = store.get_all().await.context("Failed to load links")?;
    output.print_tags(&tag_counts(&links));
    Ok(())
}
