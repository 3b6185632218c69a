//! Link command handlers

use anyhow::{bail, Context, Result};
use chrono::Utc;

use linkbox_core::{
    build_new_link, build_updated_link, resolve_id, sort_newest_first, Link, LinkFilter,
    LinkInput, RecordStore,
};

use crate::editor::{confirm, prompt_with_default};
use crate::output::Output;

/// Fields given to `add`
pub struct AddArgs {
    pub url: String,
    pub title: Option<String>,
    pub note: Option<String>,
    pub tags: Vec<String>,
}

impl AddArgs {
    fn into_input(self) -> LinkInput {
        LinkInput {
            url: self.url,
            title: self.title.unwrap_or_default(),
            note: self.note.unwrap_or_default(),
            tags: self.tags.join(","),
        }
    }
}

/// Fields given to `edit`; `None` keeps the current value
#[derive(Debug, Default)]
pub struct EditArgs {
    pub url: Option<String>,
    pub title: Option<String>,
    pub note: Option<String>,
    pub tags: Option<String>,
}

impl EditArgs {
    fn is_empty(&self) -> bool {
        self.url.is_none() && self.title.is_none() && self.note.is_none() && self.tags.is_none()
    }

    /// Overlay the given fields onto the current form values
    fn apply(self, mut input: LinkInput) -> LinkInput {
        if let Some(url) = self.url {
            input.url = url;
        }
        if let Some(title) = self.title {
            input.title = title;
        }
        if let Some(note) = self.note {
            input.note = note;
        }
        if let Some(tags) = self.tags {
            input.tags = tags;
        }
        input
    }
}

/// Save a new link
pub async fn add(store: &RecordStore, args: AddArgs, output: &Output) -> Result<()> {
    let link = build_new_link(&args.into_input(), Utc::now());
    if link.url.is_empty() {
        bail!("URL cannot be empty");
    }

    store.add(&link).await.context("Failed to create link")?;

    output.success(&format!("Created link: {}", link.id));
    output.print_link(&link);

    Ok(())
}

/// List links newest first, optionally filtered by tag and search text
pub async fn list(
    store: &RecordStore,
    tag: Option<String>,
    search: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut links = store.get_all().await.context("Failed to load links")?;
    sort_newest_first(&mut links);

    let links = LinkFilter::new(tag, search).apply(links);
    output.print_links(&links);
    Ok(())
}

/// Show a single link
pub async fn show(store: &RecordStore, id: &str, output: &Output) -> Result<()> {
    let links = store.get_all().await.context("Failed to load links")?;
    let link = resolve_id(&links, id)?;

    output.print_link(link);
    Ok(())
}

/// Edit a link
pub async fn edit(store: &RecordStore, id: &str, args: EditArgs, output: &Output) -> Result<()> {
    let links = store.get_all().await.context("Failed to load links")?;
    let existing = resolve_id(&links, id)?;

    let current = LinkInput::from_link(existing);
    let input = if args.is_empty() {
        prompt_for_changes(existing, current)?
    } else {
        args.apply(current)
    };

    let link = build_updated_link(existing, &input, Utc::now());
    if link.url.is_empty() {
        bail!("URL cannot be empty");
    }

    store.update(&link).await.context("Failed to update link")?;

    output.success("Link updated");
    output.print_link(&link);

    Ok(())
}

/// Delete a link
pub async fn delete(store: &RecordStore, id: &str, output: &Output) -> Result<()> {
    let links = store.get_all().await.context("Failed to load links")?;
    let link = resolve_id(&links, id)?;

    // Confirm deletion
    if output.should_prompt() {
        println!("Delete link: {} - {}", link.id.short(8), link.title);
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    store
        .delete(&link.id)
        .await
        .context("Failed to delete link")?;

    output.success(&format!("Deleted link: {}", link.id));

    Ok(())
}

/// Interactive editing, one prompt per field
fn prompt_for_changes(link: &Link, current: LinkInput) -> Result<LinkInput> {
    println!("Editing link: {}", link.id);
    println!("Press Enter to keep current value, or type new value.\n");

    let edits = EditArgs {
        url: prompt_with_default("URL", &current.url)?,
        title: prompt_with_default("Title", &current.title)?,
        note: prompt_with_default("Note", &current.note)?,
        tags: prompt_with_default("Tags (comma-separated)", &current.tags)?,
    };

    Ok(edits.apply(current))
}
