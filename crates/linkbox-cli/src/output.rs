//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use linkbox_core::{ImportOutcome, ImportReport, Link};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single link
    pub fn print_link(&self, link: &Link) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", link.id);
                println!("Title:    {}", link.title);
                println!("URL:      {}", link.url);
                if !link.note.is_empty() {
                    println!("Note:     {}", link.note);
                }
                if !link.tags.is_empty() {
                    println!("Tags:     {}", link.tags.join(", "));
                }
                println!("Created:  {}", link.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:  {}", link.updated_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(link),
            OutputFormat::Quiet => {
                println!("{}", link.id);
            }
        }
    }

    /// Print a list of links
    pub fn print_links(&self, links: &[Link]) {
        match self.format {
            OutputFormat::Human => {
                if links.is_empty() {
                    println!("No links found.");
                    return;
                }
                for link in links {
                    let tags = if link.tags.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", link.tags.join(", "))
                    };
                    println!(
                        "{} | {}{} | {}",
                        link.id.short(8),
                        truncate(&link.title, 35),
                        tags,
                        truncate(&link.url, 45)
                    );
                }
                println!("\n{} link(s)", links.len());
            }
            OutputFormat::Json => print_json(&links),
            OutputFormat::Quiet => {
                for link in links {
                    println!("{}", link.id);
                }
            }
        }
    }

    /// Print a list of tags
    pub fn print_tags(&self, tags: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return;
                }
                for (name, count) in tags {
                    println!("{} ({})", name, count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => {
                let json_tags: Vec<_> = tags
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                print_json(&json_tags);
            }
            OutputFormat::Quiet => {
                for (name, _) in tags {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print the result of an import
    pub fn print_import_report(&self, report: &ImportReport) {
        match self.format {
            OutputFormat::Human => println!("{}", import_message(report)),
            OutputFormat::Json => {
                let (status, already_saved, duplicate_in_file) = match &report.outcome {
                    ImportOutcome::Imported {
                        already_saved,
                        duplicate_in_file,
                    } => ("imported", *already_saved, *duplicate_in_file),
                    ImportOutcome::NoValidLinks => ("no_valid_links", 0, 0),
                    ImportOutcome::AllAlreadyExist => ("all_already_exist", 0, 0),
                    ImportOutcome::InvalidJson(_) => ("invalid_json", 0, 0),
                };
                print_json(&serde_json::json!({
                    "status": status,
                    "inserted": report.inserted,
                    "already_saved": already_saved,
                    "duplicate_in_file": duplicate_in_file,
                    "message": import_message(report),
                }));
            }
            OutputFormat::Quiet => {
                println!("{}", report.inserted);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to render JSON: {}", e),
    }
}

/// Human-readable summary of an import
pub fn import_message(report: &ImportReport) -> String {
    match &report.outcome {
        ImportOutcome::Imported {
            already_saved,
            duplicate_in_file,
        } => {
            let mut message = format!("Imported {} link(s)", report.inserted);
            if *already_saved > 0 {
                message.push_str(&format!(", skipped {} already saved", already_saved));
            }
            if *duplicate_in_file > 0 {
                message.push_str(&format!(
                    ", skipped {} repeated in file",
                    duplicate_in_file
                ));
            }
            message
        }
        ImportOutcome::NoValidLinks => "No valid links found in file".to_string(),
        ImportOutcome::AllAlreadyExist => "All links in file already exist".to_string(),
        ImportOutcome::InvalidJson(e) => format!("File is not valid JSON: {}", e),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
