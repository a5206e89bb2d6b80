//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so every command
//! shares one look.

use comfy_table::{ContentArrangement, Table};
use console::style;

use super::short_id;
use crate::vault::{DecryptedItem, ItemResult, VaultRecord};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Dimmed hint line, e.g. which command to run next.
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of items (ID, Title, Username, Category, Updated).
///
/// Items that failed to decrypt get a row of their own with the reason,
/// so one bad blob never hides the rest.
pub fn print_items_table(items: &[ItemResult]) {
    if items.is_empty() {
        info("No items in this vault yet.");
        tip("Run `fishvault add <TITLE>` to add your first credential.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Title", "Username", "Category", "Updated"]);

    for item in items {
        let updated = item.updated_at.format(TIME_FORMAT).to_string();
        match &item.record {
            Ok(record) => table.add_row(vec![
                short_id(&item.id).to_string(),
                record.title.clone(),
                record.username.clone(),
                category_cell(record),
                updated,
            ]),
            Err(e) => table.add_row(vec![
                short_id(&item.id).to_string(),
                style(format!("<unreadable: {e}>")).red().to_string(),
                String::new(),
                String::new(),
                updated,
            ]),
        };
    }

    println!("{table}");
}

/// Print a table of decrypted items, as returned by search.
pub fn print_decrypted_table(items: &[DecryptedItem]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Title", "Username", "Website", "Category"]);

    for item in items {
        table.add_row(vec![
            short_id(&item.id).to_string(),
            item.record.title.clone(),
            item.record.username.clone(),
            item.record.website_url.clone().unwrap_or_default(),
            category_cell(&item.record),
        ]);
    }

    println!("{table}");
}

/// Print every field of one item.  The secret is masked unless `reveal`.
pub fn print_item(item: &DecryptedItem, reveal: bool) {
    let record = &item.record;
    let secret = if reveal {
        record.secret.clone()
    } else {
        "\u{2022}".repeat(8)
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["ID".to_string(), item.id.clone()]);
    table.add_row(vec!["Title".to_string(), record.title.clone()]);
    table.add_row(vec!["Username".to_string(), record.username.clone()]);
    table.add_row(vec!["Secret".to_string(), secret]);
    if let Some(url) = &record.website_url {
        table.add_row(vec!["Website".to_string(), url.clone()]);
    }
    table.add_row(vec!["Category".to_string(), category_cell(record)]);
    if let Some(notes) = &record.notes {
        table.add_row(vec!["Notes".to_string(), notes.clone()]);
    }
    table.add_row(vec![
        "Created".to_string(),
        item.created_at.format(TIME_FORMAT).to_string(),
    ]);
    table.add_row(vec![
        "Updated".to_string(),
        item.updated_at.format(TIME_FORMAT).to_string(),
    ]);

    println!("{table}");
}

fn category_cell(record: &VaultRecord) -> String {
    match &record.category {
        Some(raw) => {
            let kind = record.category_kind();
            format!("{} {raw}", kind.glyph())
        }
        None => String::new(),
    }
}
