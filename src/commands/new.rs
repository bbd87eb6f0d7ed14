//! Create a new post or page

use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::content::Layout;
use crate::error::{Error, Result};
use crate::Folio;

/// Scaffold a post dated today
pub fn run(folio: &Folio, title: &str, layout: Layout) -> Result<PathBuf> {
    let today = chrono::Local::now().date_naive();
    create_post(folio, title, layout, today)
}

/// Scaffold `<posts_dir>/YYYY-MM-DD-<slug>.md`. Refuses to overwrite an
/// existing file.
pub fn create_post(folio: &Folio, title: &str, layout: Layout, date: NaiveDate) -> Result<PathBuf> {
    let target_dir = folio.source_dir.join(&folio.config.posts_dir);

    let slug = slug::slugify(title);
    if slug.is_empty() {
        return Err(Error::MissingRequiredField {
            path: target_dir.display().to_string(),
            field: "slug",
        });
    }

    fs::create_dir_all(&target_dir).map_err(|e| Error::write(&target_dir, e))?;

    let file_path = target_dir.join(format!("{}-{}.md", date.format("%Y-%m-%d"), slug));
    let content = scaffold(title, layout, date);

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&file_path)
        .map_err(|e| Error::write(&file_path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::write(&file_path, e))?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

fn scaffold(title: &str, layout: Layout, date: NaiveDate) -> String {
    // Single-quoted YAML: the only escape is a doubled quote
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    format!(
        "---\nlayout: {}\ntitle: '{}'\ndate: {}\n---\n\nWrite your {} here.\n",
        layout,
        title.replace('\'', "''"),
        date.format("%Y-%m-%d"),
        layout
    )
}
