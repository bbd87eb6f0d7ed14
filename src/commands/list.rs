//! List site content

use crate::content::ContentStore;
use crate::error::Result;
use crate::Folio;

/// Print every post, newest first
pub fn run(folio: &Folio) -> Result<()> {
    let store = folio.load()?;
    println!("Posts ({}):", store.len());
    for line in lines(&store) {
        println!("  {}", line);
    }
    Ok(())
}

/// One line per post: date, slug, title and source file
pub fn lines(store: &ContentStore) -> Vec<String> {
    store
        .iter()
        .map(|post| {
            format!(
                "{} {} - {} [{}]",
                post.date.format("%Y-%m-%d"),
                post.slug,
                post.title,
                post.source
            )
        })
        .collect()
}
