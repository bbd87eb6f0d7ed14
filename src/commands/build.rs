//! Build the static site

use std::time::Instant;

use crate::error::Result;
use crate::generator::Generator;
use crate::Folio;

/// What a build produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub posts: usize,
    pub files: usize,
}

/// Load every post and regenerate the public directory
pub fn run(folio: &Folio) -> Result<BuildSummary> {
    let start = Instant::now();

    let store = folio.load()?;
    let generator = Generator::new(&folio.config)?;
    let files = generator.generate(&store, &folio.public_dir)?;

    tracing::info!(
        "Generated {} files from {} posts in {:.2}s",
        files,
        store.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(BuildSummary {
        posts: store.len(),
        files,
    })
}
