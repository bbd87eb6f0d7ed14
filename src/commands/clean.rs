//! Clean the public directory

use std::fs;

use crate::error::{Error, Result};
use crate::Folio;

/// Remove the public directory
pub fn run(folio: &Folio) -> Result<()> {
    if folio.public_dir.exists() {
        fs::remove_dir_all(&folio.public_dir).map_err(|e| Error::write(&folio.public_dir, e))?;
        tracing::info!("Deleted: {:?}", folio.public_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        // Nothing to remove is fine
        run(&folio).unwrap();

        fs::create_dir_all(folio.public_dir.join("2018")).unwrap();
        fs::write(folio.public_dir.join("index.html"), "x").unwrap();
        run(&folio).unwrap();
        assert!(!folio.public_dir.exists());
    }
}
