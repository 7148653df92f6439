use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::models::ProductRecord;
use crate::utils::error::Result;

/// Output filename stem for a category: the final path segment of its URL
/// with any query string stripped.
pub fn category_slug(link: &str) -> String {
    let without_query = link.split('?').next().unwrap_or(link);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}

/// Persists one category's records as pretty-printed JSON, overwriting any
/// prior file for the same slug. Write failures are fatal for the run.
pub struct CatalogWriter {
    output_dir: PathBuf,
}

impl CatalogWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn write(&self, slug: &str, records: &[ProductRecord]) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{slug}.json"));
        fs::create_dir_all(&self.output_dir)?;

        let json = serde_json::to_string_pretty(records)?;
        fs::write(&path, json)?;

        info!(path = %path.display(), total = records.len(), "category catalog saved");
        Ok(path)
    }
}
