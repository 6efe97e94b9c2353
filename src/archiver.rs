use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::ScrapeError;
use crate::models::{self, ProductRecord};

pub fn output_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{} - whishlist.csv", date.format("%Y-%m-%d")))
}

/// Append-only output file, recreated with a header when opened.
pub struct Archive {
    path: PathBuf,
}

impl Archive {
    pub fn create(path: PathBuf) -> Result<Self, ScrapeError> {
        if path.exists() {
            debug!("removing previous {}", path.display());
            fs::remove_file(&path)?;
        }
        let mut file = File::create(&path)?;
        writeln!(file, "{}", models::HEADER)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ProductRecord) -> Result<(), ScrapeError> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(record.to_row().as_bytes())?;
        Ok(())
    }
}
