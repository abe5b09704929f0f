use std::path::{Path, PathBuf};

use chrono::Local;
use log::debug;

use crate::clients::errors::Result;

/// Accumulates the `"<name> - <artist>"` labels of tracks that could not be
/// added, and writes them to a timestamped text file next to the exports.
#[derive(Debug, Default)]
pub struct FailureReport {
    entries: Vec<String>,
}

impl FailureReport {
    pub fn new() -> Self {
        FailureReport::default()
    }

    pub fn record(&mut self, label: String) {
        self.entries.push(label);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Songs that failed to add:\n");
        out.push_str(&"=".repeat(40));
        out.push('\n');
        for entry in &self.entries {
            out.push_str(entry);
            out.push('\n');
        }
        out
    }

    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let file_name = format!("failed_songs_{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
        let path = dir.join(file_name);
        tokio::fs::write(&path, self.render()).await?;
        debug!("Wrote failure report to {path:?}");
        Ok(path)
    }
}
