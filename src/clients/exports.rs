use std::path::{Path, PathBuf};

use log::debug;

use crate::clients::{entities::PlaylistExport, errors::Result};

const EXPORT_DIR_ENV: &str = "PORTER_EXPORT_DIR";
const DEFAULT_EXPORT_DIR: &str = "exported";

pub struct ExportStore {
    dir: PathBuf,
}

impl ExportStore {
    pub fn new(dir: PathBuf) -> Self {
        ExportStore { dir }
    }

    // Resolve the export directory from the environment, falling back to ./exported
    pub fn from_env() -> Self {
        let dir = std::env::var(EXPORT_DIR_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_EXPORT_DIR), PathBuf::from);
        debug!("Using export directory {dir:?}");
        ExportStore::new(dir)
    }

    /// Directory the exports live in; failure reports are written next to them.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // List exported JSON files, most recent first. Export filenames embed
    // their timestamp, so descending name order is descending age.
    pub async fn list_exports(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Export directory {:?} does not exist", self.dir);
                return Ok(names);
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                names.push(name.to_string());
            }
        }

        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }

    pub async fn load(&self, file_name: &str) -> Result<PlaylistExport> {
        let path = self.dir.join(file_name);
        let contents = tokio::fs::read_to_string(&path).await?;
        let export: PlaylistExport = serde_json::from_str(&contents)?;
        debug!(
            "Loaded {} tracks from {path:?} (playlist {:?})",
            export.tracks.len(),
            export.playlist_name
        );
        Ok(export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_only_json_sorted_descending() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.json", "c.json", "b.json", "notes.txt", "d.JSON.bak"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }

        let store = ExportStore::new(dir.path().to_path_buf());
        let names = store.list_exports().await.unwrap();
        assert_eq!(names, vec!["c.json", "b.json", "a.json"]);
    }

    #[tokio::test]
    async fn missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExportStore::new(dir.path().join("does-not-exist"));
        assert!(store.list_exports().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn loads_export_contents() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{
            "playlist_name": "Gym",
            "tracks": [
                {"spotify_name": "One", "spotify_artist": "A", "found": true, "apple_url": "https://music.apple.com/1"}
            ]
        }"#;
        std::fs::write(dir.path().join("export.json"), json).unwrap();

        let store = ExportStore::new(dir.path().to_path_buf());
        let export = store.load("export.json").await.unwrap();
        assert_eq!(export.playlist_name, "Gym");
        assert_eq!(export.tracks.len(), 1);
    }

    #[tokio::test]
    async fn load_propagates_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "not json").unwrap();

        let store = ExportStore::new(dir.path().to_path_buf());
        assert!(store.load("broken.json").await.is_err());
    }
}
