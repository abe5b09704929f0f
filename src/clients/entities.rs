use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TrackRecord {
    pub spotify_name: String,
    pub spotify_artist: String,
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub apple_url: Option<String>, // only present when the exporter resolved a match
}

impl TrackRecord {
    // A track can only be processed when the exporter matched it to a URL
    pub fn is_addable(&self) -> bool {
        self.found && self.apple_url.is_some()
    }

    pub fn label(&self) -> String {
        format!("{} - {}", self.spotify_name, self.spotify_artist)
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaylistExport {
    #[serde(default = "unknown_playlist")]
    pub playlist_name: String,
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,
}

fn unknown_playlist() -> String {
    "Unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(found: bool, apple_url: Option<&str>) -> TrackRecord {
        TrackRecord {
            spotify_name: "Karma Police".to_string(),
            spotify_artist: "Radiohead".to_string(),
            found,
            apple_url: apple_url.map(String::from),
        }
    }

    #[test]
    fn addable_requires_found_and_url() {
        assert!(record(true, Some("https://music.apple.com/x")).is_addable());
        assert!(!record(false, Some("https://music.apple.com/x")).is_addable());
        assert!(!record(true, None).is_addable());
        assert!(!record(false, None).is_addable());
    }

    #[test]
    fn label_is_name_dash_artist() {
        assert_eq!(record(true, None).label(), "Karma Police - Radiohead");
    }

    #[test]
    fn export_defaults_for_missing_fields() {
        let export: PlaylistExport = serde_json::from_str("{}").unwrap();
        assert_eq!(export.playlist_name, "Unknown");
        assert!(export.tracks.is_empty());
    }

    #[test]
    fn export_parses_tracks() {
        let json = r#"{
            "playlist_name": "Road Trip",
            "tracks": [
                {"spotify_name": "One", "spotify_artist": "A", "found": true, "apple_url": "https://music.apple.com/1"},
                {"spotify_name": "Two", "spotify_artist": "B", "found": false}
            ]
        }"#;
        let export: PlaylistExport = serde_json::from_str(json).unwrap();
        assert_eq!(export.playlist_name, "Road Trip");
        assert_eq!(export.tracks.len(), 2);
        assert!(export.tracks[0].is_addable());
        assert!(!export.tracks[1].is_addable());
    }
}
