use std::time::Duration;

use log::{info, warn};
use tokio::time::sleep;

use rporter::clients::{
    AppleMusicClient, ExportStore, FailureReport,
    apple_music::{AddOutcome, BrowserOptions, Selectors},
    entities::TrackRecord,
    errors::{Error, Result},
};

use crate::prompt;

const TRACK_DELAY_ENV: &str = "PORTER_TRACK_DELAY_MS";
const DEFAULT_TRACK_DELAY: Duration = Duration::from_millis(1500);

// Configuration for the Porter struct
pub struct Config {
    pub store: ExportStore,
    pub browser: BrowserOptions,
    pub selectors: Selectors,
    pub track_delay: Duration,
}

pub struct ConfigBuilder {
    store: Option<ExportStore>,
    browser: Option<BrowserOptions>,
    selectors: Option<Selectors>,
    track_delay: Option<Duration>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            browser: None,
            selectors: None,
            track_delay: None, // Delay between tracks. Default is 1.5s, can be tuned via env.
        }
    }

    pub fn build(self) -> Result<Config> {
        let store = self.store.unwrap_or_else(ExportStore::from_env);
        let browser = self.browser.unwrap_or_else(BrowserOptions::from_env);
        let selectors = match self.selectors {
            Some(s) => s,
            None => Selectors::from_env()?,
        };
        let track_delay = match self.track_delay {
            Some(d) => d,
            None => track_delay_from_env()?,
        };
        Ok(Config {
            store,
            browser,
            selectors,
            track_delay,
        })
    }
}

fn track_delay_from_env() -> Result<Duration> {
    match std::env::var(TRACK_DELAY_ENV) {
        Ok(raw) => {
            let millis: u64 = raw.parse().map_err(|_| {
                Error::ConfigurationError(format!(
                    "{TRACK_DELAY_ENV} must be a number of milliseconds, got {raw:?}"
                ))
            })?;
            Ok(Duration::from_millis(millis))
        }
        Err(_) => Ok(DEFAULT_TRACK_DELAY),
    }
}

// Everything decided before the browser starts
struct Plan {
    tracks: Vec<TrackRecord>,
    start_index: usize,
}

// The main Porter struct that walks the exported tracks through the browser
pub struct Porter {
    config: Config,
}

impl Porter {
    pub fn new(config: Config) -> Self {
        Porter { config }
    }

    pub async fn run(&self) -> Result<()> {
        let Some(plan) = self.prepare().await? else {
            return Ok(());
        };

        println!("\nStarting browser...");
        let client =
            match AppleMusicClient::launch(&self.config.browser, self.config.selectors.clone())
                .await
            {
                Ok(client) => client,
                Err(e) => {
                    eprintln!("\nCould not start the browser: {e}");
                    eprintln!("Make sure:");
                    eprintln!("  1. A Chromium-based browser is installed");
                    eprintln!("  2. All of its other windows are closed");
                    return Err(e);
                }
            };

        let result = self.process(&client, &plan).await;

        // The browser is released no matter how processing went
        if let Err(e) = client.close().await {
            warn!("Error while closing the browser: {e}");
        }
        if result.is_ok() {
            println!("\nDone! Check your Apple Music library.");
        }
        result
    }

    // Interactive selection phase; returns None on any clean cancellation
    async fn prepare(&self) -> Result<Option<Plan>> {
        let exports = self.config.store.list_exports().await?;
        if exports.is_empty() {
            println!(
                "No exported files found in {}.",
                self.config.store.dir().display()
            );
            println!("Run the playlist exporter first to generate a song list.");
            return Ok(None);
        }

        println!("Available exports:");
        for (i, name) in exports.iter().enumerate() {
            println!("  {}. {name}", i + 1);
        }
        let selection = prompt::select_index(
            &format!("Select file (1-{})", exports.len()),
            exports.len(),
        )?;
        let Some(file_idx) = selection else {
            println!("Invalid choice!");
            return Ok(None);
        };

        let export = self.config.store.load(&exports[file_idx]).await?;
        println!(
            "\nLoaded {} songs from '{}'",
            export.tracks.len(),
            export.playlist_name
        );

        let tracks = addable_tracks(export.tracks);
        println!("Songs with Apple Music links: {}", tracks.len());
        if tracks.is_empty() {
            println!("No songs with Apple Music links to add!");
            return Ok(None);
        }

        let start_index = prompt::start_offset(
            &format!("Start from song number (1-{}) [1]", tracks.len()),
            tracks.len(),
        )?;

        println!(
            "\nWill add {} songs to the Apple Music library.",
            tracks.len() - start_index
        );
        println!("\nIMPORTANT: close all other browser windows before continuing,");
        println!("the tool needs exclusive access to the browser profile.");
        if !prompt::confirm("Ready to start? (yes/no)")? {
            println!("Cancelled.");
            return Ok(None);
        }

        Ok(Some(Plan {
            tracks,
            start_index,
        }))
    }

    async fn process(&self, client: &AppleMusicClient, plan: &Plan) -> Result<()> {
        println!("\nOpening Apple Music...");
        client.open_home().await?;

        println!("\nCheck the browser window and log in if you need to.");
        prompt::pause("Press Enter when you're logged in and ready")?;

        println!("\nStarting to add songs...");

        let total = plan.tracks.len();
        let mut successful = 0usize;
        let mut failed = 0usize;
        let mut report = FailureReport::new();

        for (offset, track) in plan.tracks[plan.start_index..].iter().enumerate() {
            let number = plan.start_index + offset + 1;
            let label = track.label();
            println!("[{number}/{total}] {label}");

            // prepare() only keeps addable tracks, so the URL is present
            let Some(apple_url) = track.apple_url.as_deref() else {
                continue;
            };

            let outcome = client.add_to_library(apple_url).await;
            match &outcome {
                AddOutcome::Added => println!("         added to library"),
                AddOutcome::AlreadyInLibrary => println!("         already in library"),
                AddOutcome::NotFound => println!("         could not find an add control"),
                AddOutcome::Failed(message) => println!("         error: {message}"),
            }
            if outcome.is_success() {
                successful += 1;
            } else {
                failed += 1;
                report.record(label);
            }

            sleep(self.config.track_delay).await;
        }

        println!("\nComplete!");
        println!("  added:          {successful}");
        println!("  failed/skipped: {failed}");
        info!("Processed {} tracks: {successful} added, {failed} failed", successful + failed);

        if !report.is_empty() {
            let path = report.write_to(self.config.store.dir()).await?;
            println!("Failed songs saved to: {}", path.display());
        }

        prompt::pause("Press Enter to close the browser")?;
        Ok(())
    }
}

fn addable_tracks(tracks: Vec<TrackRecord>) -> Vec<TrackRecord> {
    tracks.into_iter().filter(TrackRecord::is_addable).collect()
}
