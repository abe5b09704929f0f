use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::clients::errors::{Error, Result};

const APPLE_MUSIC_URL: &str = "https://music.apple.com";
const SELECTORS_ENV: &str = "PORTER_SELECTORS";
const NO_PROFILE_ENV: &str = "PORTER_NO_PROFILE";

const PAGE_LOAD_DELAY: Duration = Duration::from_secs(2);
const SCROLL_SETTLE: Duration = Duration::from_millis(300);
const MAX_ERROR_LEN: usize = 50;

// Chrome flags that keep the session from advertising itself as automated
const STEALTH_ARGS: [&str; 3] = [
    "--start-maximized",
    "--disable-blink-features=AutomationControlled",
    "--log-level=3",
];

const WEBDRIVER_OVERRIDE: &str = r"
(() => {
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    return true;
})()
";

// Last resort when no selector matches: scan buttons for an 'Add' label and
// click the first visible one from inside the page.
const TEXT_CLICK_SCRIPT: &str = r"
(() => {
    const buttons = Array.from(document.querySelectorAll('button'));
    for (const button of buttons) {
        const label = (button.getAttribute('aria-label') || '') + ' ' + (button.textContent || '');
        const rect = button.getBoundingClientRect();
        if (label.includes('Add') && rect.width > 0 && rect.height > 0) {
            button.scrollIntoView({ block: 'center' });
            button.click();
            return true;
        }
    }
    return false;
})()
";

/// Ordered selector lists for the library controls.
///
/// These are tied to the current Apple Music markup and drift as the site
/// changes, so they are data rather than code: point `PORTER_SELECTORS` at a
/// JSON file to override any list without a rebuild. Apple Music uses
/// different layouts for songs and albums, hence the breadth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub add_button: Vec<String>,
    pub already_added: Vec<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            add_button: [
                // Song page add button
                "button[data-testid='add-to-library-button']",
                "button[aria-label='Add to Library']",
                "button[aria-label='Add to library']",
                // Generic add buttons
                ".we-button--add",
                "button.add-to-library",
                // Plus icon buttons
                "button[aria-label*='Add']",
                ".commerce-button-add",
                // SVG plus icon in button
                "button svg[aria-label*='add' i]",
            ]
            .map(String::from)
            .to_vec(),
            already_added: [
                "button[aria-label='In Library']",
                "button[aria-label='Added to Library']",
                ".we-button--added",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl Selectors {
    // Load overrides from the file named by PORTER_SELECTORS, if any
    pub fn from_env() -> Result<Self> {
        match std::env::var(SELECTORS_ENV) {
            Ok(path) => {
                let contents = std::fs::read_to_string(&path)?;
                let selectors = serde_json::from_str(&contents)?;
                debug!("Loaded selector overrides from {path}");
                Ok(selectors)
            }
            Err(_) => Ok(Selectors::default()),
        }
    }
}

/// Where to find pre-existing login state, if anywhere.
#[derive(Debug, Clone, Default)]
pub struct BrowserOptions {
    pub profile_dir: Option<PathBuf>,
}

impl BrowserOptions {
    // Reuse the local Chrome profile unless PORTER_NO_PROFILE is set
    pub fn from_env() -> Self {
        let profile_dir = if std::env::var(NO_PROFILE_ENV).is_ok() {
            None
        } else {
            default_profile_dir()
        };
        debug!("Browser profile directory: {profile_dir:?}");
        BrowserOptions { profile_dir }
    }
}

fn default_profile_dir() -> Option<PathBuf> {
    let candidates = [
        dirs::data_local_dir().map(|d| d.join("Google").join("Chrome").join("User Data")),
        dirs::config_dir().map(|d| d.join("google-chrome")),
    ];
    candidates.into_iter().flatten().find(|p| p.exists())
}

/// Result of one add attempt. The first two variants count as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyInLibrary,
    NotFound,
    Failed(String),
}

impl AddOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AddOutcome::Added | AddOutcome::AlreadyInLibrary)
    }
}

/// A live browser session pointed at Apple Music.
pub struct AppleMusicClient {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
    selectors: Selectors,
}

impl AppleMusicClient {
    /// Launch a headful browser, reusing the local profile when one was
    /// found; falls back to a fresh unauthenticated session once if the
    /// profile launch fails (e.g. another Chrome instance holds the lock).
    pub async fn launch(options: &BrowserOptions, selectors: Selectors) -> Result<Self> {
        let profile = options.profile_dir.as_deref();
        let (browser, handler_task) = match Self::launch_browser(profile).await {
            Ok(pair) => pair,
            Err(e) if profile.is_some() => {
                warn!("Could not reuse the browser profile: {e}");
                println!("Could not use the existing browser profile.");
                println!("Trying without profile (you'll need to log in)...");
                Self::launch_browser(None).await?
            }
            Err(e) => return Err(e),
        };

        let page = browser.new_page("about:blank").await?;
        page.evaluate(WEBDRIVER_OVERRIDE).await?;

        Ok(AppleMusicClient {
            browser,
            handler_task,
            page,
            selectors,
        })
    }

    async fn launch_browser(profile: Option<&Path>) -> Result<(Browser, JoinHandle<()>)> {
        let mut builder = BrowserConfig::builder().with_head().args(STEALTH_ARGS);
        if let Some(dir) = profile {
            builder = builder.user_data_dir(dir);
        }
        let config = builder.build().map_err(Error::LaunchError)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        // The CDP connection is serviced by this task for the session lifetime
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        Ok((browser, handler_task))
    }

    /// Navigate to the Apple Music home page so the user can log in.
    pub async fn open_home(&self) -> Result<()> {
        self.page.goto(APPLE_MUSIC_URL).await?;
        sleep(PAGE_LOAD_DELAY).await;
        Ok(())
    }

    /// Open a track page and try to add it to the library. Never propagates
    /// an error: anything that goes wrong becomes a `Failed` outcome.
    pub async fn add_to_library(&self, apple_url: &str) -> AddOutcome {
        match self.try_add(apple_url).await {
            Ok(outcome) => outcome,
            Err(e) => AddOutcome::Failed(truncate_error(&e.to_string())),
        }
    }

    async fn try_add(&self, apple_url: &str) -> Result<AddOutcome> {
        self.page.goto(apple_url).await?;
        sleep(PAGE_LOAD_DELAY).await;

        if let Some(control) = self.find_add_control().await {
            self.click_control(&control).await?;
            return Ok(AddOutcome::Added);
        }

        if self.click_by_text().await {
            return Ok(AddOutcome::Added);
        }

        // No add control anywhere; a checkmark means the track is already in
        if self.is_already_added().await {
            return Ok(AddOutcome::AlreadyInLibrary);
        }

        Ok(AddOutcome::NotFound)
    }

    // First visible match wins; list order is the fallback order
    async fn find_add_control(&self) -> Option<Element> {
        for selector in &self.selectors.add_button {
            let Ok(elements) = self.page.find_elements(selector.as_str()).await else {
                continue;
            };
            for element in elements {
                if is_visible(&element).await {
                    return Some(element);
                }
            }
        }
        None
    }

    async fn click_control(&self, element: &Element) -> Result<()> {
        element.scroll_into_view().await?;
        sleep(SCROLL_SETTLE).await;
        if element.click().await.is_err() {
            // Overlays can swallow the direct click; dispatch it from script
            element
                .call_js_fn("function() { this.click(); }", false)
                .await?;
        }
        Ok(())
    }

    async fn click_by_text(&self) -> bool {
        match self.page.evaluate(TEXT_CLICK_SCRIPT).await {
            Ok(result) => result.into_value::<bool>().unwrap_or(false),
            Err(e) => {
                debug!("Text-based add lookup failed: {e}");
                false
            }
        }
    }

    async fn is_already_added(&self) -> bool {
        for selector in &self.selectors.already_added {
            if let Ok(elements) = self.page.find_elements(selector.as_str()).await
                && !elements.is_empty()
            {
                return true;
            }
        }
        false
    }

    /// Close the browser and wait for the CDP handler to drain.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        let _ = self.handler_task.await;
        Ok(())
    }
}

// An element with no clickable point is hidden or collapsed
async fn is_visible(element: &Element) -> bool {
    element.clickable_point().await.is_ok()
}

// Keep per-track failure messages to one short line
fn truncate_error(message: &str) -> String {
    message.chars().take(MAX_ERROR_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_messages_on_char_boundary() {
        let long = "ё".repeat(80);
        let truncated = truncate_error(&long);
        assert_eq!(truncated.chars().count(), MAX_ERROR_LEN);

        let short = "navigation timed out";
        assert_eq!(truncate_error(short), short);
    }

    #[test]
    fn default_selectors_cover_both_control_kinds() {
        let selectors = Selectors::default();
        assert!(!selectors.add_button.is_empty());
        assert!(!selectors.already_added.is_empty());
        assert!(
            selectors
                .add_button
                .iter()
                .any(|s| s.contains("add-to-library-button"))
        );
    }

    #[test]
    fn partial_override_keeps_defaults_for_missing_lists() {
        let json = r#"{"add_button": ["button.custom-add"]}"#;
        let selectors: Selectors = serde_json::from_str(json).unwrap();
        assert_eq!(selectors.add_button, vec!["button.custom-add"]);
        assert_eq!(selectors.already_added, Selectors::default().already_added);
    }

    #[test]
    fn outcome_success_split() {
        assert!(AddOutcome::Added.is_success());
        assert!(AddOutcome::AlreadyInLibrary.is_success());
        assert!(!AddOutcome::NotFound.is_success());
        assert!(!AddOutcome::Failed("boom".to_string()).is_success());
    }
}
