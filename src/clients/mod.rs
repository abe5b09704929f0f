/// Apple Music browser client
pub mod apple_music;
/// Data entities for exported playlists and tracks
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Exported playlist files on disk
pub mod exports;
/// Failure report files
pub mod report;

pub use apple_music::AppleMusicClient;
pub use exports::ExportStore;
pub use report::FailureReport;
