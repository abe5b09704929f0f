//! Rporter - Replicate an exported playlist into an Apple Music library
//!
//! This library provides functionality to walk a previously-exported playlist
//! and add each resolved track to the user's Apple Music library by driving a
//! real browser session.

/// Client modules for interacting with the browser, exports and reports
pub mod clients;
