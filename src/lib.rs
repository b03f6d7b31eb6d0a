//! # Geministics
//!
//! A small personal publishing site for poems, thoughts and pages.
//!
//! ## Architecture
//!
//! ```text
//! Storage (SQLite key-value) ← ContentStore → listeners
//!                 ↑                 ↓
//!          RefreshWatcher ← Broadcaster → Reloader
//! ```
//!
//! Every instance sharing a storage file keeps its own in-memory copy of the
//! content list. Changes are written to storage, announced on the broadcast
//! channel and marked with a refresh marker so other instances reload.
//!
//! ## Quick Start
//!
//! ```bash
//! # Browse published content
//! geministics list
//!
//! # Publish a poem (admin)
//! geministics --password '…' add --type poem --title "Dusk" --file dusk.txt
//!
//! # Follow changes made elsewhere
//! geministics watch
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together storage, the
/// content store, sync and the feedback forwarder.
pub mod app;

/// Admin password gate and session flag.
pub mod auth;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/geministics/config.toml`.
pub mod config;

/// The in-memory content list with persistence and change listeners.
pub mod content;

/// Core domain models.
///
/// - [`ContentItem`](domain::ContentItem): a poem, thought or page
/// - [`ContentPatch`](domain::ContentPatch): partial update
/// - [`seed_items`](domain::seed_items): content shown before anything is saved
pub mod domain;

/// Visitor feedback forwarded to the owner through email relays.
///
/// - [`Relay`](feedback::Relay): async trait for one delivery provider
/// - [`HttpRelay`](feedback::HttpRelay): reqwest-based implementation
/// - [`FeedbackForwarder`](feedback::FeedbackForwarder): tries relays in order
pub mod feedback;

pub mod media;

/// Key-value persistence.
///
/// - [`KeyValueStore`](store::KeyValueStore): trait over storage backends
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
/// - [`MemoryStore`](store::MemoryStore): in-process map
pub mod store;

/// Cross-instance change propagation: broadcast events, refresh markers,
/// and the delayed reload that follows them.
pub mod sync;
