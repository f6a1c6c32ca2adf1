//! autodl-sync — keeps an autodl-irssi filter file in sync with a Trakt
//! watchlist.
//!
//! The credential lifecycle (device-code authorization, token persistence,
//! refresh, revocation) lives in [`auth`]; the remote watchlist capability
//! in [`remote`]; the dedup-and-merge against the append-only filter file in
//! [`sync`] and [`autodl`].

pub mod auth;
pub mod autodl;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod remote;
pub mod sync;
pub mod utils;

pub use auth::{AuthService, Clock, CredentialManager, CredentialRecord, SystemClock, TokenStore};
pub use autodl::AutodlFile;
pub use config::{Config, FilterProfile};
pub use models::Movie;
pub use remote::WatchlistSource;
pub use remote::trakt::{TraktApi, TraktWatchlist};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
