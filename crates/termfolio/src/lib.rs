//! `termfolio` - An animated terminal portfolio served over SSH
//!
//! This library provides the SSH server, the per-session page state machine
//! and its renderers, the visitor counter with opt-out support, and the
//! shared RSS feed cache.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod server;
pub mod storage;
pub mod ui;
pub mod version;

pub use config::Config;
pub use error::{Error, Result};
pub use feed::{FeedItem, FeedService, FeedSnapshot};
pub use logging::init_logging;
pub use storage::{StoreStats, VisitorStore};
pub use ui::{Action, App, Page, SessionInfo};
