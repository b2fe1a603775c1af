//! `SubSleuth` Core Library
//!
//! Shared functionality for the `SubSleuth` viewer:
//! - Adapter around the external `twitch` CLI
//! - Schema types for EventSub listings and user records
//! - File-backed cache of subscriptions and users
//! - Configuration resolution and logging setup

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tracing_init;
pub mod twitch;

pub use cache::{Cache, UNKNOWN_USER_GLYPH};
pub use config::Config;
pub use error::{Error, Result};
pub use models::{Subscription, SubscriptionSnapshot, User, UserDirectory};
pub use twitch::{CliRunner, TwitchCli};
