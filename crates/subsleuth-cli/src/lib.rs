//! `SubSleuth` CLI Library
//!
//! Terminal viewer for Twitch EventSub subscriptions cached by
//! `subsleuth-core`.

pub mod app;
pub mod tui;
pub mod ui;
