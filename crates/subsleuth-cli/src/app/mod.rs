//! Application state and the subscription/user join.

pub mod rows;
mod state;

pub use rows::{COLUMNS, DisplayRow, build_rows};
pub use state::{App, INFO_TAB, INFO_TEXT, KeyAction, SUBSCRIPTIONS_TAB, TABS};
