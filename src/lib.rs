//! State synchronization and menu engine for a Kimai status-bar applet.
//!
//! [`sync::Synchronizer`] pulls the recent and active timesheets into a
//! [`models::MenuState`], [`menu::MenuEngine`] renders that state onto a
//! [`menu::MenuSurface`], and [`dispatch::Dispatcher`] turns clicks back into
//! restart/stop requests followed by a fresh synchronization pass.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod duration;
pub mod logging;
pub mod menu;
pub mod models;
pub mod sync;

#[cfg(target_os = "macos")]
pub mod tray;

#[cfg(test)]
mod test_support;

pub use client::{ClientError, HttpClient, TaskBackend};
pub use config::{Config, ConfigError};
pub use dispatch::{Action, Dispatcher};
pub use menu::{MenuEngine, MenuSurface};
pub use models::{MenuState, Task, TaskId};
pub use sync::{StateSink, Synchronizer};
