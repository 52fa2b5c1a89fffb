//! bglock - system-wide desktop background lock
//!
//! Pins the desktop background for every user of a managed Linux machine by
//! writing dconf overrides, and removes them again on unlock.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 LockController                   │
//! ├─────────────────────────────────────────────────┤
//! │  ConfigWriter  │  ReloadService  │  Privilege    │
//! ├─────────────────────────────────────────────────┤
//! │           Settings  /  keyfile parser            │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! All operations need root: they write under `/usr/share/backgrounds` and
//! `/etc/dconf`, then run `dconf update`.

pub mod config;
pub mod controller;
pub mod error;
pub mod keyfile;
pub mod privilege;
pub mod reload;
pub mod writer;

pub use config::{ConfigError, LockPaths, Settings};
pub use controller::{LockController, LockPlan, LockState, LockStatus, Outcome, Phase};
pub use error::{ErrorKind, LockError};
pub use reload::{CommandReload, ReloadService};
pub use writer::ConfigWriter;
