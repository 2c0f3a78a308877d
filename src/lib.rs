//! Task Streak Library
//!
//! A to-do list with a daily completion streak, a month calendar and
//! reminders. This module exports the core components for testing and
//! integration.

pub mod calendar;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod kv;
pub mod logging;
pub mod reminder;
pub mod snapshot;
pub mod store;
pub mod streak;
pub mod types;
pub mod view;
