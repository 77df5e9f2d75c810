//! Terminal to-do lists with a light/dark theme, plus an offline request
//! cache with install/activate lifecycle and versioned buckets.

pub mod app;
pub mod commands;
pub mod config;
pub mod db;
pub mod event;
pub mod store;
pub mod theme;
pub mod todo;
pub mod ui;
pub mod worker;
