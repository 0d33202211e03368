pub mod ai;
pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod history;
pub mod session;
pub mod store;
pub mod timestamps;
pub mod types;

#[cfg(feature = "ui")]
pub mod ui;
#[cfg(feature = "ui")]
pub mod views;
