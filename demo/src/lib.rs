//! Serum market demo - resolves one market and prints its top of book.
//!
//! # Components
//!
//! - [`config`]: Environment configuration
//! - [`report`]: Top-of-book rendering

pub mod config;
pub mod report;

pub use config::{ConfigError, DemoConfig, MarketSelector};
pub use report::render_top_of_book;
