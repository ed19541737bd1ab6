//! Configuration module for Sitesweep
//!
//! Crawl parameters come from an optional TOML file and are then overridden
//! by command-line flags. Everything has a default except the seed URL.
//!
//! # Example
//!
//! ```no_run
//! use sitesweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sweep.toml")).unwrap();
//! println!("Crawling with {} connections", config.crawl.connections);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlParams, FetchConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_params};
