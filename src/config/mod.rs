//! Configuration module for pdf-harvest
//!
//! A crawl run takes an immutable [`CrawlConfig`]. Users usually describe one as a
//! [`Profile`], the string-typed TOML form that can be saved per site and reloaded later.
//!
//! # Example
//!
//! ```no_run
//! use pdf_harvest::config::load_profile;
//! use std::path::Path;
//!
//! let profile = load_profile(Path::new("config_city.toml")).unwrap();
//! let config = profile.to_crawl_config().unwrap();
//! println!("Crawler will use max depth: {}", config.effective_max_depth());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_download_folder, CrawlConfig, CrawlMode, Profile, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_MAX_DEPTH,
};

// Re-export parser and validation functions
pub use parser::{list_profiles, load_profile, profile_display_name, save_profile};
pub use validation::{compile_pattern, parse_base_url};
