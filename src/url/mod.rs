//! URL list handling for Redirect Mapper
//!
//! This module reads the line-oriented URL lists for both sites and formats
//! URLs for status output.

mod list;

pub use list::{load_url_list, parse_url_list, truncate_for_display, DISPLAY_URL_CHARS};
