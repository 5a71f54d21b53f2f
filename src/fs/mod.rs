//! Filesystem module.
//!
//! Provides:
//! - Destination directory checks
//! - Filename derivation and sanitizing

pub mod naming;
pub mod paths;

pub use naming::{image_filename, last_path_segment, sanitize_filename, video_filename};
pub use paths::check_destination_dir;
