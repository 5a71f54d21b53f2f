//! Media module for item representation and classification.

pub mod item;
pub mod parser;

pub use item::{MediaItem, MediaKind, PageResult};
pub use parser::{classify, classify_page, image_url, ClassifiedPage};
