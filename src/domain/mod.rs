pub mod content;
pub mod seed;

pub use content::{
    now_iso, parse_date, sort_newest_first, ContentItem, ContentPatch, ContentType, NewContent,
};
pub use seed::seed_items;
