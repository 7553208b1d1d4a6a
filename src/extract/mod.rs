//! Derived views over page objects: words, text and tables.

mod cluster;
mod stream_tables;
mod tables;
mod text;
mod words;

pub use cluster::{cluster_by, cluster_values};
pub use stream_tables::{StreamTableConfig, StreamTableDetector};
pub use tables::{find_tables, TableSettings, TableStrategy};
pub use text::{extract_text, TextOptions, UnicodeNorm};
pub use words::{extract_words, WordOptions};
