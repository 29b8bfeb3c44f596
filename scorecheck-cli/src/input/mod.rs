//! Input handling module

pub mod file_reader;
pub mod glob_resolver;
pub mod match_dir;

pub use file_reader::FileReader;
pub use glob_resolver::resolve_patterns;
pub use match_dir::{list_matches, MatchDirectory, MatchEntry};
