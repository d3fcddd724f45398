pub mod json_file;

pub use json_file::{parse_snapshot, records_from_document, JsonFileSource};
