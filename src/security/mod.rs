mod binary;


pub use binary::{is_executable, validate_parser_id, BinaryResolver};
