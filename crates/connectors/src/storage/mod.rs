pub mod error;
pub mod store;
pub mod url_parser;
