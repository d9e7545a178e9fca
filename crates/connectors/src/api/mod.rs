pub mod client;
pub mod error;
pub mod link;
pub mod source;
