pub mod core;
pub mod pagination;
pub mod records;
pub mod resource;
pub mod schema;
pub mod watermark;
