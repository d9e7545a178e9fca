pub mod base;
pub mod postgres;
pub mod snowflake;
