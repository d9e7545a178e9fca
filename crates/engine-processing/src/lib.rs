pub mod error;
pub mod fetch;
pub mod normalize;
pub mod retry;
pub mod stage;
