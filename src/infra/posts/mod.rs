pub mod json_store;
pub mod seed;

pub use json_store::JsonPostStore;
pub use seed::seed_if_empty;
