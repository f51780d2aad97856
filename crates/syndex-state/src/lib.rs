pub mod hash_store;
pub mod schema;
