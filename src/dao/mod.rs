/// Database model definitions.
pub mod models;
/// Statistics storage and retrieval operations.
pub mod stat_store;
/// Storage abstraction layer for database operations.
pub mod storage;
