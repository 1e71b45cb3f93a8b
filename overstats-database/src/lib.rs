pub mod cache;
pub mod database;
pub mod impls;
pub mod model;

pub use cache::CacheService;
pub use database::{Database, MIGRATOR};
