//! Database connection pool and migration handling.

mod pool;

pub use pool::{create_pool, run_migrations, Database, DatabaseError};
