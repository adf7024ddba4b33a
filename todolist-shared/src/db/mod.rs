/// PostgreSQL plumbing
///
/// - `pool`: connection pool creation, health check and stats
/// - `migrations`: embedded schema migrations
///
/// Queries live in [`crate::store::postgres`].

pub mod migrations;
pub mod pool;
