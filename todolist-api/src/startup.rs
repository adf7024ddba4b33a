/// Server startup: store selection, bootstrap account and default rows

use std::sync::Arc;

use anyhow::Context;
use todolist_shared::auth::password::{hash_password, validate_password_strength};
use todolist_shared::db::{migrations, pool};
use todolist_shared::models::user::CreateUser;
use todolist_shared::seed::seed_defaults;
use todolist_shared::store::{memory::MemoryStore, postgres::PgStore, EntityStore};
use tracing::{info, warn};

use crate::config::{BootstrapStaff, Config};

/// Opens the configured store
///
/// With a database URL the database is created if needed and migrated;
/// without one the server runs on an in-memory store that is lost on exit.
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn EntityStore>> {
    let Some(database) = &config.database else {
        warn!("DATABASE_URL not set, using the in-memory store (data is not persisted)");
        return Ok(Arc::new(MemoryStore::new()));
    };

    migrations::ensure_database_exists(&database.url)
        .await
        .context("Failed to ensure database exists")?;

    let pool = pool::create_pool(pool::PoolConfig {
        url: database.url.clone(),
        max_connections: database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to create database pool")?;

    migrations::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(Arc::new(PgStore::new(pool)))
}

/// Creates the bootstrap staff account unless the username is taken
///
/// Returns whether an account was created.
pub async fn ensure_bootstrap_staff(
    store: &dyn EntityStore,
    staff: &BootstrapStaff,
) -> anyhow::Result<bool> {
    if store.users().find_by_username(&staff.username).await?.is_some() {
        return Ok(false);
    }

    validate_password_strength(&staff.password)
        .map_err(|e| anyhow::anyhow!("BOOTSTRAP_STAFF_PASSWORD is too weak: {}", e))?;

    let user = store
        .users()
        .create(CreateUser {
            username: staff.username.clone(),
            password_hash: hash_password(&staff.password)?,
            is_staff: true,
        })
        .await?;

    info!(user_id = user.id, username = %user.username, "Bootstrap staff account created");
    Ok(true)
}

/// Runs the startup steps that write to the store
pub async fn prepare_store(store: &dyn EntityStore, config: &Config) -> anyhow::Result<()> {
    if let Some(staff) = &config.bootstrap_staff {
        ensure_bootstrap_staff(store, staff).await?;
    }

    if config.ownership.seed_defaults {
        let report = seed_defaults(store, &config.ownership.system_owner).await?;
        info!(
            owner = %config.ownership.system_owner,
            priorities = report.priorities,
            categories = report.categories,
            "Default rows seeded"
        );
    }

    Ok(())
}
