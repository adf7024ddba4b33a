/// Default catalog rows
///
/// A fresh installation gets the priorities Low, Medium and High and a
/// "General" category, owned by the configured system owner. Seeding only
/// fills what is missing, so it is safe to run on every start.

use tracing::info;

use crate::models::category::CreateCategory;
use crate::models::priority::CreatePriority;
use crate::query::ScopeFilter;
use crate::store::{EntityStore, StoreResult};

/// Priorities created for the system owner, lowest first
pub const DEFAULT_PRIORITIES: [&str; 3] = ["Low", "Medium", "High"];

/// Category created for the system owner
pub const DEFAULT_CATEGORY: &str = "General";

/// Rows created by one seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub priorities: usize,
    pub categories: usize,
}

/// Creates the default priorities and category for `system_owner`
///
/// Each kind is seeded only if `system_owner` has no active rows of it.
pub async fn seed_defaults(store: &dyn EntityStore, system_owner: &str) -> StoreResult<SeedReport> {
    let mut report = SeedReport::default();
    let scope = ScopeFilter::owned_active(system_owner);

    if store.priorities().filter(&scope).await?.is_empty() {
        for name in DEFAULT_PRIORITIES {
            store
                .priorities()
                .create(system_owner, CreatePriority { name: name.to_string() })
                .await?;
            report.priorities += 1;
        }
    }

    if store.categories().filter(&scope).await?.is_empty() {
        store
            .categories()
            .create(
                system_owner,
                CreateCategory {
                    name: DEFAULT_CATEGORY.to_string(),
                    description: "Default category".to_string(),
                },
            )
            .await?;
        report.categories += 1;
    }

    info!(
        system_owner,
        priorities = report.priorities,
        categories = report.categories,
        "Seeded default rows"
    );
    Ok(report)
}
