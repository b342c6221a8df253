//! Deliberately slow lookups standing in for database and analytics queries.
//!
//! Latency is simulated with `tokio::time::sleep` so the runtime keeps serving
//! other requests while a lookup is in flight.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;

use super::model::{Greeting, ProductList, ProductQuery, SiteStats, UserLookup, UserProfile};

/// Upper bound on `limit` for product listings.
pub const MAX_PRODUCTS: u32 = 1000;

fn now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

pub struct CatalogService;

impl CatalogService {
    pub async fn greeting() -> Result<Greeting> {
        tokio::time::sleep(Duration::from_secs(2)).await;

        Ok(Greeting {
            message: "Hello World".to_string(),
            timestamp: now(),
            note: "This response is cached for 60 seconds".to_string(),
        })
    }

    pub async fn load_user(lookup: UserLookup) -> Result<UserProfile> {
        tokio::time::sleep(Duration::from_secs(1)).await;

        Ok(UserProfile {
            user_id: lookup.user_id,
            name: format!("User_{}", lookup.user_id),
            email: format!("user{}@example.com", lookup.user_id),
            timestamp: now(),
        })
    }

    pub async fn list_products(query: ProductQuery) -> Result<ProductList> {
        tokio::time::sleep(Duration::from_millis(1500)).await;

        Ok(ProductList {
            products: (0..query.limit).map(|i| format!("Product_{i}")).collect(),
            category: query.category,
            limit: query.limit,
            timestamp: now(),
        })
    }

    pub async fn site_stats() -> Result<SiteStats> {
        tokio::time::sleep(Duration::from_secs(2)).await;

        Ok(SiteStats {
            total_users: 1000,
            active_sessions: 42,
            timestamp: now(),
        })
    }
}
