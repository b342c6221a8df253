use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Greeting {
    pub message: String,
    pub timestamp: f64,
    pub note: String,
}

/// Cache arguments of the user lookup.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UserLookup {
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_category() -> String {
    "all".to_string()
}

fn default_limit() -> u32 {
    10
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            category: default_category(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductList {
    pub category: String,
    pub limit: u32,
    pub products: Vec<String>,
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteStats {
    pub total_users: u64,
    pub active_sessions: u64,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncachedMessage {
    pub message: String,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache: String,
}
