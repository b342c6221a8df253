use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ClearCacheQuery {
    pub key: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    pub status: String,
    pub message: String,
    pub deleted: u64,
}

impl ClearCacheResponse {
    pub fn success(message: impl Into<String>, deleted: u64) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            deleted,
        }
    }
}
