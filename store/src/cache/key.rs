use crate::model::Scope;

const RESOLVED: &str = "resolved";
const NO_USER: &str = "_";

/// Composite cache keys (`kind:id1:id2`) shared by every adapter so that a
/// decorated chain invalidates the same logical entries.
pub struct CacheKey;

impl CacheKey {
    pub fn setting(key: &str, scope: Option<Scope>) -> String {
        format!(
            "setting:{key}:{}",
            scope.map(|s| s.as_str()).unwrap_or(RESOLVED)
        )
    }

    /// Prefix matching every scope variant of one setting.
    pub fn setting_prefix(key: &str) -> String {
        format!("setting:{key}:")
    }

    pub fn theme(store_id: &str, user_id: Option<&str>) -> String {
        format!("theme:{store_id}:{}", user_id.unwrap_or(NO_USER))
    }

    pub fn theme_prefix(store_id: &str) -> String {
        format!("theme:{store_id}:")
    }

    pub fn store_theme(store_id: &str) -> String {
        format!("store-theme:{store_id}")
    }

    pub fn tenant_config() -> String {
        "config:tenant".to_string()
    }

    pub fn resolved_config(store_id: &str, user_id: Option<&str>) -> String {
        format!("config:resolved:{store_id}:{}", user_id.unwrap_or(NO_USER))
    }

    pub fn resolved_config_prefix(store_id: &str) -> String {
        format!("config:resolved:{store_id}:")
    }
}
