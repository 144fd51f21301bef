use crate::common::{ConfigError, ConfigResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The layer a setting or theme value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Default,
    Store,
    User,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Default => "default",
            Scope::Store => "store",
            Scope::User => "user",
        }
    }

    /// Only store and user layers accept writes.
    pub fn is_writable(&self) -> bool {
        !matches!(self, Scope::Default)
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Scope::Default),
            "store" => Ok(Scope::Store),
            "user" => Ok(Scope::User),
            other => Err(format!("unknown scope '{other}'")),
        }
    }
}

/// A single keyed setting lookup, tagged with the layer that answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingValue<T> {
    pub value: T,
    pub scope: Scope,
}

impl<T> SettingValue<T> {
    pub fn new(value: T, scope: Scope) -> Self {
        Self { value, scope }
    }
}

impl SettingValue<serde_json::Value> {
    /// Decode the raw JSON value into a concrete type.
    pub fn decode<T: DeserializeOwned>(self, key: &str) -> ConfigResult<SettingValue<T>> {
        let value = serde_json::from_value(self.value).map_err(|e| ConfigError::Serialization {
            context: format!("setting '{key}'"),
            reason: e.to_string(),
        })?;
        Ok(SettingValue {
            value,
            scope: self.scope,
        })
    }
}

/// Tenant-wide configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    pub tenant_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub settings: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub features: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<super::ThemeConfig>,
}

/// Which layers contributed to a resolved document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScopeContributions {
    pub tenant: bool,
    pub store: bool,
    pub user: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMeta {
    pub resolved_at: DateTime<Utc>,
    pub scopes: ScopeContributions,
}

/// A tenant configuration with store and user layers already applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    #[serde(flatten)]
    pub config: TenantConfig,
    #[serde(rename = "_meta")]
    pub meta: ResolvedMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_parsing_and_writability() {
        assert_eq!("Store".parse::<Scope>().unwrap(), Scope::Store);
        assert!("tenant".parse::<Scope>().is_err());
        assert!(!Scope::Default.is_writable());
        assert!(Scope::User.is_writable());
    }

    #[test]
    fn test_setting_value_decodes_typed_value() {
        let raw = SettingValue::new(json!(0.08), Scope::Store);
        let typed: SettingValue<f64> = raw.decode("tax_rate").unwrap();
        assert_eq!(typed.value, 0.08);
        assert_eq!(typed.scope, Scope::Store);
    }

    #[test]
    fn test_setting_value_decode_failure_names_key() {
        let raw = SettingValue::new(json!("not a number"), Scope::User);
        let err = raw.decode::<f64>("tax_rate").unwrap_err();
        assert!(err.to_string().contains("tax_rate"));
    }

    #[test]
    fn test_resolved_config_meta_field_name() {
        let raw = json!({
            "tenantId": "t-1",
            "name": "Acme",
            "settings": { "currency": "EUR" },
            "_meta": {
                "resolvedAt": "2026-01-02T03:04:05Z",
                "scopes": { "tenant": true, "store": true, "user": false }
            }
        });

        let resolved: ResolvedConfig = serde_json::from_value(raw).unwrap();
        assert_eq!(resolved.config.tenant_id, "t-1");
        assert!(resolved.meta.scopes.store);
        assert!(!resolved.meta.scopes.user);
    }
}
