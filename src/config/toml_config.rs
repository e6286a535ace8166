use crate::adapters::http::HttpStore;
use crate::core::axis::{AxisResolver, DEFAULT_ABSOLUTE_THRESHOLD_FACTOR, DEFAULT_NORMALIZATION_SCALE};
use crate::core::service::{ServiceOptions, DEFAULT_CONTAINER_EXTENT, DEFAULT_PAGE_LIMIT};
use crate::domain::model::ContainerExtent;
use crate::utils::error::{LayoutError, Result};
use crate::utils::validation::{validate_positive_number, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub resolver: ResolverConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub headers: Option<HashMap<String, String>>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3077".to_string(),
            timeout_seconds: 10,
            headers: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub freshness_seconds: u64,
    pub coalesce_in_flight: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_seconds: 30,
            coalesce_in_flight: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub normalization_scale: f64,
    pub absolute_threshold_factor: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            normalization_scale: DEFAULT_NORMALIZATION_SCALE,
            absolute_threshold_factor: DEFAULT_ABSOLUTE_THRESHOLD_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub container_width: f64,
    pub container_depth: f64,
    pub page_limit: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            container_width: DEFAULT_CONTAINER_EXTENT.width,
            container_depth: DEFAULT_CONTAINER_EXTENT.depth,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl LayoutConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LayoutError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LayoutError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STORE_URL})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LayoutError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn axis_resolver(&self) -> AxisResolver {
        AxisResolver::new(
            self.resolver.normalization_scale,
            self.resolver.absolute_threshold_factor,
        )
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            freshness: Duration::from_secs(self.cache.freshness_seconds),
            coalesce_in_flight: self.cache.coalesce_in_flight,
            resolver: self.axis_resolver(),
            default_extent: ContainerExtent {
                width: self.defaults.container_width,
                depth: self.defaults.container_depth,
            },
            page_limit: self.defaults.page_limit,
        }
    }

    pub fn http_store(&self) -> HttpStore {
        HttpStore::new(self.store.base_url.clone())
            .with_headers(self.store.headers.clone().unwrap_or_default())
            .with_timeout(Duration::from_secs(self.store.timeout_seconds))
    }
}

impl Validate for LayoutConfig {
    fn validate(&self) -> Result<()> {
        validate_url("store.base_url", &self.store.base_url)?;
        validate_positive_number("store.timeout_seconds", self.store.timeout_seconds, 1)?;
        validate_positive_number("cache.freshness_seconds", self.cache.freshness_seconds, 1)?;
        validate_positive_number("defaults.page_limit", self.defaults.page_limit as u64, 1)?;

        if !(self.resolver.normalization_scale.is_finite() && self.resolver.normalization_scale > 0.0) {
            return Err(LayoutError::InvalidConfigValueError {
                field: "resolver.normalization_scale".to_string(),
                value: self.resolver.normalization_scale.to_string(),
                reason: "Scale must be a positive number".to_string(),
            });
        }
        validate_range(
            "resolver.absolute_threshold_factor",
            self.resolver.absolute_threshold_factor,
            0.0,
            self.resolver.normalization_scale,
        )?;
        validate_range(
            "defaults.container_width",
            self.defaults.container_width,
            0.0,
            f64::MAX,
        )?;
        validate_range(
            "defaults.container_depth",
            self.defaults.container_depth,
            0.0,
            f64::MAX,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LayoutConfig::from_toml_str("").unwrap();

        assert_eq!(config.store.base_url, "http://localhost:3077");
        assert_eq!(config.cache.freshness_seconds, 30);
        assert!(config.cache.coalesce_in_flight);
        assert_eq!(config.axis_resolver(), AxisResolver::default());
        assert_eq!(config.defaults.container_width, 1950.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[store]
base_url = "https://wms.example.com"
timeout_seconds = 5
headers = { "Authorization" = "Bearer abc" }

[cache]
freshness_seconds = 10
coalesce_in_flight = false

[resolver]
normalization_scale = 100000.0
absolute_threshold_factor = 1.5

[defaults]
container_width = 2450.0
container_depth = 850.0
page_limit = 25
"#;

        let config = LayoutConfig::from_toml_str(toml_content).unwrap();
        let options = config.service_options();

        assert_eq!(options.freshness, Duration::from_secs(10));
        assert!(!options.coalesce_in_flight);
        assert_eq!(options.resolver.normalization_scale, 100_000.0);
        assert_eq!(options.default_extent.depth, 850.0);
        assert_eq!(options.page_limit, 25);
        assert_eq!(
            config.store.headers.unwrap().get("Authorization").map(String::as_str),
            Some("Bearer abc")
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DRAWER_LAYOUT_TEST_URL", "https://store.internal");

        let toml_content = r#"
[store]
base_url = "${DRAWER_LAYOUT_TEST_URL}"
"#;

        let config = LayoutConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.store.base_url, "https://store.internal");

        std::env::remove_var("DRAWER_LAYOUT_TEST_URL");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = LayoutConfig::from_toml_str("[store]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let zero_freshness =
            LayoutConfig::from_toml_str("[cache]\nfreshness_seconds = 0\n").unwrap();
        assert!(zero_freshness.validate().is_err());

        let bad_scale =
            LayoutConfig::from_toml_str("[resolver]\nnormalization_scale = -1.0\n").unwrap();
        assert!(bad_scale.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = LayoutConfig::from_toml_str("[cache\nfreshness_seconds = 1").unwrap_err();
        assert!(matches!(err, LayoutError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[defaults]\npage_limit = 40\n")
            .unwrap();

        let config = LayoutConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.defaults.page_limit, 40);
    }
}
