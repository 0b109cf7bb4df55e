//! Configuration for the signing crates.
//!
//! All configuration is driven by environment variables.

use tracing::debug;

use crate::types::Region;
use crate::{GlacierError, GlacierResult};

/// Service name used in the credential scope when none is configured.
pub const DEFAULT_SERVICE: &str = "glacier";

/// Signing configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlacierConfig {
    /// Canonical name of the region requests are scoped to.
    pub region: String,
    /// Service name used in the credential scope.
    pub service: String,
    /// Log filter directive for binaries embedding these crates.
    pub log_level: String,
}

impl Default for GlacierConfig {
    fn default() -> Self {
        Self {
            region: Region::default().name().to_owned(),
            service: DEFAULT_SERVICE.to_owned(),
            log_level: "info".to_owned(),
        }
    }
}

impl GlacierConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("GLACIER_REGION") {
            config.region = v;
        }
        if let Ok(v) = std::env::var("GLACIER_SERVICE") {
            config.service = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        debug!(region = %config.region, service = %config.service, "Loaded signing configuration");
        config
    }

    /// Resolve the configured region name to a predefined [`Region`].
    ///
    /// # Errors
    ///
    /// Returns [`GlacierError::InvalidRegion`] if the name is not predefined.
    pub fn resolve_region(&self) -> GlacierResult<Region> {
        Region::from_name(&self.region)
    }

    /// Check that the service name can appear in a credential scope.
    ///
    /// # Errors
    ///
    /// Returns [`GlacierError::Config`] if the service name is empty or
    /// contains `/`, which would break the scope layout.
    pub fn validate(&self) -> GlacierResult<()> {
        if self.service.is_empty() || self.service.contains('/') {
            return Err(GlacierError::Config(format!(
                "invalid service name: {:?}",
                self.service
            )));
        }
        self.resolve_region().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = GlacierConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.service, "glacier");
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_should_resolve_configured_region() {
        let config = GlacierConfig {
            region: "us-west-2".to_owned(),
            ..GlacierConfig::default()
        };
        assert_eq!(config.resolve_region().unwrap(), Region::US_WEST_2);
    }

    #[test]
    fn test_should_reject_unknown_region() {
        let config = GlacierConfig {
            region: "nowhere-1".to_owned(),
            ..GlacierConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GlacierError::InvalidRegion(_))
        ));
    }

    #[test]
    fn test_should_reject_service_with_slash() {
        let config = GlacierConfig {
            service: "glacier/extra".to_owned(),
            ..GlacierConfig::default()
        };
        assert!(matches!(config.validate(), Err(GlacierError::Config(_))));
    }

    #[test]
    fn test_should_serialize_config_as_camel_case() {
        let json = serde_json::to_value(GlacierConfig::default()).unwrap();
        assert_eq!(json["logLevel"], "info");
        assert_eq!(json["region"], "us-east-1");
    }
}
