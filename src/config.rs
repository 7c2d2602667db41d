//! Configuration for AtlasRow
//!
//! Centralized configuration with sensible defaults.

use crate::time::Ttl;

/// Main configuration for an AtlasRow engine instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Write Validation
    // -------------------------------------------------------------------------
    /// Largest TTL a write may carry (Cassandra caps TTL at 20 years)
    pub max_ttl: Ttl,

    /// Reject a TTL that accompanies a null assignment.
    /// When false the TTL is silently dropped for the null column instead.
    pub reject_null_ttl: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_ttl: Ttl::MAX_DEFAULT,
            reject_null_ttl: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the maximum accepted TTL
    pub fn max_ttl(mut self, ttl: Ttl) -> Self {
        self.config.max_ttl = ttl;
        self
    }

    /// Choose whether a TTL on a null assignment is rejected or ignored
    pub fn reject_null_ttl(mut self, reject: bool) -> Self {
        self.config.reject_null_ttl = reject;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
