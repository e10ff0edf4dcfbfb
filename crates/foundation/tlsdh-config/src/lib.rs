//! Configuration for the tls-dh walkthrough
//!
//! Loaded from YAML. Lookup order: an explicit path, then
//! `<config dir>/tls-dh/config.yaml`, then built-in defaults.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tlsdh_core::{BigUint, DomainParams, Handshake, SecretRange};
use tracing::debug;

/// Result type for tlsdh-config operations
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] tlsdh_core::Error),
}

/// Group parameters as written in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsConfig {
    pub p: u64,
    pub g: u64,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            p: DomainParams::TOY_P,
            g: DomainParams::TOY_G,
        }
    }
}

/// Inclusive secret exponent range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    pub min: u64,
    pub max: u64,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            min: SecretRange::DEFAULT_MIN,
            max: SecretRange::DEFAULT_MAX,
        }
    }
}

/// Color scheme names accepted in the file and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
    Ocean,
    Amber,
}

impl std::str::FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            "ocean" => Ok(Self::Ocean),
            "amber" => Ok(Self::Amber),
            other => Err(format!("unknown theme '{}' (dark, light, ocean, amber)", other)),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub params: ParamsConfig,
    pub secrets: SecretsConfig,
    /// Fixed server secret `b` instead of a random draw
    pub server_secret: Option<u64>,
    /// Seed for reproducible sessions
    pub seed: Option<u64>,
    pub theme: ThemeName,
    pub tick_rate_ms: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            params: ParamsConfig::default(),
            secrets: SecretsConfig::default(),
            server_secret: None,
            seed: None,
            theme: ThemeName::default(),
            tick_rate_ms: 250,
            log_file: None,
        }
    }
}

impl Config {
    /// `<config dir>/tls-dh/config.yaml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tls-dh").join("config.yaml"))
    }

    /// Load from `path`, or from the default location when it exists, or
    /// fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::from_file(&default),
                _ => {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every value that feeds the handshake.
    pub fn validate(&self) -> Result<()> {
        self.domain_params()?;
        let range = self.secret_range()?;
        if let Some(secret) = self.server_secret {
            range.check(&BigUint::from(secret))?;
        }
        Ok(())
    }

    pub fn domain_params(&self) -> Result<DomainParams> {
        Ok(DomainParams::new(
            BigUint::from(self.params.p),
            BigUint::from(self.params.g),
        )?)
    }

    pub fn secret_range(&self) -> Result<SecretRange> {
        Ok(SecretRange::new(self.secrets.min, self.secrets.max)?)
    }

    /// Seeded when `seed` is set, otherwise from OS entropy.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Build a fresh handshake session from this configuration.
    pub fn handshake(&self) -> Result<Handshake> {
        let params = self.domain_params()?;
        let range = self.secret_range()?;
        let handshake = match self.server_secret {
            Some(secret) => Handshake::with_server_secret(params, range, BigUint::from(secret), self.rng())?,
            None => Handshake::new(params, range, self.rng()),
        };
        Ok(handshake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tlsdh_core::Step;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.params.p, 23);
        assert_eq!(config.params.g, 5);
        assert_eq!(config.secrets.min, 2);
        assert_eq!(config.secrets.max, 11);
        assert_eq!(config.theme, ThemeName::Dark);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml("theme: ocean\nseed: 42\n").unwrap();
        assert_eq!(config.theme, ThemeName::Ocean);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.params, ParamsConfig::default());
        assert_eq!(config.tick_rate_ms, 250);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let err = Config::from_yaml("params: { p: 23, g: 23 }\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_yaml("secrets: { min: 8, max: 3 }\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_yaml("server_secret: 40\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = Config::from_yaml("params: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(matches!(Config::from_yaml("theme: neon\n"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "params:\n  p: 29\n  g: 2\nserver_secret: 6").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.params.p, 29);
        assert_eq!(config.server_secret, Some(6));

        let hs = config.handshake().unwrap();
        assert_eq!(hs.step(), Step::ClientHello);
        // 2^6 mod 29 = 64 - 58
        assert_eq!(hs.server().public, BigUint::from(6u32));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Config {
            seed: Some(7),
            theme: ThemeName::Amber,
            ..Config::default()
        };
        let text = config.to_yaml().unwrap();
        assert_eq!(Config::from_yaml(&text).unwrap(), config);
    }

    #[test]
    fn test_seeded_handshakes_repeat() {
        let config = Config {
            seed: Some(99),
            ..Config::default()
        };
        let a = config.handshake().unwrap();
        let b = config.handshake().unwrap();
        assert_eq!(a.server(), b.server());
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!("Light".parse::<ThemeName>().unwrap(), ThemeName::Light);
        assert!("neon".parse::<ThemeName>().is_err());
    }
}
