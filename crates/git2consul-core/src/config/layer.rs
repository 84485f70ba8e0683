//! Partial configuration sources and their merge
//!
//! Every source (command line, environment, TOML file) produces a
//! [`ConfigLayer`] in which each option is optional. Layers are merged with
//! [`ConfigLayer::merge`], the higher-precedence layer winning per option,
//! and the result is resolved against the defaults into a [`SyncConfig`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use super::{CredentialConfig, DEFAULT_GIT_USER, Endpoint, SyncConfig, parse_duration};
use crate::{Error, Result};

/// One source of configuration values.
///
/// Field names match the TOML keys of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub repository: Option<String>,
    pub directory: Option<PathBuf>,
    pub git_user: Option<String>,
    pub git_private_key: Option<String>,
    #[serde(deserialize_with = "optional_duration")]
    pub polling_interval: Option<Duration>,
    pub consul_host: Option<String>,
    pub consul_port: Option<u16>,
    pub router_host: Option<String>,
    pub router_port: Option<u16>,
    #[serde(deserialize_with = "optional_duration")]
    pub store_timeout: Option<Duration>,
    pub log_level: Option<String>,
}

fn optional_duration<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_duration(&raw).map_err(serde::de::Error::custom))
        .transpose()
}

impl ConfigLayer {
    /// Load a layer from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| match e {
            Error::ConfigFile { message, .. } => Error::ConfigFile {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse a layer from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigFile {
            path: PathBuf::new(),
            message: e.message().to_string(),
        })
    }

    /// Combine with a lower-precedence layer; values set here win.
    pub fn merge(self, lower: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            repository: self.repository.or(lower.repository),
            directory: self.directory.or(lower.directory),
            git_user: self.git_user.or(lower.git_user),
            git_private_key: self.git_private_key.or(lower.git_private_key),
            polling_interval: self.polling_interval.or(lower.polling_interval),
            consul_host: self.consul_host.or(lower.consul_host),
            consul_port: self.consul_port.or(lower.consul_port),
            router_host: self.router_host.or(lower.router_host),
            router_port: self.router_port.or(lower.router_port),
            store_timeout: self.store_timeout.or(lower.store_timeout),
            log_level: self.log_level.or(lower.log_level),
        }
    }

    /// Fill unset options with defaults and validate the result.
    pub fn resolve(self) -> Result<SyncConfig> {
        let repository = self
            .repository
            .ok_or_else(|| Error::invalid_config("missing required option 'repository'"))?;
        let defaults = SyncConfig::new(repository);

        // An empty key means "no key", matching an unset environment variable.
        let credential = self
            .git_private_key
            .filter(|key| !key.trim().is_empty())
            .map(|private_key| CredentialConfig {
                user: self
                    .git_user
                    .filter(|user| !user.is_empty())
                    .unwrap_or_else(|| DEFAULT_GIT_USER.to_string()),
                private_key,
            });

        let config = SyncConfig {
            directory: self.directory.unwrap_or(defaults.directory),
            credential,
            polling_interval: self.polling_interval.unwrap_or(defaults.polling_interval),
            consul: Endpoint::new(
                self.consul_host.unwrap_or(defaults.consul.host),
                self.consul_port.unwrap_or(defaults.consul.port),
            ),
            router: Endpoint::new(
                self.router_host.unwrap_or(defaults.router.host),
                self.router_port.unwrap_or(defaults.router.port),
            ),
            store_timeout: self.store_timeout.unwrap_or(defaults.store_timeout),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }
}
