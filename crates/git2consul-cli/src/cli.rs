//! CLI argument parsing using clap derive

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use git2consul_core::ConfigLayer;
use git2consul_core::config::parse_duration;

/// git2consul - Mirror a git repository into Consul's key-value store
///
/// Every file in the repository (except README.md files and anything hidden)
/// is written to Consul under its repository-relative path, once per polling
/// interval. Each option can also be set through the environment variable
/// shown, or in the TOML file given with --config; flags and environment
/// variables take precedence over the file.
#[derive(Parser, Debug)]
#[command(name = "git2consul")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, env = "GIT2CONSUL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Remote repository (URL or user@host:path)
    #[arg(long, env = "GIT2CONSUL_REPOSITORY")]
    pub repository: Option<String>,

    /// Local directory holding the mirror [default: /tmp/git2consul/repository]
    #[arg(long, env = "GIT2CONSUL_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// SSH user for the remote [default: git]
    #[arg(long, env = "GIT2CONSUL_GIT_USER")]
    pub git_user: Option<String>,

    /// SSH private key (PEM text, literal "\n" sequences allowed)
    #[arg(long, env = "GIT2CONSUL_GIT_PRIVATE_KEY", hide_env_values = true)]
    pub git_private_key: Option<String>,

    /// Time between sync cycles, e.g. 30s, 1m30s [default: 1m]
    #[arg(long, env = "GIT2CONSUL_POLLING_INTERVAL", value_parser = parse_duration)]
    pub polling_interval: Option<Duration>,

    /// Consul agent host [default: localhost]
    #[arg(long, env = "GIT2CONSUL_CONSUL_HOST")]
    pub consul_host: Option<String>,

    /// Consul agent port [default: 8500]
    #[arg(long, env = "GIT2CONSUL_CONSUL_PORT")]
    pub consul_port: Option<u16>,

    /// Liveness endpoint host [default: localhost]
    #[arg(long, env = "GIT2CONSUL_ROUTER_HOST")]
    pub router_host: Option<String>,

    /// Liveness endpoint port [default: 8090]
    #[arg(long, env = "GIT2CONSUL_ROUTER_PORT")]
    pub router_port: Option<u16>,

    /// Timeout for a single Consul write [default: 10s]
    #[arg(long, env = "GIT2CONSUL_STORE_TIMEOUT", value_parser = parse_duration)]
    pub store_timeout: Option<Duration>,

    /// Log filter used when RUST_LOG is unset [default: info]
    #[arg(long, env = "GIT2CONSUL_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// The options given on the command line or in the environment.
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            repository: self.repository.clone(),
            directory: self.directory.clone(),
            git_user: self.git_user.clone(),
            git_private_key: self.git_private_key.clone(),
            polling_interval: self.polling_interval,
            consul_host: self.consul_host.clone(),
            consul_port: self.consul_port,
            router_host: self.router_host.clone(),
            router_port: self.router_port,
            store_timeout: self.store_timeout,
            log_level: self.log_level.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags_into_layer() {
        let cli = Cli::try_parse_from([
            "git2consul",
            "--repository",
            "git@example.com:org/config.git",
            "--polling-interval",
            "1m30s",
            "--consul-port",
            "8501",
        ])
        .unwrap();

        let layer = cli.layer();
        assert_eq!(layer.repository.as_deref(), Some("git@example.com:org/config.git"));
        assert_eq!(layer.polling_interval, Some(Duration::from_secs(90)));
        assert_eq!(layer.consul_port, Some(8501));
    }

    #[test]
    fn rejects_malformed_interval() {
        let result = Cli::try_parse_from(["git2consul", "--polling-interval", "often"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_out_of_range_port() {
        let result = Cli::try_parse_from(["git2consul", "--consul-port", "70000"]);
        assert!(result.is_err());
    }
}
