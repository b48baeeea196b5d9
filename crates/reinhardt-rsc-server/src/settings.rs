//! Server settings.
//!
//! Settings are layered, later layers overriding earlier ones:
//!
//! 1. built-in defaults;
//! 2. an optional TOML file;
//! 3. environment variables prefixed with [`ENV_PREFIX`] (`RSC_HOST`,
//!    `RSC_PORT`, ...).
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! client_script = "/client.js"
//! log_filter = "info,reinhardt_rsc_core=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix of environment variables read by [`ServerSettings::load`].
pub const ENV_PREFIX: &str = "RSC_";

/// Errors raised while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// The settings file could not be read.
	#[error("Failed to read settings file {path}: {source}")]
	Read {
		/// Path of the file.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The settings file is not valid TOML or has wrong field types.
	#[error("Invalid settings file: {0}")]
	Parse(#[from] toml::de::Error),

	/// An environment variable has an unusable value.
	#[error("Invalid value for {key}: {reason}")]
	InvalidEnv {
		/// Variable name.
		key: String,
		/// Why the value was rejected.
		reason: String,
	},

	/// `host` is not an IP address.
	#[error("Invalid host address: {0}")]
	InvalidHost(String),
}

/// Settings for the RSC server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
	/// Address to bind.
	pub host: String,
	/// Port to bind.
	pub port: u16,
	/// Query parameter that selects payload mode (`?jsx`).
	pub payload_query: String,
	/// Global variable the document assigns the initial payload to.
	pub initial_payload_var: String,
	/// URL of the client module script to include in documents.
	pub client_script: Option<String>,
	/// Default tracing filter when `RUST_LOG` is unset.
	pub log_filter: String,
	/// How long to wait for open connections on shutdown.
	pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_string(),
			port: 8080,
			payload_query: "jsx".to_string(),
			initial_payload_var: "__INITIAL_CLIENT_JSX_STRING__".to_string(),
			client_script: None,
			log_filter: "info".to_string(),
			shutdown_timeout_secs: 30,
		}
	}
}

impl ServerSettings {
	/// Loads defaults, then `path` if given, then `RSC_*` environment
	/// variables.
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let settings = match path {
			Some(path) => Self::from_file(path)?,
			None => Self::default(),
		};
		settings.with_env_overrides(utf8_vars(std::env::vars_os()))
	}

	/// Reads settings from a TOML file. Missing fields keep their defaults.
	pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
		let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&content)
	}

	/// Parses settings from TOML text. Missing fields keep their defaults.
	pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(content)?)
	}

	/// Applies `RSC_*` overrides from the given variables. Variables without
	/// the prefix or with unknown names are ignored.
	pub fn with_env_overrides<I, K, V>(mut self, vars: I) -> Result<Self, SettingsError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		for (key, value) in vars {
			let key = key.as_ref();
			let Some(name) = key.strip_prefix(ENV_PREFIX) else {
				continue;
			};
			let value = value.into();
			match name {
				"HOST" => self.host = value,
				"PORT" => self.port = parse_env(key, &value)?,
				"PAYLOAD_QUERY" => self.payload_query = value,
				"INITIAL_PAYLOAD_VAR" => self.initial_payload_var = value,
				"CLIENT_SCRIPT" => {
					self.client_script = if value.is_empty() { None } else { Some(value) }
				}
				"LOG_FILTER" => self.log_filter = value,
				"SHUTDOWN_TIMEOUT_SECS" => self.shutdown_timeout_secs = parse_env(key, &value)?,
				_ => {}
			}
		}
		Ok(self)
	}

	/// The socket address to bind.
	pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
		let ip: IpAddr = self
			.host
			.parse()
			.map_err(|_| SettingsError::InvalidHost(self.host.clone()))?;
		Ok(SocketAddr::new(ip, self.port))
	}

	/// Graceful shutdown timeout.
	pub fn shutdown_timeout(&self) -> Duration {
		Duration::from_secs(self.shutdown_timeout_secs)
	}
}

/// Drops variables whose name or value is not valid UTF-8.
fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
	I: IntoIterator<Item = (OsString, OsString)>,
{
	vars.into_iter()
		.filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, SettingsError>
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	value.parse().map_err(|err: T::Err| SettingsError::InvalidEnv {
		key: key.to_string(),
		reason: err.to_string(),
	})
}
