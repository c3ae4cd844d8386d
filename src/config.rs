/*!
# Credential File

Reads the flat `key=value` file in which the player keeps its panel
credentials:

```text
address=http://panel.example:8080
username=alice
password=secret
```

Lines without `=` are ignored, and keys that are absent read as the empty
string.
*/
use log::warn;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the credential file, both in the data directory and as the
/// working-directory fallback.
pub const CONFIG_FILE_NAME: &str = "xtream_config.txt";

/// Directory under the platform data directory that holds the credential file.
pub const CONFIG_DIR_NAME: &str = "MacXtreamer";

/// Errors raised while loading credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The credential file could not be read
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No panel address was configured or given on the command line
    #[error("no panel address configured (set `address=` in the config file or pass --address)")]
    MissingAddress,
}

/// A parsed `key=value` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    entries: HashMap<String, String>,
}

impl ConfigFile {
    /// Parses `text`, splitting each line at its first `=`. Keys and values
    /// are trimmed. Later duplicates overwrite earlier ones.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        Self { entries }
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Returns the value for `key`, or `""` if the key is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.entries.get(key).map_or("", String::as_str)
    }

    /// Builds credentials from the `address`, `username` and `password` keys.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.get("address"), self.get("username"), self.get("password"))
    }
}

/// Panel address and login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Base URL of the panel, without a trailing `/`
    pub address: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Creates credentials, normalizing the address.
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let address: String = address.into();
        Self {
            address: address.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Replaces each field for which an override is given.
    #[must_use]
    pub fn with_overrides(
        self,
        address: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Self {
        Self::new(
            address.map_or(self.address, str::to_string),
            username.map_or(self.username, str::to_string),
            password.map_or(self.password, str::to_string),
        )
    }

    /// Fails with [`ConfigError::MissingAddress`] when no address is set.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn require_address(self) -> Result<Self, ConfigError> {
        if self.address.trim().is_empty() {
            Err(ConfigError::MissingAddress)
        } else {
            Ok(self)
        }
    }
}

/// Location of the credential file when none is given: the player's data
/// directory (`~/Library/Application Support/MacXtreamer` on macOS) if the
/// file exists there, else `xtream_config.txt` in the working directory.
#[must_use]
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    let Some(mut primary) = dirs::data_dir() else {
        warn!("no platform data directory; using ./{CONFIG_FILE_NAME}");
        return local;
    };
    primary.push(CONFIG_DIR_NAME);
    primary.push(CONFIG_FILE_NAME);
    if primary.is_file() {
        primary
    } else {
        warn!("{} not found; using ./{CONFIG_FILE_NAME}", primary.display());
        local
    }
}

/// Loads credentials from `path` (or [`default_config_path`]), applies the
/// given overrides, and checks that an address is present. A missing file is
/// tolerated when the overrides alone supply an address.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] for an unreadable file when no address
/// override is given, or [`ConfigError::MissingAddress`] if no address results.
pub fn resolve_credentials(
    path: Option<&Path>,
    address: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<Credentials, ConfigError> {
    let path = path.map_or_else(default_config_path, Path::to_path_buf);
    let file = match ConfigFile::load(&path) {
        Ok(file) => file,
        Err(err) if address.is_some() => {
            warn!("{err}; relying on command-line credentials");
            ConfigFile::default()
        }
        Err(err) => return Err(err),
    };
    file.credentials()
        .with_overrides(address, username, password)
        .require_address()
}
