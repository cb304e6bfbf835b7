//! Conversion configuration.
//!
//! [`MigrationConfig`] is the validated structure every pipeline stage reads.
//! It can be built in code with the `with_*` builder methods or loaded from
//! the `config.yaml` file that sits next to the export:
//!
//! ```yaml
//! chat_type: channel          # post | channel | direct_chat (default)
//! timezone: Europe/Zurich     # IANA name, default UTC
//! users:                      # required: source id -> Mattermost username
//!   user123: alice
//!   user456: bob
//! mentions:                   # optional: bare @token -> Mattermost mention
//!   alice_tg: alice
//! import_into:                # required unless chat_type is direct_chat
//!   team: example
//!   channel: town-square
//! ```
//!
//! # Example
//!
//! ```rust
//! use tg2mm::config::{ChatType, MigrationConfig};
//!
//! # fn main() -> tg2mm::Result<()> {
//! let config = MigrationConfig::new()
//!     .with_user("user123", "alice")
//!     .with_import_into("example", "town-square")
//!     .with_chat_type(ChatType::Channel)
//!     .with_timezone_name("Europe/Zurich")?;
//!
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

/// Default configuration file name inside the export directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Destination mode of the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    /// Flat list of posts into an existing team channel, no header records.
    Post,
    /// Posts into a team channel, preceded by team/channel/user records.
    Channel,
    /// Direct-message channel between the configured users.
    #[default]
    DirectChat,
}

impl ChatType {
    /// Returns `true` if this mode needs `import_into`.
    pub fn needs_import_target(&self) -> bool {
        !matches!(self, ChatType::DirectChat)
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatType::Post => write!(f, "post"),
            ChatType::Channel => write!(f, "channel"),
            ChatType::DirectChat => write!(f, "direct_chat"),
        }
    }
}

impl FromStr for ChatType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "post" => Ok(ChatType::Post),
            "channel" => Ok(ChatType::Channel),
            "direct_chat" | "direct" => Ok(ChatType::DirectChat),
            _ => Err(format!(
                "Unknown chat type: '{}'. Expected one of: post, channel, direct_chat",
                s
            )),
        }
    }
}

/// Team and channel the posts are imported into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTarget {
    pub team: String,
    pub channel: String,
}

/// Validated conversion settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationConfig {
    /// Destination mode (default: direct chat).
    pub chat_type: ChatType,

    /// Source sender id (e.g. `user123`) to destination username.
    pub users: BTreeMap<String, String>,

    /// Bare mention token (without `@`) to destination mention target.
    pub mentions: BTreeMap<String, String>,

    /// Destination team and channel; unused for direct chats.
    pub import_into: Option<ImportTarget>,

    /// Timezone the export's naive timestamps are read in (default: UTC).
    pub timezone: Tz,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            chat_type: ChatType::default(),
            users: BTreeMap::new(),
            mentions: BTreeMap::new(),
            import_into: None,
            timezone: Tz::UTC,
        }
    }
}

/// On-disk shape of `config.yaml`, before validation.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    chat_type: Option<ChatType>,
    #[serde(default)]
    users: Option<BTreeMap<String, String>>,
    #[serde(default)]
    mentions: Option<BTreeMap<String, String>>,
    #[serde(default)]
    import_into: Option<ImportTarget>,
    #[serde(default)]
    timezone: Option<String>,
}

impl MigrationConfig {
    /// Creates an empty configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a YAML configuration document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| MigrateError::invalid_config(e.to_string()))?;

        let timezone = match file.timezone.as_deref() {
            Some(name) => parse_timezone(name)?,
            None => Tz::UTC,
        };

        let config = Self {
            chat_type: file.chat_type.unwrap_or_default(),
            users: file.users.unwrap_or_default(),
            mentions: file.mentions.unwrap_or_default(),
            import_into: file.import_into,
            timezone,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            MigrateError::InvalidConfig { message } => MigrateError::invalid_config(format!(
                "{}: {message}",
                path.display()
            )),
            other => other,
        })
    }

    /// Checks the cross-field rules serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.users.is_empty() {
            return Err(MigrateError::invalid_config(
                "missing required field 'users'",
            ));
        }
        if let Some((id, _)) = self.users.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(MigrateError::invalid_config(format!(
                "user '{id}' maps to an empty username"
            )));
        }
        if self.chat_type.needs_import_target() {
            let Some(target) = &self.import_into else {
                return Err(MigrateError::invalid_config(format!(
                    "missing required field 'import_into' for chat_type '{}'",
                    self.chat_type
                )));
            };
            if target.team.trim().is_empty() || target.channel.trim().is_empty() {
                return Err(MigrateError::invalid_config(
                    "import_into needs non-empty 'team' and 'channel'",
                ));
            }
        }
        Ok(())
    }

    /// Distinct configured usernames in `users` key order.
    pub fn usernames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.users.len());
        for name in self.users.values() {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Sets the destination mode.
    #[must_use]
    pub fn with_chat_type(mut self, chat_type: ChatType) -> Self {
        self.chat_type = chat_type;
        self
    }

    /// Maps a source sender id to a destination username.
    #[must_use]
    pub fn with_user(mut self, source_id: impl Into<String>, username: impl Into<String>) -> Self {
        self.users.insert(source_id.into(), username.into());
        self
    }

    /// Maps a bare `@token` to a destination mention.
    #[must_use]
    pub fn with_mention(mut self, token: impl Into<String>, target: impl Into<String>) -> Self {
        self.mentions.insert(token.into(), target.into());
        self
    }

    /// Sets the destination team and channel.
    #[must_use]
    pub fn with_import_into(mut self, team: impl Into<String>, channel: impl Into<String>) -> Self {
        self.import_into = Some(ImportTarget {
            team: team.into(),
            channel: channel.into(),
        });
        self
    }

    /// Sets the timezone.
    #[must_use]
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Sets the timezone by IANA name.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::InvalidTimezone`] for unknown names.
    pub fn with_timezone_name(self, name: &str) -> Result<Self> {
        Ok(self.with_timezone(parse_timezone(name)?))
    }
}

/// Resolves an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| MigrateError::InvalidTimezone {
            name: name.to_string(),
        })
}
