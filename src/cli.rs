//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`ChatTypeArg`] - command-line spelling of [`ChatType`]
//!
//! The binary only collects paths and flags here; every conversion decision
//! is made by [`Migrator`](crate::core::Migrator).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{CONFIG_FILE_NAME, ChatType};

/// Default archive name.
pub const DEFAULT_OUTPUT: &str = "mattermost_import.zip";

/// Convert a Telegram Desktop JSON export into a Mattermost bulk-import archive.
#[derive(Parser, Debug, Clone)]
#[command(name = "tg2mm")]
#[command(version, about, long_about = None)]
#[command(after_help = "INPUT DIRECTORY:
    Must contain result.json (Telegram Desktop \"Export chat history\", JSON format)
    with its media folders, plus the configuration file (config.yaml by default).

EXAMPLES:
    tg2mm ./ChatExport_2024-01-01
    tg2mm ./export -o team_chat.zip --conversation-log chat.txt
    tg2mm ./export -c staging.yaml --chat-type post --debug")]
pub struct Args {
    /// Directory with result.json, media files and the configuration file
    pub input_dir: PathBuf,

    /// Path of the archive to write
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Configuration file name, relative to INPUT_DIR
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Also write a plain-text transcript to this file
    #[arg(long, value_name = "FILE")]
    pub conversation_log: Option<PathBuf>,

    /// Override the configured chat_type
    #[arg(long, value_enum)]
    pub chat_type: Option<ChatTypeArg>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Location of the configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.input_dir.join(&self.config)
    }

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "tg2mm=debug" } else { "tg2mm=info" }
    }
}

/// Destination mode as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ChatTypeArg {
    /// Flat posts into an existing channel
    Post,
    /// Posts with team, channel and user headers
    Channel,
    /// Direct-message channel between the configured users
    #[value(alias = "direct")]
    DirectChat,
}

impl From<ChatTypeArg> for ChatType {
    fn from(arg: ChatTypeArg) -> ChatType {
        match arg {
            ChatTypeArg::Post => ChatType::Post,
            ChatTypeArg::Channel => ChatType::Channel,
            ChatTypeArg::DirectChat => ChatType::DirectChat,
        }
    }
}
