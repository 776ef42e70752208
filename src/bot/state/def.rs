use std::{collections::{HashMap, HashSet}, io, sync::{atomic::AtomicBool, Arc}};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Notify, RwLock};

use crate::bot::{commands::CommandRegistry, handler::handler::ChatClient};

pub struct AppState {
    pub settings: Settings,
    pub config: BotConfig,
    pub registry: CommandRegistry,
    pub stores: StateStores,
    pub client: Arc<dyn ChatClient>,
    pub shutting_down: AtomicBool,
    pub shutdown: Notify,
}

/// Static settings shipped next to the binary in `settings.json`.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Settings {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub avatars: Vec<String>,
}

fn default_prefix() -> String {
    "!".into()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomColorRole {
    pub guild_id: String,
    pub role_id: String,
}

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub random_color_roles: Vec<RandomColorRole>,
    pub debug_channel: String,
    pub data_channel: String,
    pub log_channel: String,
    pub owner_id: String,
    pub blocked_roles: HashSet<String>,
}

/// On-disk shape of `config.json`. The guild and role lists are index aligned
/// and get zipped into [`RandomColorRole`] pairs on load.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default)]
    pub random_color_guilds: Vec<String>,
    #[serde(default)]
    pub random_color_roles: Vec<String>,
    pub debug_channel: String,
    pub data_channel: String,
    pub log_channel: String,
    pub owner_id: String,
    #[serde(default)]
    pub blocked_roles: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct BotSecrets {
    pub discord_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Env,
}

#[derive(Default)]
pub struct Cooldowns {
    pub users: RwLock<HashMap<String, DateTime<Utc>>>,
    pub channels: RwLock<HashMap<String, DateTime<Utc>>>,
}

/// Process-lifetime memory shared by every handler and scheduled task.
/// Nothing here is persisted.
#[derive(Default)]
pub struct StateStores {
    pub user_info: RwLock<HashMap<String, serde_json::Value>>,
    pub response_cache: RwLock<HashMap<String, String>>,
    pub sessions: RwLock<HashMap<String, serde_json::Value>>,
    pub cooldowns: Cooldowns,
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Discord error: {0}")]
    Serenity(#[from] serenity::Error),
    #[error("JSON deserialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Role {role} not found in guild {guild}")]
    RoleNotFound { guild: String, role: String },
    #[error("Command panicked: {0}")]
    HandlerPanicked(String),
}
