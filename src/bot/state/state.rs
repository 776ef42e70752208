use std::{collections::HashMap, env, fs, path::{Path, PathBuf}, sync::{atomic::AtomicBool, Arc}};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use tokio::sync::{Notify, RwLock};
use tracing::debug;

use crate::bot::{commands::{commands::BotResult, CommandGroup, CommandRegistry}, handler::handler::ChatClient, state::def::{AppState, BotConfig, BotError, BotSecrets, ConfigFile, ConfigSource, Cooldowns, RandomColorRole, Settings, StateStores}};

impl ConfigSource {
    /// Environment variables when running on Heroku, local json files otherwise.
    /// `BOT_CONFIG_SOURCE` overrides the detection.
    pub fn detect() -> Self {
        Self::detect_with(|key| env::var(key).ok())
    }

    pub fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup("BOT_CONFIG_SOURCE").map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("env") => return ConfigSource::Env,
            Some("file") => return ConfigSource::File,
            _ => {}
        }

        if lookup("DYNO").is_some() {
            ConfigSource::Env
        } else {
            ConfigSource::File
        }
    }
}

pub fn config_dir() -> PathBuf {
    env::var("CONFIG_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> BotResult<T> {
    let path = dir.join(file);
    debug!("Reading {}", path.display());
    let raw = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Splits a `|` separated environment value, dropping empty pieces.
pub fn split_list(value: &str) -> Vec<String> {
    value.split('|').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

pub fn pair_color_roles(guilds: Vec<String>, roles: Vec<String>) -> BotResult<Vec<RandomColorRole>> {
    if guilds.len() != roles.len() {
        return Err(BotError::Config(format!(
            "randomColorGuilds has {} entries but randomColorRoles has {}",
            guilds.len(),
            roles.len()
        )));
    }

    Ok(guilds
        .into_iter()
        .zip(roles)
        .map(|(guild_id, role_id)| RandomColorRole { guild_id, role_id })
        .collect())
}

impl Settings {
    pub fn load(dir: &Path) -> BotResult<Self> {
        read_json(dir, "settings.json")
    }
}

impl TryFrom<ConfigFile> for BotConfig {
    type Error = BotError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        Ok(BotConfig {
            random_color_roles: pair_color_roles(file.random_color_guilds, file.random_color_roles)?,
            debug_channel: file.debug_channel,
            data_channel: file.data_channel,
            log_channel: file.log_channel,
            owner_id: file.owner_id,
            blocked_roles: file.blocked_roles.into_iter().collect(),
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> BotResult<String> {
    lookup(key).ok_or_else(|| BotError::Config(format!("missing environment variable {key}")))
}

impl BotConfig {
    pub fn load(source: ConfigSource, dir: &Path) -> BotResult<Self> {
        match source {
            ConfigSource::File => read_json::<ConfigFile>(dir, "config.json")?.try_into(),
            ConfigSource::Env => Self::from_env_with(|key| env::var(key).ok()),
        }
    }

    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> BotResult<Self> {
        let guilds = split_list(&required(&lookup, "RANDOM_COLOR_GUILDS")?);
        let roles = split_list(&required(&lookup, "RANDOM_COLOR_ROLES")?);

        Ok(BotConfig {
            random_color_roles: pair_color_roles(guilds, roles)?,
            debug_channel: required(&lookup, "DEBUG_CHANNEL")?,
            data_channel: required(&lookup, "DATA_CHANNEL")?,
            log_channel: required(&lookup, "LOG_CHANNEL")?,
            owner_id: required(&lookup, "OWNER_ID")?,
            blocked_roles: split_list(&required(&lookup, "BLOCKED_ROLES")?).into_iter().collect(),
        })
    }
}

impl BotSecrets {
    pub fn load(source: ConfigSource, dir: &Path) -> BotResult<Self> {
        match source {
            ConfigSource::File => read_json(dir, "credentials.json"),
            ConfigSource::Env => Ok(BotSecrets { discord_token: required(&|key: &str| env::var(key).ok(), "TOKEN")? }),
        }
    }
}

impl AppState {
    pub fn new(settings: Settings, config: BotConfig, plugins: &[Arc<CommandGroup>], client: Arc<dyn ChatClient>) -> Self {
        AppState {
            settings,
            config,
            registry: CommandRegistry::build(plugins),
            stores: StateStores::new(),
            client,
            shutting_down: AtomicBool::new(false),
            shutdown: Notify::new(),
        }
    }
}

impl StateStores {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Records `now` for `key` unless the previous use is younger than `cooldown`.
/// Check and update happen under one write lock.
async fn try_take(map: &RwLock<HashMap<String, DateTime<Utc>>>, key: &str, cooldown: Duration, now: DateTime<Utc>) -> bool {
    let mut map = map.write().await;
    match map.get(key) {
        Some(last) if now - *last < cooldown => false,
        _ => {
            map.insert(key.to_string(), now);
            true
        }
    }
}

impl Cooldowns {
    pub async fn try_user(&self, user_id: &str, cooldown: Duration) -> bool {
        try_take(&self.users, user_id, cooldown, Utc::now()).await
    }

    pub async fn try_channel(&self, channel_id: &str, cooldown: Duration) -> bool {
        try_take(&self.channels, channel_id, cooldown, Utc::now()).await
    }

    /// Drops every timestamp older than `max_age`.
    pub async fn prune(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        for map in [&self.users, &self.channels] {
            let mut map = map.write().await;
            let before = map.len();
            map.retain(|_, last| now - *last < max_age);
            removed += before - map.len();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn detects_heroku_launch() {
        assert_eq!(ConfigSource::detect_with(env_of(&[("DYNO", "web.1")])), ConfigSource::Env);
        assert_eq!(ConfigSource::detect_with(env_of(&[])), ConfigSource::File);
        assert_eq!(
            ConfigSource::detect_with(env_of(&[("DYNO", "web.1"), ("BOT_CONFIG_SOURCE", "file")])),
            ConfigSource::File
        );
    }

    #[test]
    fn env_config_pairs_guilds_with_roles() {
        let cfg = BotConfig::from_env_with(env_of(&[
            ("RANDOM_COLOR_GUILDS", "1|2"),
            ("RANDOM_COLOR_ROLES", "10|20"),
            ("DEBUG_CHANNEL", "100"),
            ("DATA_CHANNEL", "101"),
            ("LOG_CHANNEL", "102"),
            ("OWNER_ID", "7"),
            ("BLOCKED_ROLES", "66|67"),
        ]))
        .unwrap();

        assert_eq!(
            cfg.random_color_roles,
            vec![
                RandomColorRole { guild_id: "1".into(), role_id: "10".into() },
                RandomColorRole { guild_id: "2".into(), role_id: "20".into() },
            ]
        );
        assert!(cfg.blocked_roles.contains("66"));
        assert!(cfg.blocked_roles.contains("67"));
        assert_eq!(cfg.owner_id, "7");
    }

    #[test]
    fn misaligned_lists_are_rejected() {
        let err = pair_color_roles(vec!["1".into(), "2".into()], vec!["10".into()]).unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
    }

    #[test]
    fn missing_env_var_is_a_config_error() {
        let err = BotConfig::from_env_with(env_of(&[("RANDOM_COLOR_GUILDS", "")])).unwrap_err();
        assert!(matches!(err, BotError::Config(msg) if msg.contains("RANDOM_COLOR_ROLES")));
    }

    #[tokio::test]
    async fn cooldown_blocks_until_it_expires() {
        let cooldowns = Cooldowns::default();
        let now = Utc::now();

        assert!(try_take(&cooldowns.users, "1", Duration::seconds(5), now).await);
        assert!(!try_take(&cooldowns.users, "1", Duration::seconds(5), now + Duration::seconds(2)).await);
        assert!(try_take(&cooldowns.users, "2", Duration::seconds(5), now).await);
        assert!(try_take(&cooldowns.users, "1", Duration::seconds(5), now + Duration::seconds(6)).await);
    }

    #[tokio::test]
    async fn prune_drops_old_timestamps() {
        let cooldowns = Cooldowns::default();
        let now = Utc::now();
        cooldowns.users.write().await.insert("old".into(), now - Duration::minutes(20));
        cooldowns.users.write().await.insert("new".into(), now);
        cooldowns.channels.write().await.insert("old".into(), now - Duration::minutes(11));

        assert_eq!(cooldowns.prune(Duration::minutes(10), now).await, 2);
        assert!(cooldowns.users.read().await.contains_key("new"));
        assert!(cooldowns.channels.read().await.is_empty());
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let dir = env::temp_dir().join("cmdbot-missing-config-dir");

        assert!(matches!(Settings::load(&dir), Err(BotError::IoError(_))));
        assert!(matches!(BotConfig::load(ConfigSource::File, &dir), Err(BotError::IoError(_))));
    }

    #[test]
    fn config_file_uses_camel_case_keys() {
        let file: ConfigFile = serde_json::from_str(
            r#"{
                "randomColorGuilds": ["1"],
                "randomColorRoles": ["10"],
                "debugChannel": "100",
                "dataChannel": "101",
                "logChannel": "102",
                "ownerId": "7",
                "blockedRoles": []
            }"#,
        )
        .unwrap();
        let cfg = BotConfig::try_from(file).unwrap();

        assert_eq!(cfg.random_color_roles.len(), 1);
        assert_eq!(cfg.debug_channel, "100");
        assert!(cfg.blocked_roles.is_empty());
    }
}
