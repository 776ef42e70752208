//! In-memory doubles shared by the unit tests.

use std::{collections::{HashMap, HashSet}, sync::{atomic::{AtomicUsize, Ordering}, Arc}};

use serenity::async_trait;
use tokio::sync::Mutex;

use crate::bot::{chat_event::chat_event::{ChannelInfo, ChatEvent, ChatUser, GuildInfo}, commands::{commands::{builtin_plugins, BotResult}, CommandGroup}, handler::handler::{ChatClient, GuildHandle, RoleHandle}, state::def::{AppState, BotConfig, BotError, RandomColorRole, Settings}};

pub const OWNER_ID: &str = "1";
pub const CHANNEL: &str = "500";
pub const LOG_CHANNEL: &str = "900";
pub const DEBUG_CHANNEL: &str = "901";
pub const DATA_CHANNEL: &str = "902";
pub const BLOCKED_ROLE: &str = "666";

#[derive(Default)]
pub struct RecordingClient {
    sent: Mutex<Vec<(String, String)>>,
    roles: Mutex<HashMap<(String, String), u32>>,
    color_updates: Mutex<Vec<(String, String, u32)>>,
    failing_guilds: HashSet<String>,
    channel_lookups: AtomicUsize,
}

impl RecordingClient {
    pub fn with_roles(roles: &[(&str, &str, u32)]) -> Self {
        Self {
            roles: Mutex::new(roles.iter().map(|(g, r, c)| ((g.to_string(), r.to_string()), *c)).collect()),
            ..Default::default()
        }
    }

    pub fn failing_guild(mut self, guild_id: &str) -> Self {
        self.failing_guilds.insert(guild_id.to_string());
        self
    }

    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, channel: &str) -> Vec<String> {
        self.sent.lock().await.iter().filter(|(c, _)| c == channel).map(|(_, m)| m.clone()).collect()
    }

    pub async fn color_updates(&self) -> Vec<(String, String, u32)> {
        self.color_updates.lock().await.clone()
    }

    pub fn channel_lookups(&self) -> usize {
        self.channel_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    async fn send_message(&self, channel: &str, message: &str) -> BotResult<()> {
        self.sent.lock().await.push((channel.to_string(), message.to_string()));
        Ok(())
    }

    /// Only `CHANNEL` has a known name.
    async fn channel_name(&self, channel: &str) -> BotResult<String> {
        self.channel_lookups.fetch_add(1, Ordering::SeqCst);
        if channel == CHANNEL {
            Ok("general".to_string())
        } else {
            Err(BotError::InvalidId(channel.to_string()))
        }
    }

    async fn fetch_guild(&self, guild_id: &str) -> BotResult<GuildHandle> {
        if self.failing_guilds.contains(guild_id) {
            return Err(BotError::InvalidId(guild_id.to_string()));
        }
        Ok(GuildHandle { id: guild_id.to_string(), name: format!("Guild {guild_id}") })
    }

    async fn fetch_role(&self, guild: &GuildHandle, role_id: &str) -> BotResult<RoleHandle> {
        let roles = self.roles.lock().await;
        let color = roles
            .get(&(guild.id.clone(), role_id.to_string()))
            .copied()
            .ok_or_else(|| BotError::RoleNotFound { guild: guild.id.clone(), role: role_id.to_string() })?;
        Ok(RoleHandle { guild_id: guild.id.clone(), id: role_id.to_string(), color })
    }

    async fn set_role_color(&self, role: &RoleHandle, color: u32) -> BotResult<()> {
        self.roles.lock().await.insert((role.guild_id.clone(), role.id.clone()), color);
        self.color_updates.lock().await.push((role.guild_id.clone(), role.id.clone(), color));
        Ok(())
    }
}

pub fn test_config(random_color_roles: Vec<RandomColorRole>) -> BotConfig {
    BotConfig {
        random_color_roles,
        debug_channel: DEBUG_CHANNEL.into(),
        data_channel: DATA_CHANNEL.into(),
        log_channel: LOG_CHANNEL.into(),
        owner_id: OWNER_ID.into(),
        blocked_roles: [BLOCKED_ROLE.to_string()].into_iter().collect(),
    }
}

pub fn build_state(client: Arc<RecordingClient>, config: BotConfig, plugins: Vec<Arc<CommandGroup>>) -> Arc<AppState> {
    let settings = Settings { prefix: "!".into(), version: "1.2.3".into(), avatars: vec!["https://cdn.example/avatar.png".into()] };
    Arc::new(AppState::new(settings, config, &plugins, client))
}

pub fn test_state(client: Arc<RecordingClient>) -> Arc<AppState> {
    build_state(client, test_config(Vec::new()), builtin_plugins())
}

/// A guild text message in `#general` of `Test Guild`.
pub fn event(author_id: &str, content: &str) -> ChatEvent {
    ChatEvent {
        message_id: "1000".into(),
        author: ChatUser { id: author_id.into(), tag: format!("user#{author_id}"), bot: false },
        guild: Some(GuildInfo { id: "300".into(), name: "Test Guild".into() }),
        channel: ChannelInfo { id: CHANNEL.into(), is_dm: false },
        member_roles: Vec::new(),
        content: content.into(),
        clean_content: content.into(),
    }
}
