use std::sync::Arc;

use serenity::async_trait;
use tracing::{debug, error};

use crate::bot::{chat_event::chat_event::ChatEvent, commands::commands::BotResult, dispatcher::dispatcher::dispatch_message, replies::Replies, state::def::AppState};

#[derive(Debug, Clone)]
pub struct GuildHandle {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct RoleHandle {
    pub guild_id: String,
    pub id: String,
    /// 24-bit RGB value.
    pub color: u32,
}

/// Everything the bot needs from the chat platform.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(&self, channel: &str, message: &str) -> BotResult<()>;
    async fn channel_name(&self, channel: &str) -> BotResult<String>;

    async fn reply(&self, channel: &str, user: &str, message: &str) -> BotResult<()> {
        self.send_message(channel, &format!("<@{user}>, {message}")).await
    }

    async fn fetch_guild(&self, guild_id: &str) -> BotResult<GuildHandle>;
    async fn fetch_role(&self, guild: &GuildHandle, role_id: &str) -> BotResult<RoleHandle>;
    async fn set_role_color(&self, role: &RoleHandle, color: u32) -> BotResult<()>;
}

pub async fn handle_message(state: &Arc<AppState>, event: &ChatEvent) {
    let outcome = dispatch_message(state, event).await;
    let guild_id = event.guild.as_ref().map_or("dm", |guild| guild.id.as_str());
    debug!("Message {} from {} in {}: {:?}", event.message_id, event.author.tag, guild_id, outcome);

    // DMs are mirrored so private abuse of the bot stays visible.
    if event.is_dm() {
        send_to_log(state, &Replies::direct_message(event)).await;
    }
}

pub async fn handle_message_delete(state: &Arc<AppState>, event: &ChatEvent) {
    if !event.author.bot {
        let channel = channel_name(state, event).await;
        send_to_log(state, &Replies::message_deleted(event, &channel)).await;
    }
}

pub async fn handle_message_update(state: &Arc<AppState>, old: &ChatEvent, new: &ChatEvent) {
    if !old.author.bot && old.content != new.content {
        let channel = channel_name(state, old).await;
        send_to_log(state, &Replies::message_edited(old, new, &channel)).await;
    }
}

/// Channel name for reports and mirrors, the channel id when it cannot be resolved.
pub async fn channel_name(state: &AppState, event: &ChatEvent) -> String {
    match state.client.channel_name(&event.channel.id).await {
        Ok(name) => name,
        Err(e) => {
            debug!("Could not resolve channel {}: {e}", event.channel.id);
            event.channel.id.clone()
        }
    }
}

async fn send_to_log(state: &AppState, message: &str) {
    if let Err(e) = state.client.send_message(&state.config.log_channel, message).await {
        error!("Failed to mirror to log channel: {e}");
    }
}
