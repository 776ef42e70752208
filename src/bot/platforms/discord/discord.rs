use std::{num::NonZeroU64, sync::Arc};

use serenity::{all::{ChannelId, Context, EditRole, EventHandler, GatewayIntents, GuildId, Message, MessageId, Ready, RoleId}, async_trait, cache::Settings as CacheSettings, http::Http, model::event::MessageUpdateEvent, Client};
use tracing::{debug, info};

use crate::bot::{chat_event::chat_event::{ChannelInfo, ChatEvent, ChatUser, GuildInfo}, commands::commands::BotResult, handler::handler::{handle_message, handle_message_delete, handle_message_update, ChatClient, GuildHandle, RoleHandle}, scheduler::SchedulerGuard, state::def::{AppState, BotError}};

/// Messages kept per channel so deletes and edits can be mirrored.
const MESSAGE_CACHE_SIZE: usize = 512;

pub struct DiscordClient {
    http: Arc<Http>,
}

impl DiscordClient {
    pub fn new(token: &str) -> Self {
        Self { http: Arc::new(Http::new(token)) }
    }
}

fn parse_id(id: &str) -> BotResult<u64> {
    id.parse::<NonZeroU64>().map(NonZeroU64::get).map_err(|_| BotError::InvalidId(id.to_string()))
}

#[async_trait]
impl ChatClient for DiscordClient {
    async fn send_message(&self, channel: &str, message: &str) -> BotResult<()> {
        ChannelId::new(parse_id(channel)?).say(&self.http, message).await?;
        Ok(())
    }

    async fn channel_name(&self, channel: &str) -> BotResult<String> {
        Ok(ChannelId::new(parse_id(channel)?).name(&*self.http).await?)
    }

    async fn fetch_guild(&self, guild_id: &str) -> BotResult<GuildHandle> {
        let guild = self.http.get_guild(GuildId::new(parse_id(guild_id)?)).await?;
        Ok(GuildHandle { id: guild.id.to_string(), name: guild.name })
    }

    async fn fetch_role(&self, guild: &GuildHandle, role_id: &str) -> BotResult<RoleHandle> {
        let wanted = RoleId::new(parse_id(role_id)?);
        let roles = self.http.get_guild_roles(GuildId::new(parse_id(&guild.id)?)).await?;
        let role = roles
            .into_iter()
            .find(|role| role.id == wanted)
            .ok_or_else(|| BotError::RoleNotFound { guild: guild.id.clone(), role: role_id.to_string() })?;

        Ok(RoleHandle { guild_id: guild.id.clone(), id: role_id.to_string(), color: role.colour.0 })
    }

    async fn set_role_color(&self, role: &RoleHandle, color: u32) -> BotResult<()> {
        let guild_id = GuildId::new(parse_id(&role.guild_id)?);
        let role_id = RoleId::new(parse_id(&role.id)?);
        guild_id.edit_role(&*self.http, role_id, EditRole::new().colour(color)).await?;
        Ok(())
    }
}

fn map_message(ctx: &Context, msg: &Message) -> ChatEvent {
    let guild = msg.guild_id.map(|id| GuildInfo {
        id: id.to_string(),
        name: id.name(&ctx.cache).unwrap_or_else(|| id.to_string()),
    });
    let member_roles = msg
        .member
        .as_ref()
        .map(|member| member.roles.iter().map(|role| role.to_string()).collect())
        .unwrap_or_default();

    ChatEvent {
        message_id: msg.id.to_string(),
        author: ChatUser { id: msg.author.id.to_string(), tag: msg.author.tag(), bot: msg.author.bot },
        guild,
        channel: ChannelInfo { id: msg.channel_id.to_string(), is_dm: msg.guild_id.is_none() },
        member_roles,
        content: msg.content.clone(),
        clean_content: msg.content_safe(&ctx.cache),
    }
}

pub struct Handler {
    state: Arc<AppState>,
    scheduler: SchedulerGuard,
}

impl Handler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state, scheduler: SchedulerGuard::default() }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        self.scheduler.start_once(&self.state);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let event = map_message(&ctx, &msg);
        handle_message(&self.state, &event).await;
    }

    async fn message_delete(&self, ctx: Context, channel_id: ChannelId, deleted_message_id: MessageId, _guild_id: Option<GuildId>) {
        let cached = ctx.cache.message(channel_id, deleted_message_id).map(|msg| Message::clone(&msg));
        let Some(msg) = cached else {
            debug!("Deleted message {} was not cached", deleted_message_id);
            return;
        };

        let event = map_message(&ctx, &msg);
        handle_message_delete(&self.state, &event).await;
    }

    async fn message_update(&self, ctx: Context, old_if_available: Option<Message>, new: Option<Message>, update: MessageUpdateEvent) {
        let Some(old) = old_if_available else {
            debug!("Edited message {} was not cached", update.id);
            return;
        };

        let old_event = map_message(&ctx, &old);
        let new_event = match new {
            Some(new) => map_message(&ctx, &new),
            None => {
                let mut event = old_event.clone();
                if let Some(content) = update.content {
                    event.clean_content = content.clone();
                    event.content = content;
                }
                event
            }
        };

        handle_message_update(&self.state, &old_event, &new_event).await;
    }
}

pub async fn run_discord_bot(state: Arc<AppState>, token: &str) -> BotResult<()> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut cache_settings = CacheSettings::default();
    cache_settings.max_messages = MESSAGE_CACHE_SIZE;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler::new(state.clone()))
        .cache_settings(cache_settings)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        state.shutdown.notified().await;
        info!("Shutting down gateway shards");
        shard_manager.shutdown_all().await;
    });

    client.start().await?;
    Ok(())
}
