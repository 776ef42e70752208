use crate::bot::{chat_event::chat_event::ChatEvent, state::def::BotConfig};

/// Commands in this plugin are reserved for the configured owner.
pub const OWNER_PLUGIN_NAME: &str = "owner";

pub fn is_owner(config: &BotConfig, user_id: &str) -> bool {
    config.owner_id == user_id
}

pub fn has_blocked_role(config: &BotConfig, event: &ChatEvent) -> bool {
    event.member_roles.iter().any(|role| config.blocked_roles.contains(role))
}

/// Blocked members may not use any command. The owner is never blocked.
pub fn may_use_commands(config: &BotConfig, event: &ChatEvent) -> bool {
    is_owner(config, &event.author.id) || !has_blocked_role(config, event)
}

pub fn may_use_plugin(config: &BotConfig, event: &ChatEvent, plugin_name: &str) -> bool {
    plugin_name != OWNER_PLUGIN_NAME || is_owner(config, &event.author.id)
}
