use crate::bot::{chat_event::chat_event::ChatEvent, commands::commands::CommandT};

pub struct Replies;

impl Replies {
    pub fn command_failed() -> String {
        "there was an error trying to execute that command!".to_string()
    }

    pub fn command_error_report(command: &str, event: &ChatEvent, channel: &str, error: &str) -> String {
        format!(
            "Error with `{}` command used by `{}` in `{}`#`{}`:\n```\n{}\n``````\n{}\n```",
            command, event.author.tag, event.guild_name(), channel, event.clean_content, error
        )
    }

    pub fn direct_message(event: &ChatEvent) -> String {
        format!("Direct Message from `{}`:\n```\n{}\n```", event.author.tag, event.content)
    }

    pub fn message_deleted(event: &ChatEvent, channel: &str) -> String {
        format!(
            "Message from `{}` in `{}`#`{}` was deleted:\n```\n{}\n```",
            event.author.tag, event.guild_name(), channel, event.clean_content
        )
    }

    pub fn message_edited(old: &ChatEvent, new: &ChatEvent, channel: &str) -> String {
        format!(
            "Message from `{}` in `{}`#`{}` was edited\nOld Message:\n```\n{}\n```New Message:\n```\n{}\n```",
            old.author.tag, old.guild_name(), channel, old.clean_content, new.clean_content
        )
    }

    pub fn pong(loud: bool) -> String {
        if loud { "PONG!".to_string() } else { "Pong!".to_string() }
    }

    pub fn version(version: &str) -> String {
        format!("Running version `{version}`")
    }

    pub fn command_help(prefix: &str, command: &dyn CommandT) -> String {
        format!("`{prefix}{}` - {}\nUsage: `{prefix}{}`", command.name(), command.description(), command.usage())
    }

    pub fn unknown_command(prefix: &str, token: &str) -> String {
        format!("No command called `{prefix}{token}`")
    }

    pub fn no_avatars() -> String {
        "No avatars are configured 😶".to_string()
    }

    pub fn shutting_down() -> String {
        "Shutting down 👋".to_string()
    }

    pub fn stats(user_info: usize, responses: usize, sessions: usize, user_cooldowns: usize, channel_cooldowns: usize) -> String {
        format!(
            "📋 {user_info} user info entries, {responses} cached responses, {sessions} sessions, {user_cooldowns} user cooldowns, {channel_cooldowns} channel cooldowns"
        )
    }
}
