use std::sync::{atomic::Ordering, Arc};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error};

use crate::bot::{chat_event::chat_event::ChatEvent, commands::commands::{CommandContext, CommandProps}, handler::handler::channel_name, permissions::permissions::{may_use_commands, may_use_plugin}, replies::Replies, state::def::{AppState, BotError}};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// First token, lowercased.
    pub key: String,
    pub args: Vec<String>,
}

/// Where a message stopped on its way to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Bot author, missing prefix, or the bot is shutting down.
    Ignored,
    /// Author holds a blocked role.
    Blocked,
    Unknown,
    /// Owner-only plugin invoked by someone else.
    Denied,
    Executed,
    Failed,
}

/// Strips one wrapping pair of square brackets.
pub fn remove_brackets(arg: &str) -> &str {
    arg.strip_prefix('[').and_then(|a| a.strip_suffix(']')).unwrap_or(arg)
}

pub fn parse_command(content: &str, prefix: &str) -> Option<ParsedCommand> {
    let rest = content.strip_prefix(prefix)?;
    let mut tokens = WHITESPACE.split(rest);
    let key = tokens.next().unwrap_or_default().to_lowercase();
    let args = tokens.map(|arg| remove_brackets(arg).to_string()).collect();

    Some(ParsedCommand { key, args })
}

pub async fn dispatch_message(state: &Arc<AppState>, event: &ChatEvent) -> DispatchOutcome {
    if event.author.bot || state.shutting_down.load(Ordering::SeqCst) {
        return DispatchOutcome::Ignored;
    }

    let prefix = &state.settings.prefix;
    let Some(parsed) = parse_command(&event.content, prefix) else {
        return DispatchOutcome::Ignored;
    };

    if !may_use_commands(&state.config, event) {
        debug!("Ignoring '{}' from blocked member {}", parsed.key, event.author.tag);
        return DispatchOutcome::Blocked;
    }

    let Some(target) = state.registry.resolve(&parsed.key) else {
        return DispatchOutcome::Unknown;
    };

    if !may_use_plugin(&state.config, event, &target.plugin_name) {
        debug!("{} tried owner command '{}'", event.author.tag, parsed.key);
        return DispatchOutcome::Denied;
    }

    let Some(command) = state.registry.command(target) else {
        return DispatchOutcome::Unknown;
    };

    let ctx = CommandContext {
        event: event.clone(),
        args: parsed.args,
        state: state.clone(),
        props: CommandProps { command: target.command_name.clone(), prefix: prefix.clone() },
    };

    // Run on its own task so a panicking handler is reported like an error.
    let result = match tokio::spawn(command.execute(ctx)).await {
        Ok(result) => result,
        Err(join_error) => Err(BotError::HandlerPanicked(join_error.to_string())),
    };

    match result {
        Ok(()) => DispatchOutcome::Executed,
        Err(e) => {
            report_failure(state, &parsed.key, event, &e).await;
            DispatchOutcome::Failed
        }
    }
}

async fn report_failure(state: &AppState, command: &str, event: &ChatEvent, err: &BotError) {
    error!("Command '{}' used by {} failed: {:?}", command, event.author.tag, err);

    let channel = channel_name(state, event).await;
    let report = Replies::command_error_report(command, event, &channel, &err.to_string());
    if let Err(e) = state.client.send_message(&state.config.debug_channel, &report).await {
        error!("Failed to report command error to debug channel: {e}");
    }

    if let Err(e) = state.client.reply(&event.channel.id, &event.author.id, &Replies::command_failed()).await {
        error!("Failed to notify {} about command error: {e}", event.author.tag);
    }
}
