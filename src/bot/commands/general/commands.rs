use std::sync::Arc;

use chrono::Duration;
use lazy_static::lazy_static;
use rand::seq::SliceRandom;

use crate::{bot::{commands::{commands::{CommandT, FnCommand}, CommandGroup, CommandRef, CommandRegistry}, permissions::permissions::{is_owner, OWNER_PLUGIN_NAME}, replies::Replies}, cmd};

const PING_COOLDOWN_SECS: i64 = 5;
const HELP_COOLDOWN_SECS: i64 = 10;

lazy_static! {
    pub static ref GENERAL_PLUGIN: Arc<CommandGroup> = Arc::new(CommandGroup {
        name: "general".into(),
        commands: vec![
            cmd!(ping_command(), "pong"),
            cmd!(version_command(), "v"),
            cmd!(help_command(), "commands"),
            cmd!(avatar_command()),
        ]
    });
}

pub fn ping_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |ctx| {
            Box::pin(async move {
                let cooldowns = &ctx.state.stores.cooldowns;
                if !cooldowns.try_user(&ctx.event.author.id, Duration::seconds(PING_COOLDOWN_SECS)).await {
                    return Ok(());
                }

                let loud = ctx.args.iter().any(|arg| arg.eq_ignore_ascii_case("loud"));
                ctx.reply(&Replies::pong(loud)).await
            })
        },
        "Checks that the bot is alive",
        "ping [loud]",
        "ping",
    ))
}

pub fn version_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |ctx| Box::pin(async move { ctx.say(&Replies::version(&ctx.state.settings.version)).await }),
        "Shows the running bot version",
        "version",
        "version",
    ))
}

pub fn avatar_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |ctx| {
            Box::pin(async move {
                let avatar = ctx.state.settings.avatars.choose(&mut rand::thread_rng()).cloned();
                match avatar {
                    Some(url) => ctx.say(&url).await,
                    None => ctx.say(&Replies::no_avatars()).await,
                }
            })
        },
        "Shows one of the bot's avatars",
        "avatar",
        "avatar",
    ))
}

pub fn help_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |ctx| {
            Box::pin(async move {
                let stores = &ctx.state.stores;
                if !stores.cooldowns.try_channel(&ctx.event.channel.id, Duration::seconds(HELP_COOLDOWN_SECS)).await {
                    return Ok(());
                }

                let owner = is_owner(&ctx.state.config, &ctx.event.author.id);

                if let Some(token) = ctx.args.first() {
                    let registry = &ctx.state.registry;
                    let found = registry
                        .resolve(&token.to_lowercase())
                        .filter(|target| owner || target.plugin_name != OWNER_PLUGIN_NAME)
                        .and_then(|target| registry.command(target));
                    return match found {
                        Some(command) => ctx.say(&Replies::command_help(&ctx.props.prefix, command.as_ref())).await,
                        None => ctx.say(&Replies::unknown_command(&ctx.props.prefix, token)).await,
                    };
                }

                let key = if owner { "help:owner" } else { "help" };

                let cached = stores.response_cache.read().await.get(key).cloned();
                let listing = match cached {
                    Some(listing) => listing,
                    None => {
                        let listing = command_listing(&ctx.state.registry, &ctx.props.prefix, owner);
                        stores.response_cache.write().await.insert(key.to_string(), listing.clone());
                        listing
                    }
                };

                ctx.say(&listing).await
            })
        },
        "Lists every command",
        "help [command]",
        "help",
    ))
}

/// One line per plugin, aliases in parentheses. The owner plugin is only
/// listed for the owner.
pub fn command_listing(registry: &CommandRegistry, prefix: &str, include_owner: bool) -> String {
    let mut lines = vec![format!("**Commands** (prefix `{prefix}`)")];

    for plugin in registry.plugin_names() {
        if plugin == OWNER_PLUGIN_NAME && !include_owner {
            continue;
        }

        let entries: Vec<String> = registry
            .commands_of(plugin)
            .iter()
            .map(|command| {
                let target = CommandRef { plugin_name: plugin.clone(), command_name: command.name().to_string() };
                let mut tokens = registry.tokens_for(&target).into_iter();
                let name = tokens.next().unwrap_or_default();
                let aliases: Vec<String> = tokens.collect();
                if aliases.is_empty() { name } else { format!("{} ({})", name, aliases.join(", ")) }
            })
            .collect();

        lines.push(format!("**{}**: {}", plugin, entries.join(", ")));
    }

    lines.join("\n")
}
