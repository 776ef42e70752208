use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::bot::{chat_event::chat_event::ChatEvent, commands::{general::commands::GENERAL_PLUGIN, owner::commands::OWNER_PLUGIN, CommandGroup, CommandMap, CommandRef, CommandRegistry}, state::def::{AppState, BotError}};

pub type BotResult<T> = Result<T, BotError>;

/// Extra invocation data handed to every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandProps {
    /// Primary name of the resolved command, even when invoked through an alias.
    pub command: String,
    pub prefix: String,
}

pub struct CommandContext {
    pub event: ChatEvent,
    pub args: Vec<String>,
    pub state: Arc<AppState>,
    pub props: CommandProps,
}

impl CommandContext {
    pub async fn say(&self, message: &str) -> BotResult<()> {
        self.state.client.send_message(&self.event.channel.id, message).await
    }

    pub async fn reply(&self, message: &str) -> BotResult<()> {
        self.state.client.reply(&self.event.channel.id, &self.event.author.id, message).await
    }
}

pub trait CommandT: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn usage(&self) -> &str;

    fn execute(&self, ctx: CommandContext) -> BoxFuture<'static, BotResult<()>>;
}

pub struct FnCommand<F> {func: F, desc: String, usage: String, name: String} impl<F> FnCommand<F>
    where
        F: Fn(CommandContext) -> BoxFuture<'static, BotResult<()>> + Send + Sync + 'static {
    pub fn new(func: F, desc: impl Into<String>, usage: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            func,
            desc: desc.into(),
            usage: usage.into(),
            name: name.into(),
        }
    }
}

impl<F> CommandT for FnCommand<F> where
    F: Fn(CommandContext) -> BoxFuture<'static, BotResult<()>> + Send + Sync + 'static {
        fn execute(&self, ctx: CommandContext) -> BoxFuture<'static, BotResult<()>> {
            (self.func)(ctx)
        }

        fn name(&self) -> &str { &self.name }
        fn description(&self) -> &str { &self.desc }
        fn usage(&self) -> &str { &self.usage }
}

/// Every plugin the bot ships with, in registration order.
pub fn builtin_plugins() -> Vec<Arc<CommandGroup>> {
    vec![GENERAL_PLUGIN.clone(), OWNER_PLUGIN.clone()]
}

impl CommandRegistry {
    /// Registers every command under its own name and each of its aliases.
    /// Colliding tokens are logged and the later registration wins.
    pub fn build(groups: &[Arc<CommandGroup>]) -> Self {
        let mut plugins: HashMap<String, CommandMap> = HashMap::new();
        let mut tokens: HashMap<String, CommandRef> = HashMap::new();
        let mut order = Vec::new();

        for group in groups {
            if !order.contains(&group.name) {
                order.push(group.name.clone());
            }
            let commands = plugins.entry(group.name.clone()).or_default();

            for reg in &group.commands {
                let name = reg.command.name().to_string();
                commands.insert(name.clone(), reg.command.clone());

                let target = CommandRef { plugin_name: group.name.clone(), command_name: name.clone() };
                for token in std::iter::once(&name).chain(reg.aliases.iter()) {
                    let token = token.to_lowercase();
                    if let Some(previous) = tokens.insert(token.clone(), target.clone()) {
                        if previous != target {
                            warn!(
                                "Command token '{}' was {}/{}, now {}/{}",
                                token, previous.plugin_name, previous.command_name, target.plugin_name, target.command_name
                            );
                        }
                    }
                }
            }
        }

        debug!("Registered {} plugins with {} command tokens", plugins.len(), tokens.len());
        Self { plugins, tokens, order }
    }

    pub fn resolve(&self, token: &str) -> Option<&CommandRef> {
        self.tokens.get(token)
    }

    pub fn command(&self, target: &CommandRef) -> Option<Arc<dyn CommandT>> {
        self.plugins.get(&target.plugin_name)?.get(&target.command_name).cloned()
    }

    pub fn plugin_names(&self) -> &[String] {
        &self.order
    }

    /// Commands of a plugin sorted by name.
    pub fn commands_of(&self, plugin: &str) -> Vec<Arc<dyn CommandT>> {
        let mut commands: Vec<_> = self.plugins.get(plugin).map(|c| c.values().cloned().collect()).unwrap_or_default();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }

    /// Every token that resolves to the given command, primary name first.
    pub fn tokens_for(&self, target: &CommandRef) -> Vec<String> {
        let primary = target.command_name.to_lowercase();
        let mut aliases: Vec<String> = self
            .tokens
            .iter()
            .filter(|(token, r)| *r == target && **token != primary)
            .map(|(token, _)| token.clone())
            .collect();
        aliases.sort();
        let mut tokens = vec![target.command_name.clone()];
        tokens.extend(aliases);
        tokens
    }
}

#[macro_export]
macro_rules! cmd {
    ($command:expr $(,)?) => {
        $crate::bot::commands::CommandRegistration {
            aliases: Vec::new(),
            command: $command,
        }
    };
    ($command:expr, $($alias:expr),+ $(,)?) => {
        $crate::bot::commands::CommandRegistration {
            aliases: vec![$($alias.to_string()),+],
            command: $command,
        }
    };
}
