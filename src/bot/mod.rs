use std::sync::Arc;

use tracing::info;

use crate::bot::{commands::commands::{builtin_plugins, BotResult}, platforms::discord::discord::{run_discord_bot, DiscordClient}, state::{def::{AppState, BotConfig, BotSecrets, ConfigSource, Settings}, state::config_dir}};

pub mod state;
pub mod chat_event;
pub mod dispatcher;
pub mod commands;
pub mod platforms;
pub mod permissions;
pub mod handler;
pub mod replies;
pub mod scheduler;
#[cfg(test)]
pub mod testing;

pub async fn run_bot() -> BotResult<()> {
    let source = ConfigSource::detect();
    let dir = config_dir();
    info!("Loading configuration from {:?} ({})", source, dir.display());

    let settings = Settings::load(&dir)?;
    let config = BotConfig::load(source, &dir)?;
    let secrets = BotSecrets::load(source, &dir)?;

    let client = Arc::new(DiscordClient::new(&secrets.discord_token));
    let state = Arc::new(AppState::new(settings, config, &builtin_plugins(), client));
    info!(
        "Registered {} plugins, prefix '{}', version {}",
        state.registry.plugin_names().len(),
        state.settings.prefix,
        state.settings.version
    );

    run_discord_bot(state, &secrets.discord_token).await
}
