use std::sync::{atomic::Ordering, Arc};

use lazy_static::lazy_static;
use tracing::info;

use crate::{bot::{commands::{commands::{CommandT, FnCommand}, CommandGroup}, permissions::permissions::OWNER_PLUGIN_NAME, replies::Replies}, cmd};

lazy_static! {
    pub static ref OWNER_PLUGIN: Arc<CommandGroup> = Arc::new(CommandGroup {
        name: OWNER_PLUGIN_NAME.into(),
        commands: vec![
            cmd!(shutdown_command()),
            cmd!(stats_command()),
        ]
    });
}

pub fn shutdown_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |ctx| {
            Box::pin(async move {
                info!("Shutdown requested by {}", ctx.event.author.tag);
                ctx.reply(&Replies::shutting_down()).await?;
                ctx.state.shutting_down.store(true, Ordering::SeqCst);
                ctx.state.shutdown.notify_one();
                Ok(())
            })
        },
        "Stops the bot",
        "shutdown",
        "shutdown",
    ))
}

pub fn stats_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |ctx| {
            Box::pin(async move {
                let stores = &ctx.state.stores;
                let report = Replies::stats(
                    stores.user_info.read().await.len(),
                    stores.response_cache.read().await.len(),
                    stores.sessions.read().await.len(),
                    stores.cooldowns.users.read().await.len(),
                    stores.cooldowns.channels.read().await.len(),
                );

                ctx.state.client.send_message(&ctx.state.config.data_channel, &report).await
            })
        },
        "Posts in-memory store sizes to the data channel",
        "stats",
        "stats",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{dispatcher::dispatcher::{dispatch_message, DispatchOutcome}, testing::{event, test_state, RecordingClient, CHANNEL, DATA_CHANNEL, OWNER_ID}};

    #[tokio::test]
    async fn shutdown_stops_further_dispatch() {
        let client = Arc::new(RecordingClient::default());
        let state = test_state(client.clone());

        assert_eq!(dispatch_message(&state, &event(OWNER_ID, "!shutdown")).await, DispatchOutcome::Executed);
        assert!(state.shutting_down.load(Ordering::SeqCst));
        // The stored permit lets a later waiter through immediately.
        state.shutdown.notified().await;

        assert_eq!(dispatch_message(&state, &event(OWNER_ID, "!version")).await, DispatchOutcome::Ignored);
        assert_eq!(client.sent_to(CHANNEL).await, vec![format!("<@{OWNER_ID}>, Shutting down 👋")]);
    }

    #[tokio::test]
    async fn stats_go_to_the_data_channel() {
        let client = Arc::new(RecordingClient::default());
        let state = test_state(client.clone());
        state.stores.response_cache.write().await.insert("help".into(), "cached".into());

        dispatch_message(&state, &event(OWNER_ID, "!stats")).await;

        assert_eq!(
            client.sent_to(DATA_CHANNEL).await,
            vec!["📋 0 user info entries, 1 cached responses, 0 sessions, 0 user cooldowns, 0 channel cooldowns"]
        );
    }
}
