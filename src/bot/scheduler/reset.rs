use chrono::{Duration, Utc};
use tracing::debug;

use crate::bot::state::def::AppState;

/// Cooldown timestamps older than this can no longer block anything.
const COOLDOWN_RETENTION_MINUTES: i64 = 10;

pub async fn reset_variables(state: &AppState) {
    let pruned = state.stores.cooldowns.prune(Duration::minutes(COOLDOWN_RETENTION_MINUTES), Utc::now()).await;

    let mut cache = state.stores.response_cache.write().await;
    let cached = cache.len();
    cache.clear();

    debug!("Reset variables: {} cooldowns pruned, {} cached responses dropped", pruned, cached);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bot::testing::{test_state, RecordingClient};

    #[tokio::test]
    async fn keeps_recent_cooldowns_and_clears_cache() {
        let state = test_state(Arc::new(RecordingClient::default()));
        let now = Utc::now();
        state.stores.cooldowns.users.write().await.insert("recent".into(), now);
        state.stores.cooldowns.channels.write().await.insert("stale".into(), now - Duration::hours(1));
        state.stores.response_cache.write().await.insert("help".into(), "listing".into());

        reset_variables(&state).await;

        assert!(state.stores.cooldowns.users.read().await.contains_key("recent"));
        assert!(state.stores.cooldowns.channels.read().await.is_empty());
        assert!(state.stores.response_cache.read().await.is_empty());
    }
}
