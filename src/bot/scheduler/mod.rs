use std::{sync::{atomic::{AtomicBool, Ordering}, Arc}, time::Duration};

use tokio::{task::JoinHandle, time::{interval_at, Instant, MissedTickBehavior}};
use tracing::info;

use crate::bot::{scheduler::{colors::update_random_color_roles, reset::reset_variables}, state::def::AppState};

pub mod colors;
pub mod reset;

pub const RESET_INTERVAL: Duration = Duration::from_secs(60);
pub const COLOR_INTERVAL: Duration = Duration::from_secs(3600);

/// Starts both maintenance timers. Call once the gateway reports ready.
pub fn start_scheduler(state: Arc<AppState>) -> Vec<JoinHandle<()>> {
    info!("Starting maintenance tasks");
    vec![spawn_reset_task(state.clone()), spawn_color_task(state)]
}

/// READY is sent again after every reconnect, the timers must only start once.
#[derive(Default)]
pub struct SchedulerGuard {
    started: AtomicBool,
}

impl SchedulerGuard {
    pub fn start_once(&self, state: &Arc<AppState>) -> Option<Vec<JoinHandle<()>>> {
        if self.started.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(start_scheduler(state.clone()))
    }
}

fn spawn_reset_task(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + RESET_INTERVAL, RESET_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            // Runs detached, a slow sweep may overlap the next one.
            let state = state.clone();
            tokio::spawn(async move { reset_variables(&state).await });
        }
    })
}

fn spawn_color_task(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + COLOR_INTERVAL, COLOR_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            update_random_color_roles(&state);
        }
    })
}
