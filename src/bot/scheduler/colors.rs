use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::bot::{commands::commands::BotResult, state::def::{AppState, RandomColorRole}};

const SATURATION: [f64; 3] = [0.35, 0.5, 0.65];
const LIGHTNESS: [f64; 3] = [0.35, 0.5, 0.65];

/// BKDR string hash, kept below 2^53 so it matches the color-hash npm package.
fn bkdr_hash(input: &str) -> u64 {
    const SEED: u64 = 131;
    const SEED2: u64 = 137;
    const MAX_SAFE: u64 = 9_007_199_254_740_991 / SEED2;

    // The trailing 'x' spreads out very short inputs.
    input.encode_utf16().chain("x".encode_utf16()).fold(0, |hash, unit| {
        let hash = if hash > MAX_SAFE { hash / SEED2 } else { hash };
        hash * SEED + u64::from(unit)
    })
}

fn hsl(input: &str) -> (f64, f64, f64) {
    let mut hash = bkdr_hash(input);
    let hue = (hash % 359) as f64;
    hash /= 360;
    let saturation = SATURATION[(hash % SATURATION.len() as u64) as usize];
    hash /= SATURATION.len() as u64;
    let lightness = LIGHTNESS[(hash % LIGHTNESS.len() as u64) as usize];
    (hue, saturation, lightness)
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let h = hue / 360.0;
    let q = if lightness < 0.5 { lightness * (1.0 + saturation) } else { lightness + saturation - lightness * saturation };
    let p = 2.0 * lightness - q;

    [h + 1.0 / 3.0, h, h - 1.0 / 3.0].map(|mut c| {
        if c < 0.0 {
            c += 1.0;
        }
        if c > 1.0 {
            c -= 1.0;
        }
        let c = if c < 1.0 / 6.0 {
            p + (q - p) * 6.0 * c
        } else if c < 0.5 {
            q
        } else if c < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - c)
        } else {
            p
        };
        (c * 255.0).round() as u8
    })
}

/// 24-bit RGB color derived from a calendar date, stable for the whole day.
pub fn color_for_date(date: NaiveDate) -> u32 {
    let key = format!("{}/{}/{}", date.month(), date.day(), date.year());
    let (hue, saturation, lightness) = hsl(&key);
    let [r, g, b] = hsl_to_rgb(hue, saturation, lightness);
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

pub fn today_color() -> u32 {
    color_for_date(Local::now().date_naive())
}

/// Fans out one task per configured role. Failures are logged per role and
/// never stop the others.
pub fn update_random_color_roles(state: &Arc<AppState>) -> Vec<JoinHandle<()>> {
    let color = today_color();

    state
        .config
        .random_color_roles
        .iter()
        .cloned()
        .map(|target| {
            let state = state.clone();
            tokio::spawn(async move {
                if let Err(e) = change_random_color_role(&state, color, &target).await {
                    error!("Failed to update color role {} in guild {}: {e}", target.role_id, target.guild_id);
                }
            })
        })
        .collect()
}

async fn change_random_color_role(state: &AppState, color: u32, target: &RandomColorRole) -> BotResult<()> {
    let guild = state.client.fetch_guild(&target.guild_id).await?;
    let role = state.client.fetch_role(&guild, &target.role_id).await?;

    if role.color != color {
        state.client.set_role_color(&role, color).await?;
        info!("Set color of role {} in {} to #{:06X}", role.id, guild.name, color);
    }

    Ok(())
}
