use fishdash_core::constants::{PLAYER_SPEED, SCROLL_SPEED};
use fishdash_core::sim::{Obstacle, Pickup, Player, WorldSnapshot};
use fishdash_core::tape::FrameInput;
use serde::Serialize;

mod roster;

pub use roster::{bot_fingerprint, bot_ids, bot_manifest_entries, create_bot, describe_bots};

pub trait AutopilotBot {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// Called before every run with the seed the run starts from.
    fn reset(&mut self, seed: u32);
    fn next_input(&mut self, world: &WorldSnapshot) -> FrameInput;
}

#[derive(Clone, Debug, Serialize)]
pub struct BotManifestEntry {
    pub id: String,
    pub family: String,
    pub description: String,
    pub config_hash: String,
    pub config: serde_json::Value,
}

#[derive(Clone, Copy, Debug, Serialize)]
struct SteerConfig {
    id: &'static str,
    description: &'static str,
    /// Detour through a pickup when the next band is still reachable afterwards.
    chase_coins: bool,
    /// Pixels kept between the fish and a band edge while inside a column.
    band_margin: i32,
    /// Vertical error tolerated before steering.
    deadband: i32,
}

/// Holds no key at all. Useful as a baseline and for crash-path tapes.
struct IdleBot;

impl AutopilotBot for IdleBot {
    fn id(&self) -> &'static str {
        "idle"
    }

    fn description(&self) -> &'static str {
        "Never steers; the fish drifts with the current until the first column."
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, _world: &WorldSnapshot) -> FrameInput {
        FrameInput::None
    }
}

struct SteerBot {
    cfg: SteerConfig,
}

impl SteerBot {
    fn new(cfg: SteerConfig) -> Self {
        Self { cfg }
    }

    /// Top-edge range that keeps the fish inside the column's band.
    fn safe_range(&self, obstacle: &Obstacle, player: &Player) -> (i32, i32) {
        let low = obstacle.gap_y + self.cfg.band_margin;
        let high = obstacle.gap_bottom() - player.height - self.cfg.band_margin;
        if low > high {
            let mid = obstacle.gap_y + (obstacle.gap_height - player.height) / 2;
            (mid, mid)
        } else {
            (low, high)
        }
    }

    fn band_target(&self, obstacle: &Obstacle, player: &Player) -> i32 {
        let (low, high) = self.safe_range(obstacle, player);
        (low + high) / 2
    }

    fn coin_target(&self, pickup: &Pickup, player: &Player) -> i32 {
        pickup.y + pickup.height / 2 - player.height / 2
    }

    /// Whether a fish that picks up `pickup` can still settle into `next` in time.
    fn coin_is_safe(&self, pickup: &Pickup, next: Option<&Obstacle>, player: &Player) -> bool {
        let Some(next) = next else {
            return true;
        };
        if next.x <= pickup.x {
            return false;
        }
        let ticks = (next.x - pickup.x) / SCROLL_SPEED;
        let (low, high) = self.safe_range(next, player);
        let from = self.coin_target(pickup, player);
        let distance = if from < low {
            low - from
        } else if from > high {
            from - high
        } else {
            0
        };
        distance <= ticks * PLAYER_SPEED
    }

    fn target_y(&self, world: &WorldSnapshot) -> i32 {
        let player = &world.player;
        let right_edge = player.x + player.width;

        let mut ahead = world
            .obstacles
            .iter()
            .filter(|obstacle| obstacle.x + obstacle.width >= player.x);
        let first = ahead.next();
        let second = ahead.next();

        // Inside a column: aim for the next band but never leave the current one.
        if let Some(current) = first.filter(|obstacle| obstacle.x < right_edge) {
            let (low, high) = self.safe_range(current, player);
            let wanted = match second {
                Some(next) => self.band_target(next, player),
                None => self.band_target(current, player),
            };
            return wanted.clamp(low, high);
        }

        if self.cfg.chase_coins {
            let coin = world
                .pickups
                .iter()
                .filter(|pickup| !pickup.collected && pickup.x + pickup.width >= player.x)
                .filter(|pickup| first.map_or(true, |obstacle| pickup.x < obstacle.x))
                .min_by_key(|pickup| pickup.x);
            if let Some(coin) = coin {
                if self.coin_is_safe(coin, first, player) {
                    return self.coin_target(coin, player);
                }
            }
        }

        match first {
            Some(obstacle) => self.band_target(obstacle, player),
            None => world.viewport.player_max_y() / 2,
        }
    }
}

impl AutopilotBot for SteerBot {
    fn id(&self) -> &'static str {
        self.cfg.id
    }

    fn description(&self) -> &'static str {
        self.cfg.description
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, world: &WorldSnapshot) -> FrameInput {
        let target = self.target_y(world).clamp(0, world.viewport.player_max_y());
        let error = target - world.player.y;
        if error < -self.cfg.deadband {
            FrameInput::Up
        } else if error > self.cfg.deadband {
            FrameInput::Down
        } else {
            FrameInput::None
        }
    }
}
