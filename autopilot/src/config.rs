use std::env;

use fishdash_core::constants::{
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, MAX_FRAMES_DEFAULT,
};
use fishdash_core::ConfigError;
use fishdash_core::sim::Viewport;

pub const ENV_VIEWPORT_WIDTH: &str = "FISHDASH_VIEWPORT_WIDTH";
pub const ENV_VIEWPORT_HEIGHT: &str = "FISHDASH_VIEWPORT_HEIGHT";
pub const ENV_MAX_FRAMES: &str = "FISHDASH_MAX_FRAMES";

/// Run settings shared by every subcommand. Flags override these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerDefaults {
    pub viewport: Viewport,
    pub max_frames: u32,
}

impl Default for RunnerDefaults {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            max_frames: MAX_FRAMES_DEFAULT,
        }
    }
}

impl RunnerDefaults {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let width = read_env_i32(&lookup, ENV_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_WIDTH);
        let height = read_env_i32(&lookup, ENV_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_HEIGHT);

        let viewport = match Viewport::new(width, height) {
            Ok(viewport) => viewport,
            Err(err) => {
                tracing::warn!(
                    width,
                    height,
                    "{ENV_VIEWPORT_WIDTH}/{ENV_VIEWPORT_HEIGHT} rejected ({err}). Falling back to defaults."
                );
                Viewport::default()
            }
        };

        Self {
            viewport,
            max_frames: read_env_u32(&lookup, ENV_MAX_FRAMES, MAX_FRAMES_DEFAULT),
        }
    }

    /// Applies optional flag overrides on top of these defaults.
    pub fn resolve_viewport(
        &self,
        width: Option<i32>,
        height: Option<i32>,
    ) -> Result<Viewport, ConfigError> {
        if width.is_none() && height.is_none() {
            return Ok(self.viewport);
        }
        Viewport::new(
            width.unwrap_or(self.viewport.width()),
            height.unwrap_or(self.viewport.height()),
        )
    }
}

fn read_env_u32<F>(lookup: &F, name: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn read_env_i32<F>(lookup: &F, name: &str, default: i32) -> i32
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|value| value.trim().parse::<i32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
