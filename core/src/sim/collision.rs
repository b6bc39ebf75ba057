//! Collision detection. Everything here is a pure query over entity geometry;
//! the game applies the consequences.

use super::{Obstacle, Pickup, Player};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Collisions {
    /// Indices into the obstacle list whose solid parts overlap the player.
    pub obstacles: Vec<usize>,
    /// Indices into the pickup list of uncollected pickups touching the player.
    pub pickups: Vec<usize>,
}

impl Collisions {
    #[inline]
    pub fn crashed(&self) -> bool {
        !self.obstacles.is_empty()
    }
}

#[inline]
fn overlaps_horizontally(player: &Player, x: i32, width: i32) -> bool {
    player.x < x + width && player.x + player.width > x
}

/// True when the player overlaps the column horizontally and is not fully inside its open band.
#[inline]
pub fn hits_obstacle(player: &Player, obstacle: &Obstacle) -> bool {
    overlaps_horizontally(player, obstacle.x, obstacle.width)
        && (player.y < obstacle.gap_y || player.y + player.height > obstacle.gap_bottom())
}

/// Strict AABB overlap against a pickup that has not been collected yet.
#[inline]
pub fn touches_pickup(player: &Player, pickup: &Pickup) -> bool {
    !pickup.collected
        && overlaps_horizontally(player, pickup.x, pickup.width)
        && player.y < pickup.y + pickup.height
        && player.y + player.height > pickup.y
}

pub fn detect(player: &Player, obstacles: &[Obstacle], pickups: &[Pickup]) -> Collisions {
    Collisions {
        obstacles: obstacles
            .iter()
            .enumerate()
            .filter(|(_, obstacle)| hits_obstacle(player, obstacle))
            .map(|(index, _)| index)
            .collect(),
        pickups: pickups
            .iter()
            .enumerate()
            .filter(|(_, pickup)| touches_pickup(player, pickup))
            .map(|(index, _)| index)
            .collect(),
    }
}
