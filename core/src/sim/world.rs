use crate::constants::{
    BACKGROUND_SPEED, GAP_EXTRA_MIN, GAP_SPACING, OBSTACLE_WIDTH, PICKUP_OFFSET_X, PICKUP_SIZE,
    PLAYER_SPEED, SCROLL_SPEED,
};
use crate::rng::SeededRng;
use crate::tape::FrameInput;

use super::{Obstacle, Pickup, Player, Viewport};

const OBSTACLE_VEC_CAPACITY: usize = 16;
const PICKUP_VEC_CAPACITY: usize = 16;

/// Entity store: the player plus the scrolling obstacle and pickup collections.
#[derive(Clone, Debug)]
pub(super) struct World {
    pub(super) viewport: Viewport,
    pub(super) player: Player,
    pub(super) obstacles: Vec<Obstacle>,
    pub(super) pickups: Vec<Pickup>,
    pub(super) background_x: i32,
    pub(super) next_gap_id: u32,
}

impl World {
    pub(super) fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            player: Player::centered(viewport),
            obstacles: Vec::with_capacity(OBSTACLE_VEC_CAPACITY),
            pickups: Vec::with_capacity(PICKUP_VEC_CAPACITY),
            background_x: 0,
            next_gap_id: 0,
        }
    }

    pub(super) fn reset(&mut self) {
        self.player = Player::centered(self.viewport);
        self.obstacles.clear();
        self.pickups.clear();
        self.background_x = 0;
        self.next_gap_id = 0;
    }

    pub(super) fn advance(&mut self, input: FrameInput) {
        self.scroll_background();
        self.move_player(input);
        self.scroll_entities();
    }

    fn scroll_background(&mut self) {
        self.background_x -= BACKGROUND_SPEED;
        if self.background_x <= -self.viewport.width() {
            self.background_x = 0;
        }
    }

    fn move_player(&mut self, input: FrameInput) {
        self.player.dy = match input {
            FrameInput::Up => -PLAYER_SPEED,
            FrameInput::Down => PLAYER_SPEED,
            FrameInput::None => 0,
        };
        self.player.y =
            (self.player.y + self.player.dy).clamp(0, self.viewport.player_max_y());
    }

    fn scroll_entities(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.x -= SCROLL_SPEED;
        }
        for pickup in &mut self.pickups {
            pickup.x -= SCROLL_SPEED;
        }

        self.obstacles
            .retain(|obstacle| obstacle.x + obstacle.width > 0);
        self.pickups
            .retain(|pickup| pickup.x + pickup.width > 0 && !pickup.collected);
    }

    /// Appends one obstacle at the right edge and its pickup further right, centered in the gap.
    pub(super) fn spawn_gap(&mut self, rng: &mut SeededRng) -> u32 {
        let height = self.viewport.height();
        let extra = rng.next_range(GAP_EXTRA_MIN, GAP_EXTRA_MIN + height / 3);
        let gap_height = GAP_SPACING + extra;
        let gap_y = rng.next_range(0, height - gap_height);

        let id = self.next_gap_id;
        self.next_gap_id = self.next_gap_id.wrapping_add(1);

        self.obstacles.push(Obstacle {
            id,
            x: self.viewport.width(),
            width: OBSTACLE_WIDTH,
            gap_y,
            gap_height,
            passed: false,
        });
        self.pickups.push(Pickup {
            gap_id: id,
            x: self.viewport.width() + PICKUP_OFFSET_X,
            y: gap_y + gap_height / 2 - PICKUP_SIZE / 2,
            width: PICKUP_SIZE,
            height: PICKUP_SIZE,
            collected: false,
        });

        id
    }

    /// Marks obstacles whose right edge is now strictly left of the player. Returns how many.
    pub(super) fn mark_passed(&mut self) -> u32 {
        let player_x = self.player.x;
        let mut passed = 0;
        for obstacle in &mut self.obstacles {
            if !obstacle.passed && obstacle.x + obstacle.width < player_x {
                obstacle.passed = true;
                passed += 1;
            }
        }
        passed
    }

    /// Flags the given pickups collected. Returns how many changed state.
    pub(super) fn collect(&mut self, indices: &[usize]) -> u32 {
        let mut collected = 0;
        for index in indices {
            if let Some(pickup) = self.pickups.get_mut(*index) {
                if !pickup.collected {
                    pickup.collected = true;
                    collected += 1;
                }
            }
        }
        collected
    }
}
