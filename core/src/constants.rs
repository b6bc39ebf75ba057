// Geometry is integer pixels, origin top-left, y grows downward.

// Player ("fish")
pub const PLAYER_WIDTH: i32 = 100;
pub const PLAYER_HEIGHT: i32 = 88;
pub const PLAYER_SPEED: i32 = 5;

// Scrolling
pub const SCROLL_SPEED: i32 = 5;
pub const BACKGROUND_SPEED: i32 = 2;

// Obstacles
pub const OBSTACLE_WIDTH: i32 = 50;
pub const GAP_SPACING: i32 = 200;
pub const GAP_EXTRA_MIN: i32 = 50;
pub const SPAWN_CADENCE_FRAMES: u32 = 100;

// Pickups (coins)
pub const PICKUP_SIZE: i32 = 30;
pub const PICKUP_OFFSET_X: i32 = 250;

pub const LEADERBOARD_CAPACITY: usize = 3;

// Viewport limits. The upper bound keeps dimensions representable in the tape header.
pub const MIN_VIEWPORT_WIDTH: i32 = 200;
// Tallest gap is GAP_SPACING + GAP_EXTRA_MIN + height / 3 - 1, which must not exceed the height.
pub const MIN_VIEWPORT_HEIGHT: i32 = 375;
pub const MAX_VIEWPORT_DIMENSION: i32 = u16::MAX as i32;
pub const DEFAULT_VIEWPORT_WIDTH: i32 = 1_280;
pub const DEFAULT_VIEWPORT_HEIGHT: i32 = 720;

// Tape format
pub const TAPE_MAGIC: u32 = 0x5054_4446; // "FDTP"
pub const TAPE_VERSION: u8 = 1;
pub const TAPE_HEADER_SIZE: usize = 20;
pub const TAPE_FOOTER_SIZE: usize = 12;

// 5 minutes at 60fps
pub const MAX_FRAMES_DEFAULT: u32 = 18_000;
