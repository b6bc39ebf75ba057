use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCode {
    PlayerBounds,
    PlayerAnchor,
    IdleStateNotEmpty,
    LeaderboardOrder,
    LeaderboardCapacity,
    ObstacleGeometry,
    ObstaclePassedState,
    PickupOrphaned,
    GapIdOrder,
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerBounds => write!(f, "PLAYER_BOUNDS"),
            Self::PlayerAnchor => write!(f, "PLAYER_ANCHOR"),
            Self::IdleStateNotEmpty => write!(f, "IDLE_STATE_NOT_EMPTY"),
            Self::LeaderboardOrder => write!(f, "LEADERBOARD_ORDER"),
            Self::LeaderboardCapacity => write!(f, "LEADERBOARD_CAPACITY"),
            Self::ObstacleGeometry => write!(f, "OBSTACLE_GEOMETRY"),
            Self::ObstaclePassedState => write!(f, "OBSTACLE_PASSED_STATE"),
            Self::PickupOrphaned => write!(f, "PICKUP_ORPHANED"),
            Self::GapIdOrder => write!(f, "GAP_ID_ORDER"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    ViewportTooSmall { width: i32, height: i32 },
    ViewportTooLarge { width: i32, height: i32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViewportTooSmall { width, height } => {
                write!(f, "viewport too small: {width}x{height}")
            }
            Self::ViewportTooLarge { width, height } => {
                write!(f, "viewport too large: {width}x{height}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure reported by an audio collaborator. Never affects the simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CueError {
    Unavailable,
    Playback(String),
}

impl fmt::Display for CueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "audio output unavailable"),
            Self::Playback(reason) => write!(f, "cue playback failed: {reason}"),
        }
    }
}

impl std::error::Error for CueError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TapeError {
    TapeTooShort { actual: usize, min: usize },
    InvalidMagic { found: u32 },
    UnsupportedVersion { found: u8 },
    HeaderReservedNonZero,
    InvalidViewport(ConfigError),
    FrameCountOutOfRange { frame_count: u32, max_frames: u32 },
    TapeLengthMismatch { expected: usize, actual: usize },
    InvalidInputByte { frame: u32, byte: u8 },
    CrcMismatch { stored: u32, computed: u32 },
    RuleViolation { frame: u32, rule: RuleCode },
    InputAfterGameOver { frame: u32 },
    FrameCountMismatch { claimed: u32, computed: u32 },
    ScoreMismatch { claimed: u32, computed: u32 },
    CoinMismatch { claimed: u32, computed: u32 },
}

impl fmt::Display for TapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TapeTooShort { actual, min } => {
                write!(f, "tape too short: got {actual} bytes, need at least {min}")
            }
            Self::InvalidMagic { found } => write!(f, "invalid tape magic: 0x{found:08x}"),
            Self::UnsupportedVersion { found } => write!(f, "unsupported tape version: {found}"),
            Self::HeaderReservedNonZero => write!(f, "header reserved bytes are non-zero"),
            Self::InvalidViewport(err) => write!(f, "invalid tape viewport: {err}"),
            Self::FrameCountOutOfRange {
                frame_count,
                max_frames,
            } => write!(
                f,
                "frame count out of range: {frame_count} (allowed 1..={max_frames})"
            ),
            Self::TapeLengthMismatch { expected, actual } => write!(
                f,
                "tape length mismatch: expected {expected} bytes, got {actual}"
            ),
            Self::InvalidInputByte { frame, byte } => {
                write!(f, "invalid input byte at frame {frame}: 0x{byte:02x}")
            }
            Self::CrcMismatch { stored, computed } => write!(
                f,
                "crc mismatch: stored=0x{stored:08x}, computed=0x{computed:08x}"
            ),
            Self::RuleViolation { frame, rule } => {
                write!(f, "rule violation at frame {frame}: {rule}")
            }
            Self::InputAfterGameOver { frame } => {
                write!(f, "tape continues after the run ended at frame {frame}")
            }
            Self::FrameCountMismatch { claimed, computed } => {
                write!(
                    f,
                    "frame-count mismatch: claimed={claimed}, computed={computed}"
                )
            }
            Self::ScoreMismatch { claimed, computed } => {
                write!(f, "score mismatch: claimed={claimed}, computed={computed}")
            }
            Self::CoinMismatch { claimed, computed } => {
                write!(f, "coin mismatch: claimed={claimed}, computed={computed}")
            }
        }
    }
}

impl std::error::Error for TapeError {}
