// Game window
pub const GAME_WINDOW_TITLE: &str = "Motion Game";
pub const GAME_WINDOW_WIDTH: u32 = 1080;
pub const GAME_WINDOW_HEIGHT: u32 = 720;

pub const BLACK: u32 = 0x000000;
pub const WHITE: u32 = 0xFFFFFF;

pub const PLAYER_X: i32 = 100;
pub const PLAYER_SIZE: i32 = 50;

pub const OBSTACLE_WIDTH: i32 = 40;
pub const OBSTACLE_SPEED: i32 = 5;
pub const SPACE_HEIGHT: i32 = 200;
pub const OBSTACLE_COOLDOWN_MS: u64 = 3_000;

pub const TARGET_FPS: u32 = 60;
/// Upper bound on entity steps applied in one frame after a stall.
pub const MAX_CATCH_UP_TICKS: u32 = 30;
pub const SURVIVAL_TICK_MS: u64 = 100;

pub const SCORE_TEXT_SCALE: usize = 2;
pub const PROMPT_TEXT_SCALE: usize = 6;

// Camera window
pub const CAMERA_WINDOW_TITLE: &str = "Pose Camera";
pub const CAMERA_WINDOW_WIDTH: u32 = 800;
pub const CAMERA_WINDOW_HEIGHT: u32 = 450;
pub const CAMERA_WINDOW_MARGIN: u32 = 150;
pub const CAMERA_INDEX: u32 = 0;

// Pose overlay and control mapping, in preview pixels
pub const UPPER_LIMIT: f32 = 50.0;
pub const LOWER_LIMIT: f32 = 300.0;

pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;

pub const POSE_CONNECTIONS: &[(usize, usize)] = &[
    (11, 12),
    (12, 14),
    (14, 16),
    (11, 13),
    (13, 15),
    (15, 17),
    (12, 24),
    (24, 26),
    (26, 28),
    (11, 23),
    (23, 25),
    (25, 27),
];

/// Size of the game surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arena {
    pub width: i32,
    pub height: i32,
}

impl Arena {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(GAME_WINDOW_WIDTH as i32, GAME_WINDOW_HEIGHT as i32)
    }
}

/// Whether the preview drops `CAMERA_WINDOW_MARGIN` from both sides.
pub const fn crop_preview_margins() -> bool {
    !cfg!(feature = "survival-score")
}

pub fn preview_size() -> (u32, u32) {
    if crop_preview_margins() {
        (
            CAMERA_WINDOW_WIDTH - 2 * CAMERA_WINDOW_MARGIN,
            CAMERA_WINDOW_HEIGHT,
        )
    } else {
        (CAMERA_WINDOW_WIDTH, CAMERA_WINDOW_HEIGHT)
    }
}
