use crate::config::{OBSTACLE_SPEED, WHITE};

/// Axis-aligned rectangle covering pixels `[x, x + w) x [y, y + h)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(cx: i32, cy: i32, w: i32, h: i32) -> Self {
        Self::new(cx - w / 2, cy - h / 2, w, h)
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// True when the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.w > 0
            && self.h > 0
            && other.w > 0
            && other.h > 0
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Obstacle,
    ScoreBox,
}

/// Per-kind rules shared by every entity of that kind.
#[derive(Clone, Copy, Debug)]
pub struct KindRules {
    pub speed: i32,
    pub removed_off_screen: bool,
    pub blocks_player: bool,
    pub color: Option<u32>,
}

const PLAYER_RULES: KindRules = KindRules {
    speed: 0,
    removed_off_screen: false,
    blocks_player: false,
    color: Some(WHITE),
};

const OBSTACLE_RULES: KindRules = KindRules {
    speed: OBSTACLE_SPEED,
    removed_off_screen: true,
    blocks_player: true,
    color: Some(WHITE),
};

const SCORE_BOX_RULES: KindRules = KindRules {
    speed: OBSTACLE_SPEED,
    removed_off_screen: true,
    blocks_player: false,
    color: None,
};

impl EntityKind {
    pub fn rules(self) -> &'static KindRules {
        match self {
            EntityKind::Player => &PLAYER_RULES,
            EntityKind::Obstacle => &OBSTACLE_RULES,
            EntityKind::ScoreBox => &SCORE_BOX_RULES,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub rect: Rect,
}

impl Entity {
    pub fn new(kind: EntityKind, rect: Rect) -> Self {
        Self { kind, rect }
    }

    pub fn step(&mut self, ticks: i32) {
        self.rect.x -= self.kind.rules().speed * ticks;
    }

    pub fn is_off_screen(&self) -> bool {
        self.kind.rules().removed_off_screen && self.rect.right() <= 0
    }

    /// Moves the vertical center; horizontal position never changes.
    pub fn set_center_y(&mut self, cy: i32) {
        self.rect.y = cy - self.rect.h / 2;
    }
}
