use crate::config::{Arena, OBSTACLE_WIDTH};

use super::entity::{Entity, EntityKind, Rect};

/// Scrolling obstacles and score boxes. The player is owned by the session.
#[derive(Debug, Default)]
pub struct World {
    entities: Vec<Entity>,
    spawn_score_boxes: bool,
}

impl World {
    pub fn new(spawn_score_boxes: bool) -> Self {
        Self {
            entities: Vec::new(),
            spawn_score_boxes,
        }
    }

    pub fn spawn_obstacle_pair(&mut self, gap_y: i32, gap_height: i32, arena: Arena) {
        let gap_height = gap_height.clamp(0, arena.height);
        let gap_y = gap_y.clamp(0, arena.height - gap_height);
        let x = arena.width;

        if self.spawn_score_boxes {
            self.entities.push(Entity::new(
                EntityKind::ScoreBox,
                Rect::new(x, gap_y, OBSTACLE_WIDTH, gap_height),
            ));
        }

        self.entities.push(Entity::new(
            EntityKind::Obstacle,
            Rect::new(x, 0, OBSTACLE_WIDTH, gap_y),
        ));
        let lower_y = gap_y + gap_height;
        self.entities.push(Entity::new(
            EntityKind::Obstacle,
            Rect::new(x, lower_y, OBSTACLE_WIDTH, arena.height - lower_y),
        ));
    }

    pub fn advance(&mut self, dt_ticks: u32) {
        let ticks = dt_ticks as i32;
        for entity in &mut self.entities {
            entity.step(ticks);
        }
        self.entities.retain(|entity| !entity.is_off_screen());
    }

    pub fn collides(&self, player: &Rect) -> bool {
        self.entities
            .iter()
            .any(|entity| entity.kind.rules().blocks_player && entity.rect.overlaps(player))
    }

    pub fn consume_score_boxes(&mut self, player: &Rect) -> u32 {
        let before = self.entities.len();
        self.entities.retain(|entity| {
            !(entity.kind == EntityKind::ScoreBox && entity.rect.overlaps(player))
        });
        (before - self.entities.len()) as u32
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Entity> {
        self.of_kind(EntityKind::Obstacle)
    }

    pub fn score_boxes(&self) -> impl Iterator<Item = &Entity> {
        self.of_kind(EntityKind::ScoreBox)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |entity| entity.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OBSTACLE_SPEED, SPACE_HEIGHT};

    const ARENA: Arena = Arena::new(1080, 720);

    #[test]
    fn pair_tiles_the_arena_height() {
        for gap_y in [0, 1, 100, 259, ARENA.height - SPACE_HEIGHT] {
            let mut world = World::new(true);
            world.spawn_obstacle_pair(gap_y, SPACE_HEIGHT, ARENA);

            let obstacles: Vec<_> = world.obstacles().map(|e| e.rect).collect();
            let gap = world.score_boxes().next().unwrap().rect;
            assert_eq!(obstacles.len(), 2);

            let (upper, lower) = (obstacles[0], obstacles[1]);
            assert_eq!(upper.y, 0);
            assert_eq!(upper.h, gap_y);
            assert_eq!(lower.h, ARENA.height - gap_y - SPACE_HEIGHT);
            assert_eq!(upper.bottom(), gap.y);
            assert_eq!(gap.bottom(), lower.y);
            assert_eq!(lower.bottom(), ARENA.height);
            assert!(world.entities().iter().all(|e| e.rect.x == ARENA.width));
        }
    }

    #[test]
    fn scenario_gap_at_100() {
        let mut world = World::new(true);
        world.spawn_obstacle_pair(100, 200, ARENA);
        let heights: Vec<_> = world.obstacles().map(|e| e.rect.h).collect();
        assert_eq!(heights, vec![100, 420]);
    }

    #[test]
    fn gap_offset_is_clamped_into_the_arena() {
        let mut world = World::new(false);
        world.spawn_obstacle_pair(700, SPACE_HEIGHT, ARENA);
        let lower = world.obstacles().nth(1).unwrap().rect;
        assert_eq!(lower.h, 0);
        assert_eq!(world.score_boxes().count(), 0);
    }

    #[test]
    fn removed_after_expected_ticks() {
        let mut world = World::new(true);
        world.spawn_obstacle_pair(100, SPACE_HEIGHT, ARENA);

        let travel = ARENA.width + OBSTACLE_WIDTH;
        let expected = (travel + OBSTACLE_SPEED - 1) / OBSTACLE_SPEED;

        let mut ticks = 0;
        while !world.is_empty() {
            world.advance(1);
            ticks += 1;
            assert!(ticks <= expected, "entities outlived {expected} ticks");
        }
        assert_eq!(ticks, expected);
    }

    #[test]
    fn multi_tick_advance_matches_single_steps() {
        let mut stepped = World::new(false);
        let mut jumped = World::new(false);
        stepped.spawn_obstacle_pair(50, SPACE_HEIGHT, ARENA);
        jumped.spawn_obstacle_pair(50, SPACE_HEIGHT, ARENA);

        for _ in 0..7 {
            stepped.advance(1);
        }
        jumped.advance(7);
        assert_eq!(stepped.entities(), jumped.entities());
    }

    #[test]
    fn collides_only_with_obstacles() {
        let mut world = World::new(true);
        world.spawn_obstacle_pair(100, SPACE_HEIGHT, ARENA);
        world.advance(200);

        let in_gap = Rect::from_center(100, 150, 50, 50);
        let in_upper = Rect::from_center(100, 60, 50, 50);
        let obstacle_x = world.obstacles().next().unwrap().rect.x;
        assert!(obstacle_x < in_gap.right());
        assert!(!world.collides(&in_gap));
        assert!(world.collides(&in_upper));
    }

    #[test]
    fn consuming_removes_score_boxes() {
        let mut world = World::new(true);
        world.spawn_obstacle_pair(100, SPACE_HEIGHT, ARENA);
        let player = Rect::from_center(100, 150, 50, 50);

        assert_eq!(world.consume_score_boxes(&player), 0);
        world.advance(200);
        assert_eq!(world.consume_score_boxes(&player), 1);
        assert_eq!(world.score_boxes().count(), 0);
        assert_eq!(world.obstacles().count(), 2);
        assert_eq!(world.consume_score_boxes(&player), 0);
    }
}
