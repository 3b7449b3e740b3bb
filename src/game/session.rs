use rand::{Rng, rngs::StdRng};

use crate::config::{
    Arena, MAX_CATCH_UP_TICKS, OBSTACLE_COOLDOWN_MS, PLAYER_SIZE, PLAYER_X, SPACE_HEIGHT,
    TARGET_FPS,
};

use super::{
    entity::{Entity, EntityKind, Rect},
    scoring::{ScoringStrategy, TickContext},
    world::World,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    NotStarted,
    Running,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Idle,
    Running { ticks: u32 },
    Crashed,
}

pub struct Session {
    arena: Arena,
    player: Entity,
    world: World,
    scoring: Box<dyn ScoringStrategy>,
    rng: StdRng,
    state: GameState,
    current_score: u32,
    best_score: u32,
    last_spawn_ms: u64,
    last_update_ms: u64,
    // Elapsed time not yet turned into ticks, in ms * TARGET_FPS.
    tick_carry: u64,
}

impl Session {
    pub fn new(arena: Arena, scoring: Box<dyn ScoringStrategy>, rng: StdRng, now_ms: u64) -> Self {
        let world = World::new(scoring.spawns_score_boxes());
        let player = Entity::new(
            EntityKind::Player,
            Rect::from_center(PLAYER_X, arena.height / 2, PLAYER_SIZE, PLAYER_SIZE),
        );

        Self {
            arena,
            player,
            world,
            scoring,
            rng,
            state: GameState::NotStarted,
            current_score: 0,
            best_score: 0,
            last_spawn_ms: now_ms,
            last_update_ms: now_ms,
            tick_carry: 0,
        }
    }

    /// Begins a run. Returns false if one is already in progress.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.state == GameState::Running {
            return false;
        }

        self.world.clear();
        self.current_score = 0;
        self.scoring.on_run_start(now_ms);
        self.last_update_ms = now_ms;
        self.tick_carry = 0;
        self.state = GameState::Running;
        log::info!("run started ({} scoring)", self.scoring.name());
        true
    }

    pub fn update(&mut self, now_ms: u64, signal: f32) -> UpdateOutcome {
        self.place_player(signal);

        if self.state != GameState::Running {
            self.last_update_ms = now_ms;
            return UpdateOutcome::Idle;
        }

        if now_ms.saturating_sub(self.last_spawn_ms) >= OBSTACLE_COOLDOWN_MS {
            let gap_y = self
                .rng
                .gen_range(0..=(self.arena.height - SPACE_HEIGHT).max(0));
            self.world
                .spawn_obstacle_pair(gap_y, SPACE_HEIGHT, self.arena);
            self.last_spawn_ms = now_ms;
            log::debug!("spawned obstacle pair with gap at y={gap_y}");
        }

        let ticks = self.take_ticks(now_ms);
        for _ in 0..ticks {
            if self.step(now_ms) == GameState::NotStarted {
                return UpdateOutcome::Crashed;
            }
        }

        UpdateOutcome::Running { ticks }
    }

    fn step(&mut self, now_ms: u64) -> GameState {
        self.world.advance(1);

        if self.world.collides(&self.player.rect) {
            log::info!(
                "crashed with score {} (best {})",
                self.current_score,
                self.best_score
            );
            self.current_score = 0;
            self.state = GameState::NotStarted;
            return self.state;
        }

        let consumed = self.world.consume_score_boxes(&self.player.rect);
        let score = self.scoring.on_tick(&TickContext {
            now_ms,
            current_score: self.current_score,
            consumed_score_boxes: consumed,
        });
        if score != self.current_score {
            log::debug!("score {} -> {score}", self.current_score);
        }
        self.current_score = score;
        self.best_score = self.best_score.max(self.current_score);
        self.state
    }

    fn take_ticks(&mut self, now_ms: u64) -> u32 {
        let elapsed = now_ms.saturating_sub(self.last_update_ms);
        self.last_update_ms = now_ms;

        self.tick_carry += elapsed * TARGET_FPS as u64;
        let ticks = self.tick_carry / 1_000;
        self.tick_carry %= 1_000;

        if ticks > MAX_CATCH_UP_TICKS as u64 {
            log::warn!("loop stalled for {elapsed} ms, dropping {ticks} ticks to {MAX_CATCH_UP_TICKS}");
            self.tick_carry = 0;
            return MAX_CATCH_UP_TICKS;
        }
        ticks as u32
    }

    fn place_player(&mut self, signal: f32) {
        let cy = (signal.clamp(0.0, 1.0) * self.arena.height as f32).round() as i32;
        self.player.set_center_y(cy);
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn current_score(&self) -> u32 {
        self.current_score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    #[cfg(test)]
    fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::game::scoring::{ScoreBoxScoring, SurvivalScoring};

    const ARENA: Arena = Arena::new(1080, 720);
    const FRAME_MS: u64 = 50; // three ticks per update

    fn session(scoring: Box<dyn ScoringStrategy>) -> Session {
        Session::new(ARENA, scoring, StdRng::seed_from_u64(7), 0)
    }

    fn signal_for(y: i32) -> f32 {
        y as f32 / ARENA.height as f32
    }

    #[test]
    fn idle_until_started() {
        let mut session = session(Box::new(ScoreBoxScoring));
        assert_eq!(session.update(10_000, 0.5), UpdateOutcome::Idle);
        assert!(session.world().is_empty());
        assert_eq!(session.player().rect.y, 360 - PLAYER_SIZE / 2);
    }

    #[test]
    fn start_is_ignored_while_running() {
        let mut session = session(Box::new(ScoreBoxScoring));
        assert!(session.start(0));
        assert!(!session.start(10));
        assert_eq!(session.state(), GameState::Running);
    }

    #[test]
    fn spawns_after_cooldown() {
        let mut session = session(Box::new(ScoreBoxScoring));
        session.start(0);
        session.update(OBSTACLE_COOLDOWN_MS - 1, signal_for(360));
        assert!(session.world().is_empty());

        session.update(OBSTACLE_COOLDOWN_MS, signal_for(360));
        assert_eq!(session.world().obstacles().count(), 2);
        assert_eq!(session.world().score_boxes().count(), 1);

        session.update(OBSTACLE_COOLDOWN_MS + 1_000, signal_for(360));
        assert_eq!(session.world().obstacles().count(), 2);
    }

    #[test]
    fn score_box_scenario() {
        let mut session = session(Box::new(ScoreBoxScoring));
        session.start(0);
        session.world_mut().spawn_obstacle_pair(100, 200, ARENA);

        let heights: Vec<_> = session.world().obstacles().map(|e| e.rect.h).collect();
        assert_eq!(heights, vec![100, 420]);

        let signal = signal_for(150);
        let player_right = session.player().rect.right();
        let mut now = 0;
        while session.current_score() == 0 {
            now += FRAME_MS;
            assert!(now < 2 * OBSTACLE_COOLDOWN_MS, "score box never reached the player");
            session.update(now, signal);
            assert_eq!(session.state(), GameState::Running);
        }
        assert_eq!(session.current_score(), 1);
        assert_eq!(session.best_score(), 1);
        assert!(
            session
                .world()
                .score_boxes()
                .all(|score_box| score_box.rect.x >= player_right)
        );
    }

    #[test]
    fn survival_scenario() {
        let t0 = 1_000;
        let mut session = session(Box::new(SurvivalScoring::new(100)));
        session.update(t0, 0.5);
        session.start(t0);
        session.update(t0 + 500, 0.5);
        assert_eq!(session.current_score(), 5);
        assert_eq!(session.world().score_boxes().count(), 0);
    }

    #[test]
    fn crash_resets_score_and_keeps_best() {
        let mut session = session(Box::new(ScoreBoxScoring));
        session.start(0);
        session.world_mut().spawn_obstacle_pair(100, 200, ARENA);

        let mut now = 0;
        while session.current_score() == 0 {
            now += FRAME_MS;
            session.update(now, signal_for(150));
        }

        // Second pair with the gap far away from the player.
        session.world_mut().spawn_obstacle_pair(500, 200, ARENA);
        let outcome = loop {
            now += FRAME_MS;
            let outcome = session.update(now, signal_for(150));
            if outcome != (UpdateOutcome::Running { ticks: 3 }) {
                break outcome;
            }
        };

        assert_eq!(outcome, UpdateOutcome::Crashed);
        assert_eq!(session.state(), GameState::NotStarted);
        assert_eq!(session.current_score(), 0);
        assert!(session.best_score() >= 1);
    }

    #[test]
    fn restart_clears_entities_and_keeps_best() {
        let mut session = session(Box::new(SurvivalScoring::new(100)));
        session.start(0);
        session.update(OBSTACLE_COOLDOWN_MS, 0.0);
        assert!(!session.world().is_empty());
        let best = session.best_score();
        assert!(best > 0);

        session.state = GameState::NotStarted;
        session.start(OBSTACLE_COOLDOWN_MS + 10);
        assert!(session.world().is_empty());
        assert_eq!(session.current_score(), 0);
        assert_eq!(session.best_score(), best);

        session.update(OBSTACLE_COOLDOWN_MS + 210, 0.0);
        assert_eq!(session.current_score(), 2);
    }

    #[test]
    fn ticks_carry_fractional_time() {
        let mut session = session(Box::new(ScoreBoxScoring));
        session.start(0);
        let mut total = 0;
        for frame in 1..=60u64 {
            if let UpdateOutcome::Running { ticks } = session.update(frame * 1_000 / 60, 0.5) {
                total += ticks;
            }
        }
        assert_eq!(total, 60);
    }

    #[test]
    fn stalls_are_capped() {
        let mut session = session(Box::new(ScoreBoxScoring));
        session.start(0);
        assert_eq!(
            session.update(2_000, 0.5),
            UpdateOutcome::Running {
                ticks: MAX_CATCH_UP_TICKS
            }
        );
    }

    #[test]
    fn player_tracks_signal_within_arena() {
        let mut session = session(Box::new(ScoreBoxScoring));
        session.update(0, 0.0);
        assert_eq!(session.player().rect.y, -PLAYER_SIZE / 2);
        session.update(0, 1.0);
        assert_eq!(session.player().rect.y, ARENA.height - PLAYER_SIZE / 2);
        session.update(0, 3.0);
        assert_eq!(session.player().rect.y, ARENA.height - PLAYER_SIZE / 2);
        assert_eq!(session.player().rect.x, PLAYER_X - PLAYER_SIZE / 2);
    }
}
