//! The game loop: input, pose, update, render, present, pace.

use std::{
    thread,
    time::{Duration, Instant},
};

use motion_game::model_download::{default_pose_model_path, is_model_present};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::{Arena, CAMERA_INDEX, TARGET_FPS, crop_preview_margins, preview_size},
    error::GameError,
    game::{Session, default_strategy},
    pipeline::{OrtPoseEngine, PoseEngine, PoseSource, open_camera},
    render::{Canvas, GameSurface, Surfaces, game_view},
};

/// Opens every resource the game needs, then runs until quit or end of stream.
pub fn launch() -> Result<(), GameError> {
    let model_path = default_pose_model_path();
    if !is_model_present(&model_path) {
        return Err(GameError::ModelMissing { path: model_path });
    }
    let engine =
        OrtPoseEngine::new(&model_path).map_err(|err| GameError::Model(format!("{err:#}")))?;
    let camera = open_camera(CAMERA_INDEX).map_err(|err| GameError::Camera(format!("{err:#}")))?;
    let pose_source = PoseSource::new(camera, engine, crop_preview_margins());

    let (preview_w, preview_h) = preview_size();
    let surfaces = Surfaces::open(preview_w, preview_h)?;

    let session = Session::new(
        Arena::default(),
        default_strategy(),
        StdRng::from_entropy(),
        0,
    );

    GameLoop::new(pose_source, session, surfaces).run()
}

pub struct GameLoop<E: PoseEngine, S: GameSurface> {
    pose_source: PoseSource<E>,
    session: Session,
    surfaces: S,
    game_canvas: Canvas,
    preview_canvas: Canvas,
    clock: FrameClock,
    origin: Instant,
}

impl<E: PoseEngine, S: GameSurface> GameLoop<E, S> {
    pub fn new(pose_source: PoseSource<E>, session: Session, surfaces: S) -> Self {
        let arena = session.arena();
        let (preview_w, preview_h) = preview_size();
        Self {
            pose_source,
            session,
            surfaces,
            game_canvas: Canvas::new(arena.width as usize, arena.height as usize),
            preview_canvas: Canvas::new(preview_w as usize, preview_h as usize),
            clock: FrameClock::new(TARGET_FPS),
            origin: Instant::now(),
        }
    }

    pub fn run(mut self) -> Result<(), GameError> {
        let mut running = true;

        while running {
            let input = self.surfaces.poll_input();
            if input.quit {
                log::info!("window closed, shutting down");
                running = false;
            }
            if input.key_pressed {
                self.session.start(self.now_ms());
            }

            let control = match self.pose_source.next_control_signal() {
                Ok(control) => control,
                Err(err) => {
                    log::warn!("{err}");
                    break;
                }
            };

            self.session.update(self.now_ms(), control.signal);

            game_view::draw(&mut self.game_canvas, &self.session);
            self.preview_canvas.blit_rgba(&control.preview);
            self.surfaces
                .present(&self.game_canvas, &self.preview_canvas)?;

            self.clock.wait();
        }

        log::info!("session over, best score {}", self.session.best_score());
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Fixed-rate pacing; a late frame moves the schedule instead of bursting to catch up.
pub struct FrameClock {
    period: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        let period = Duration::from_secs(1) / fps.max(1);
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    pub fn wait(&mut self) {
        let delay = self.advance(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    /// How long to sleep at `now`, moving the deadline forward one period.
    fn advance(&mut self, now: Instant) -> Duration {
        let delay = self.next.saturating_duration_since(now);
        self.next = if delay.is_zero() {
            now + self.period
        } else {
            self.next + self.period
        };
        delay
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use anyhow::{Result, anyhow};
    use ndarray::Array4;

    use super::*;
    use crate::{
        config::WHITE,
        game::scoring::ScoreBoxScoring,
        pipeline::{camera::FrameSource, pose::RawPose},
        render::surfaces::InputEvents,
        types::Frame,
    };

    struct FiniteCamera {
        frames_left: usize,
    }

    impl FrameSource for FiniteCamera {
        fn next_frame(&mut self) -> Result<Frame> {
            if self.frames_left == 0 {
                return Err(anyhow!("stream closed"));
            }
            self.frames_left -= 1;
            Ok(Frame::new(vec![90; Frame::expected_len(320, 180)], 320, 180))
        }
    }

    struct NoPose;

    impl PoseEngine for NoPose {
        fn infer(&mut self, _input: Array4<f32>) -> Result<RawPose> {
            Ok(RawPose {
                landmarks: Vec::new(),
                confidence: 0.0,
            })
        }
    }

    /// Scripted input; records whether the player was on screen at each present.
    struct FakeSurface {
        polls: usize,
        key_on_poll: Option<usize>,
        quit_on_poll: Option<usize>,
        presented: Rc<RefCell<Vec<bool>>>,
    }

    impl GameSurface for FakeSurface {
        fn poll_input(&mut self) -> InputEvents {
            self.polls += 1;
            InputEvents {
                quit: self.quit_on_poll == Some(self.polls),
                key_pressed: self.key_on_poll == Some(self.polls),
            }
        }

        fn present(&mut self, game: &Canvas, preview: &Canvas) -> Result<(), GameError> {
            assert_eq!((preview.width() as u32, preview.height() as u32), preview_size());
            self.presented
                .borrow_mut()
                .push(game.pixel(100, 360) == Some(WHITE));
            Ok(())
        }
    }

    fn game_loop(
        frames: usize,
        key_on_poll: Option<usize>,
        quit_on_poll: Option<usize>,
    ) -> (GameLoop<NoPose, FakeSurface>, Rc<RefCell<Vec<bool>>>) {
        let presented = Rc::new(RefCell::new(Vec::new()));
        let pose_source = PoseSource::new(
            Box::new(FiniteCamera {
                frames_left: frames,
            }),
            NoPose,
            crop_preview_margins(),
        );
        let session = Session::new(
            Arena::default(),
            Box::new(ScoreBoxScoring),
            StdRng::seed_from_u64(3),
            0,
        );
        let surface = FakeSurface {
            polls: 0,
            key_on_poll,
            quit_on_poll,
            presented: Rc::clone(&presented),
        };
        (GameLoop::new(pose_source, session, surface), presented)
    }

    #[test]
    fn end_of_stream_stops_cleanly_after_last_frame() {
        let (game, presented) = game_loop(3, Some(1), None);
        assert!(game.run().is_ok());
        // The key on the first poll starts the run before that frame is drawn.
        assert_eq!(*presented.borrow(), vec![true, true, true]);
    }

    #[test]
    fn quit_finishes_the_current_frame() {
        let (game, presented) = game_loop(10, None, Some(2));
        assert!(game.run().is_ok());
        assert_eq!(*presented.borrow(), vec![false, false]);
    }

    #[test]
    fn closed_stream_presents_nothing() {
        let (game, presented) = game_loop(0, Some(1), None);
        assert!(game.run().is_ok());
        assert!(presented.borrow().is_empty());
    }

    #[test]
    fn clock_sleeps_until_deadline() {
        let mut clock = FrameClock::new(60);
        let start = clock.next - clock.period;
        let delay = clock.advance(start + Duration::from_millis(4));
        assert_eq!(delay, clock.period - Duration::from_millis(4));
        assert_eq!(clock.next, start + clock.period * 2);
    }

    #[test]
    fn late_frame_does_not_burst() {
        let mut clock = FrameClock::new(60);
        let late = clock.next + Duration::from_millis(100);
        assert!(clock.advance(late).is_zero());
        assert_eq!(clock.next, late + clock.period);
    }
}
