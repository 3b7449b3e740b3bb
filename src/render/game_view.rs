use crate::{
    config::{BLACK, PROMPT_TEXT_SCALE, SCORE_TEXT_SCALE, WHITE},
    game::{GameState, Session},
};

use super::canvas::Canvas;

pub const START_PROMPT: &str = "Press any key to start";

pub fn draw(canvas: &mut Canvas, session: &Session) {
    canvas.clear(BLACK);
    match session.state() {
        GameState::NotStarted => draw_start_screen(canvas),
        GameState::Running => draw_game_screen(canvas, session),
    }
}

fn draw_game_screen(canvas: &mut Canvas, session: &Session) {
    let player = session.player();
    if let Some(color) = player.kind.rules().color {
        canvas.fill_rect(&player.rect, color);
    }

    for entity in session.world().entities() {
        if let Some(color) = entity.kind.rules().color {
            canvas.fill_rect(&entity.rect, color);
        }
    }

    let current = format!("Your Score: {}", session.current_score());
    canvas.draw_text(&current, 20, 20, SCORE_TEXT_SCALE, WHITE);
    let best = format!("Best Score: {}", session.best_score());
    canvas.draw_text(&best, 20, 50, SCORE_TEXT_SCALE, WHITE);
}

fn draw_start_screen(canvas: &mut Canvas) {
    let text_w = Canvas::text_width(START_PROMPT, PROMPT_TEXT_SCALE) as i32;
    let text_h = Canvas::text_height(PROMPT_TEXT_SCALE) as i32;
    let x = (canvas.width() as i32 - text_w) / 2;
    let y = (canvas.height() as i32 - text_h) / 2;
    canvas.draw_text(START_PROMPT, x, y, PROMPT_TEXT_SCALE, WHITE);
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{config::Arena, game::scoring::ScoreBoxScoring};

    fn session() -> Session {
        Session::new(
            Arena::default(),
            Box::new(ScoreBoxScoring),
            StdRng::seed_from_u64(1),
            0,
        )
    }

    fn lit_pixels(canvas: &Canvas) -> usize {
        canvas.buffer().iter().filter(|&&px| px != BLACK).count()
    }

    #[test]
    fn start_screen_prompt_is_centred() {
        let arena = Arena::default();
        let mut canvas = Canvas::new(arena.width as usize, arena.height as usize);
        draw(&mut canvas, &session());

        assert!(lit_pixels(&canvas) > 0);
        // Nothing but the prompt: corners and the player's column stay dark.
        assert_eq!(canvas.pixel(100, 360), Some(BLACK));
        assert_eq!(canvas.pixel(0, 0), Some(BLACK));
    }

    #[test]
    fn running_screen_shows_player() {
        let arena = Arena::default();
        let mut canvas = Canvas::new(arena.width as usize, arena.height as usize);
        let mut session = session();
        session.start(0);
        session.update(0, 0.5);
        draw(&mut canvas, &session);

        assert_eq!(canvas.pixel(100, 360), Some(WHITE));
        assert_eq!(canvas.pixel(500, 360), Some(BLACK));
    }
}
