use minifb::{KeyRepeat, Window, WindowOptions};

use crate::{
    config::{CAMERA_WINDOW_TITLE, GAME_WINDOW_HEIGHT, GAME_WINDOW_TITLE, GAME_WINDOW_WIDTH},
    error::GameError,
};

use super::canvas::Canvas;

/// Input gathered from both windows since the previous frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputEvents {
    pub quit: bool,
    pub key_pressed: bool,
}

/// Where the loop reads input from and presents its two canvases.
pub trait GameSurface {
    fn poll_input(&mut self) -> InputEvents;

    fn present(&mut self, game: &Canvas, preview: &Canvas) -> Result<(), GameError>;
}

/// The game window and the camera preview window.
pub struct Surfaces {
    game: Window,
    preview: Window,
}

impl Surfaces {
    pub fn open(preview_width: u32, preview_height: u32) -> Result<Self, GameError> {
        let game = open_window(GAME_WINDOW_TITLE, GAME_WINDOW_WIDTH, GAME_WINDOW_HEIGHT)?;
        let preview = open_window(CAMERA_WINDOW_TITLE, preview_width, preview_height)?;
        log::info!(
            "opened windows {GAME_WINDOW_WIDTH}x{GAME_WINDOW_HEIGHT} and {preview_width}x{preview_height}"
        );
        Ok(Self { game, preview })
    }
}

impl GameSurface for Surfaces {
    fn poll_input(&mut self) -> InputEvents {
        let pressed = |window: &Window| !window.get_keys_pressed(KeyRepeat::No).is_empty();
        InputEvents {
            quit: !self.game.is_open() || !self.preview.is_open(),
            key_pressed: pressed(&self.game) || pressed(&self.preview),
        }
    }

    fn present(&mut self, game: &Canvas, preview: &Canvas) -> Result<(), GameError> {
        present_canvas(&mut self.game, game)?;
        present_canvas(&mut self.preview, preview)
    }
}

fn open_window(title: &str, width: u32, height: u32) -> Result<Window, GameError> {
    let mut window = Window::new(
        title,
        width as usize,
        height as usize,
        WindowOptions {
            resize: false,
            ..WindowOptions::default()
        },
    )
    .map_err(|err| GameError::Display(format!("{title}: {err}")))?;

    // The game loop paces frames itself.
    window.set_target_fps(0);
    Ok(window)
}

fn present_canvas(window: &mut Window, canvas: &Canvas) -> Result<(), GameError> {
    window
        .update_with_buffer(canvas.buffer(), canvas.width(), canvas.height())
        .map_err(|err| GameError::Present(err.to_string()))
}
