pub mod canvas;
pub mod font;
pub mod game_view;
pub mod surfaces;

pub use canvas::Canvas;
pub use surfaces::{GameSurface, Surfaces};
