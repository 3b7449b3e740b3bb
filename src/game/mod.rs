pub mod entity;
pub mod scoring;
pub mod session;
pub mod world;

pub use entity::Rect;
pub use scoring::default_strategy;
pub use session::{GameState, Session};
