#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod control;
mod error;
mod game;
mod pipeline;
mod render;
mod types;

use anyhow::Result;

use crate::error::GameError;

fn main() -> Result<()> {
    env_logger::init();

    if let Err(err) = app::launch() {
        if err.is_startup() {
            log::error!("startup failed: {err}");
        } else {
            log::error!("game stopped: {err}");
        }
        if matches!(err, GameError::ModelMissing { .. }) {
            eprintln!("run `cargo run --bin fetch-model` to download the pose model");
        }
        return Err(err.into());
    }

    Ok(())
}
