//! Pieces shared by the `motion-game` and `fetch-model` binaries.

pub mod model_download;
