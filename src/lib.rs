#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod difficulty;
pub mod error;
pub mod game;
pub mod session;
pub mod stats;

pub use app::Minesweeper;
pub use error::{Error, Result};
