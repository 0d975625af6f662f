//! ITk production database Terminal User Interface
//!
//! Login, the user's profile, the institution browser and the stage reorder
//! screen, all driven from one event loop in [`App`].

pub mod app;
pub mod ui;
pub mod traits;
pub mod handlers;
pub mod components;
pub mod screens;

pub use app::{App, ScreenId};
pub use traits::{Screen, ScreenAction};
