//! Browser screens

pub mod login;
pub mod main_screen;
pub mod institutions;
pub mod stage_reorder;

pub use login::{LoginScreen, LoginState};
pub use main_screen::{InstitutionCard, MainScreen};
pub use institutions::InstitutionScreen;
pub use stage_reorder::{StageReorderScreen, FALLBACK_PROJECT};
