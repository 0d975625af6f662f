//! Reusable UI components for the browser
//!
//! Lists, panels and controls that the screens compose.

pub mod list_view;
pub mod draggable_list;
pub mod detail_panel;
pub mod text_log;
pub mod form_field;
pub mod button;
pub mod navigation;

pub use list_view::{ListViewConfig, SelectableList, Selected};
pub use draggable_list::{DragEvent, DragState, DraggableList, OrderChange};
pub use detail_panel::DetailPanel;
pub use text_log::{LogLevel, TextLog};
pub use form_field::InputField;
pub use button::{Button, ButtonVariant};
pub use navigation::NavBar;
