//! Terminal front panel for Lumivox - widgets, themes, and layout
//!
//! Stands in for the physical RGB strip, status LED and serial console
//! when the device runs on a desktop.

mod app;
mod theme;
pub mod widgets;

pub use app::{App, MessageType, PanelState};
pub use theme::{Theme, CRT_AMBER, CRT_GREEN};
pub use widgets::{CatalogWidget, LedStripWidget, StatusBarWidget};
