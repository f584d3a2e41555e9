//! Front panel widgets

mod catalog;
mod led_strip;
mod status_bar;

pub use catalog::CatalogWidget;
pub use led_strip::LedStripWidget;
pub use status_bar::StatusBarWidget;
