//! Widget center for the live wallpaper: widget placements, their preview
//! layout, and the stores they are loaded from and saved to.

pub mod logging;

pub mod api_connector;
pub mod bootstrap;
pub mod bridge;
pub mod data_loaders;
pub mod error;
pub mod layout;
pub mod paths;
pub mod screen;
pub mod store;
pub mod widget_catalog;

pub const DEBUG_NAME: &str = "WIDGETS";

pub use error::{LayoutError, StoreError};
pub use layout::LayoutEngine;
