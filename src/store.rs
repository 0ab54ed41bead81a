//! Seams to the outside world: where placements live and how big the real
//! screen is.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    error::StoreError,
    layout::{Discovery, ScreenSize, WidgetPlacement},
};

pub trait ConfigStore {
    /// Persisted placements in stored order.
    fn load_placements(&self) -> Result<Vec<WidgetPlacement>, StoreError>;

    /// Widgets available on this machine, in discovery order.
    fn discover(&self) -> Result<Discovery, StoreError>;

    /// Replaces the persisted list with `placements`.
    fn save_placements(&self, placements: &[WidgetPlacement]) -> Result<(), StoreError>;
}

pub trait ScreenInfoProvider {
    fn screen_info(&self) -> Result<ScreenInfo, StoreError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

/// `{ frame: {...}, visible: {...} }` as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenInfo {
    #[serde(default)]
    pub frame: Option<ScreenRect>,
    #[serde(default)]
    pub visible: Option<ScreenRect>,
}

impl ScreenInfo {
    pub fn from_size(width: f64, height: f64) -> Self {
        Self {
            frame: Some(ScreenRect {
                width: Some(width),
                height: Some(height),
                x: Some(0.0),
                y: Some(0.0),
            }),
            visible: None,
        }
    }

    /// Full frame size, if both sides are present and positive.
    pub fn frame_size(&self) -> Option<ScreenSize> {
        let frame = self.frame?;
        let size = ScreenSize::new(frame.width?, frame.height?);
        size.is_usable().then_some(size)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn load_placements(&self) -> Result<Vec<WidgetPlacement>, StoreError> {
        (**self).load_placements()
    }

    fn discover(&self) -> Result<Discovery, StoreError> {
        (**self).discover()
    }

    fn save_placements(&self, placements: &[WidgetPlacement]) -> Result<(), StoreError> {
        (**self).save_placements(placements)
    }
}

impl<T: ScreenInfoProvider + ?Sized> ScreenInfoProvider for Box<T> {
    fn screen_info(&self) -> Result<ScreenInfo, StoreError> {
        (**self).screen_info()
    }
}

impl<T: ScreenInfoProvider + ?Sized> ScreenInfoProvider for Arc<T> {
    fn screen_info(&self) -> Result<ScreenInfo, StoreError> {
        (**self).screen_info()
    }
}
