//! Widget placement model and the interactive preview layout.

pub mod engine;
pub mod merge;
pub mod placement;
pub mod session;
pub mod transform;

pub use engine::{EngineSettings, LayoutEngine, PendingSave, WidgetFrame, WidgetListEntry};
pub use placement::{AspectRatio, Discovery, WidgetMeta, WidgetPlacement};
pub use session::{HitTarget, PointerEvent, PointerSession};
pub use transform::{CanvasGeometry, Point, PreviewRect, ScreenSize};
