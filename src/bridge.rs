//! JSON message protocol between the widget-center page and the engine.
//!
//! Every message is one JSON object tagged by `"type"`. The page reports its
//! canvas and pointer input; the engine answers with the full preview layout
//! after anything that changed it, plus notices for the user.

use serde::{Deserialize, Serialize};

use crate::{
    data_loaders::config::ApiSettings,
    info,
    layout::{
        CanvasGeometry, HitTarget, LayoutEngine, PendingSave, Point, PointerEvent, PreviewRect,
        WidgetFrame, WidgetListEntry,
    },
    store::{ConfigStore, ScreenInfoProvider},
    warn, DEBUG_NAME,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    Canvas {
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    },
    PointerDown {
        index: usize,
        #[serde(default)]
        target: HitTarget,
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp,
    Toggle {
        index: usize,
        #[serde(default)]
        enabled: Option<bool>,
    },
    Save,
    Reset {
        #[serde(default)]
        confirmed: bool,
    },
    ScreenChanged,
    /// Wallpaper side asks where the enabled widgets go.
    Frames,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Layout {
        scale: Option<f64>,
        previews: Vec<PreviewRect>,
        widgets: Vec<WidgetListEntry>,
        dirty: bool,
    },
    Notice {
        level: NoticeLevel,
        message: String,
    },
    Saved,
    Frames {
        frames: Vec<WidgetFrame>,
    },
}

impl Outbound {
    fn notice(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self::Notice {
            level,
            message: message.into(),
        }
    }
}

pub struct Bridge<S, P> {
    engine: LayoutEngine<S, P>,
    pending_saves: Vec<PendingSave>,
    widgets_base_url: String,
}

impl<S, P> Bridge<S, P>
where
    S: ConfigStore + Clone + Send + 'static,
    P: ScreenInfoProvider,
{
    pub fn new(engine: LayoutEngine<S, P>) -> Self {
        Self {
            engine,
            pending_saves: Vec::new(),
            widgets_base_url: ApiSettings::default().widgets_base_url,
        }
    }

    pub fn with_widgets_base_url(mut self, url: impl Into<String>) -> Self {
        self.widgets_base_url = url.into();
        self
    }

    pub fn engine(&self) -> &LayoutEngine<S, P> {
        &self.engine
    }

    pub fn is_saving(&self) -> bool {
        !self.pending_saves.is_empty()
    }

    /// Initial load; a failure becomes a notice in front of the layout.
    pub fn start(&mut self) -> Vec<Outbound> {
        let mut out = Vec::new();
        if let Err(e) = self.engine.load() {
            out.push(Outbound::notice(NoticeLevel::Error, e.to_string()));
        }
        out.push(self.layout());
        out
    }

    pub fn handle(&mut self, message: Inbound) -> Vec<Outbound> {
        match message {
            Inbound::Canvas { left, top, width, height } => {
                self.engine.set_canvas(CanvasGeometry::new(left, top, width, height));
                vec![self.layout()]
            }
            Inbound::PointerDown { index, target, x, y } => {
                let event = PointerEvent::Down {
                    index,
                    target,
                    client: Point::new(x, y),
                };
                self.pointer(event)
            }
            Inbound::PointerMove { x, y } => self.pointer(PointerEvent::Move {
                client: Point::new(x, y),
            }),
            Inbound::PointerUp => self.pointer(PointerEvent::Up),
            Inbound::Toggle { index, enabled } => {
                let applied = match enabled {
                    Some(enabled) => self.engine.set_enabled(index, enabled),
                    None => self.engine.toggle(index).is_some(),
                };
                if !applied {
                    warn!("[{}][BRIDGE] Toggle for unknown widget index {}", DEBUG_NAME, index);
                    return Vec::new();
                }
                vec![self.layout()]
            }
            Inbound::Save => {
                if !self.pending_saves.is_empty() {
                    info!(
                        "[{}][BRIDGE] Save requested while {} save(s) are in flight",
                        DEBUG_NAME,
                        self.pending_saves.len()
                    );
                }
                self.pending_saves.push(self.engine.begin_save());
                Vec::new()
            }
            Inbound::Reset { confirmed } => {
                if self.engine.reset(|| confirmed) {
                    vec![self.layout()]
                } else {
                    Vec::new()
                }
            }
            Inbound::ScreenChanged => {
                self.engine.refresh_screen();
                vec![self.layout()]
            }
            Inbound::Frames => vec![Outbound::Frames {
                frames: self.engine.wallpaper_frames(&self.widgets_base_url),
            }],
            Inbound::Shutdown => Vec::new(),
        }
    }

    /// Finishes every background save whose worker has answered. Each one
    /// gets its own notice, so an earlier failure is not hidden by a later
    /// save.
    pub fn poll(&mut self) -> Vec<Outbound> {
        if self.pending_saves.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut saved = false;
        let mut running = Vec::with_capacity(self.pending_saves.len());

        for pending in std::mem::take(&mut self.pending_saves) {
            match self.engine.poll_save(&pending) {
                None => running.push(pending),
                Some(Ok(())) => {
                    saved = true;
                    out.push(Outbound::Saved);
                    out.push(Outbound::notice(NoticeLevel::Info, "Widget configuration saved successfully!"));
                }
                Some(Err(e)) => out.push(Outbound::notice(NoticeLevel::Error, e.to_string())),
            }
        }
        self.pending_saves = running;

        if saved {
            out.push(self.layout());
        }
        out
    }

    fn pointer(&mut self, event: PointerEvent) -> Vec<Outbound> {
        if self.engine.handle_pointer(event) {
            vec![self.layout()]
        } else {
            Vec::new()
        }
    }

    fn layout(&self) -> Outbound {
        Outbound::Layout {
            scale: self.engine.scale(),
            previews: self.engine.render(),
            widgets: self.engine.widget_list(),
            dirty: self.engine.is_dirty(),
        }
    }
}
