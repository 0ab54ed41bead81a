use std::{
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
};

use serde::Serialize;

use crate::{
    data_loaders::config::{CenterConfig, DiscoverySettings, LayoutSettings, ScreenSettings},
    error::{LayoutError, StoreError},
    info,
    store::{ConfigStore, ScreenInfoProvider},
    warn, error, DEBUG_NAME,
};

use super::{
    merge::{derive_missing_widths, merge_discovered},
    placement::WidgetPlacement,
    session::{HitTarget, PointerEvent, PointerSession},
    transform::{
        compute_scale, drag_to, preview_for, render_previews, resize_by, CanvasGeometry, Point,
        PreviewRect, ScreenSize,
    },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineSettings {
    pub screen: ScreenSettings,
    pub layout: LayoutSettings,
    pub discovery: DiscoverySettings,
}

impl From<&CenterConfig> for EngineSettings {
    fn from(config: &CenterConfig) -> Self {
        Self {
            screen: config.screen,
            layout: config.layout,
            discovery: config.discovery,
        }
    }
}

/// Row of the widget list next to the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetListEntry {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub enabled: bool,
}

/// An enabled widget as the wallpaper hosts it: real-screen rectangle plus
/// the frame the widget is loaded from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetFrame {
    pub id: String,
    pub url: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A save running on a worker thread; finish it with
/// [`LayoutEngine::poll_save`].
pub struct PendingSave {
    rx: Receiver<Result<(), StoreError>>,
    sent: Vec<WidgetPlacement>,
}

pub struct LayoutEngine<S, P> {
    store: S,
    screen_provider: P,
    settings: EngineSettings,
    placements: Vec<WidgetPlacement>,
    snapshot: Vec<WidgetPlacement>,
    screen: ScreenSize,
    canvas: Option<CanvasGeometry>,
    session: PointerSession,
}

impl<S: ConfigStore, P: ScreenInfoProvider> LayoutEngine<S, P> {
    pub fn new(store: S, screen_provider: P, settings: EngineSettings) -> Self {
        let screen = ScreenSize::new(settings.screen.default_width, settings.screen.default_height);
        Self {
            store,
            screen_provider,
            settings,
            placements: Vec::new(),
            snapshot: Vec::new(),
            screen,
            canvas: None,
            session: PointerSession::Idle,
        }
    }

    /// Pulls persisted placements and discovery, merges them and makes the
    /// result both the working list and the reset target.
    ///
    /// A failed fetch still leaves a usable (possibly empty) list behind; the
    /// first failure is returned so the host can tell the user.
    pub fn load(&mut self) -> Result<(), LayoutError> {
        self.refresh_screen();

        let mut failure: Option<StoreError> = None;

        let persisted = match self.store.load_placements() {
            Ok(list) => list,
            Err(e) => {
                error!("[{}][LOAD] Failed to load widget config: {}", DEBUG_NAME, e);
                failure = Some(e);
                Vec::new()
            }
        };

        let discovered = match self.store.discover() {
            Ok(found) => found,
            Err(e) => {
                error!("[{}][LOAD] Widget discovery failed: {}", DEBUG_NAME, e);
                if failure.is_none() {
                    failure = Some(e);
                }
                Vec::new()
            }
        };

        let mut merged = merge_discovered(&persisted, &discovered, &self.settings.discovery);
        derive_missing_widths(&mut merged);

        info!(
            "[{}][LOAD] {} persisted, {} discovered, {} after merge",
            DEBUG_NAME,
            persisted.len(),
            discovered.len(),
            merged.len()
        );

        self.snapshot = merged.clone();
        self.placements = merged;
        self.session = PointerSession::Idle;

        match failure {
            Some(e) => Err(LayoutError::Load(e)),
            None => Ok(()),
        }
    }

    /// Re-reads the real screen size, falling back to the configured default
    /// when the provider fails or reports nothing usable.
    pub fn refresh_screen(&mut self) -> ScreenSize {
        let fallback = ScreenSize::new(
            self.settings.screen.default_width,
            self.settings.screen.default_height,
        );

        self.screen = match self.screen_provider.screen_info() {
            Ok(info) => info.frame_size().unwrap_or_else(|| {
                warn!(
                    "[{}][SCREEN] Screen info had no usable frame, using {}x{}",
                    DEBUG_NAME, fallback.width, fallback.height
                );
                fallback
            }),
            Err(e) => {
                warn!(
                    "[{}][SCREEN] Could not fetch screen dimensions ({}), using {}x{}",
                    DEBUG_NAME, e, fallback.width, fallback.height
                );
                fallback
            }
        };

        self.screen
    }

    /// Host reports the canvas' client rectangle (on layout and on every
    /// window resize).
    pub fn set_canvas(&mut self, canvas: CanvasGeometry) {
        self.canvas = Some(canvas);
    }

    pub fn canvas(&self) -> Option<CanvasGeometry> {
        self.canvas
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn scale(&self) -> Option<f64> {
        compute_scale(self.canvas.as_ref()?, &self.screen)
    }

    pub fn placements(&self) -> &[WidgetPlacement] {
        &self.placements
    }

    pub fn snapshot(&self) -> &[WidgetPlacement] {
        &self.snapshot
    }

    pub fn session(&self) -> PointerSession {
        self.session
    }

    /// True when the working list differs from the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.placements != self.snapshot
    }

    /// Full preview list for the current state; empty until a usable canvas
    /// has been reported.
    pub fn render(&self) -> Vec<PreviewRect> {
        match self.canvas.as_ref() {
            Some(canvas) => render_previews(&self.placements, canvas, &self.screen, &self.settings.layout),
            None => Vec::new(),
        }
    }

    pub fn widget_list(&self) -> Vec<WidgetListEntry> {
        self.placements
            .iter()
            .enumerate()
            .map(|(index, p)| WidgetListEntry {
                index,
                id: p.id.clone(),
                label: p.display_name(),
                enabled: p.enabled,
            })
            .collect()
    }

    pub fn wallpaper_frames(&self, widgets_base_url: &str) -> Vec<WidgetFrame> {
        let base = widgets_base_url.trim_end_matches('/');
        self.placements
            .iter()
            .filter(|p| p.enabled)
            .map(|p| WidgetFrame {
                id: p.id.clone(),
                url: format!("{base}/{}/frame", p.id),
                x: p.x,
                y: p.y,
                width: p.width.unwrap_or(self.settings.layout.default_width),
                height: p.height.unwrap_or(self.settings.layout.default_height),
            })
            .collect()
    }

    /// Returns false when `index` is out of range. Disabling the widget under
    /// an active drag or resize ends that session.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        let Some(placement) = self.placements.get_mut(index) else {
            return false;
        };
        placement.enabled = enabled;

        if !enabled && self.session.index() == Some(index) {
            self.session = PointerSession::Idle;
        }
        true
    }

    /// Flips the enabled flag and returns the new value.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let enabled = !self.placements.get(index)?.enabled;
        self.set_enabled(index, enabled);
        Some(enabled)
    }

    /// Single entry point for pointer input. Returns true when the session or
    /// a placement changed and the host should re-render.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down { index, target, client } => self.pointer_down(index, target, client),
            PointerEvent::Move { client } => self.pointer_move(client),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    fn preview_at(&self, index: usize) -> Option<PreviewRect> {
        let canvas = self.canvas.as_ref()?;
        let scale = self.scale()?;
        let placement = self.placements.get(index).filter(|p| p.enabled)?;
        Some(preview_for(index, placement, canvas, scale, &self.settings.layout))
    }

    fn pointer_down(&mut self, index: usize, target: HitTarget, client: Point) -> bool {
        if self.session.is_active() {
            info!(
                "[{}][POINTER] Ignoring pointer-down on {} while a session is active",
                DEBUG_NAME, index
            );
            return false;
        }

        let (Some(canvas), Some(preview)) = (self.canvas, self.preview_at(index)) else {
            return false;
        };

        let origin = canvas.origin();
        self.session = match target {
            HitTarget::Body => PointerSession::Dragging {
                index,
                offset: Point::new(
                    client.x - (origin.x + preview.left),
                    client.y - (origin.y + preview.top),
                ),
            },
            HitTarget::ResizeHandle => PointerSession::Resizing { index, anchor: client },
        };
        true
    }

    fn pointer_move(&mut self, client: Point) -> bool {
        let Some(index) = self.session.index() else {
            return false;
        };
        let (Some(canvas), Some(scale), Some(preview)) = (self.canvas, self.scale(), self.preview_at(index)) else {
            return false;
        };

        match self.session {
            PointerSession::Idle => false,
            PointerSession::Dragging { offset, .. } => {
                let (x, y) = drag_to(client, offset, &preview, &canvas, scale);
                let placement = &mut self.placements[index];
                let changed = placement.x != x || placement.y != y;
                placement.x = x;
                placement.y = y;
                changed
            }
            PointerSession::Resizing { anchor, .. } => {
                let delta = Point::new(client.x - anchor.x, client.y - anchor.y);
                let placement = &mut self.placements[index];
                let (width, height) = resize_by(
                    delta,
                    &preview,
                    placement.aspect_ratio,
                    &canvas,
                    scale,
                    &self.settings.layout,
                );
                let changed = placement.width != Some(width) || placement.height != Some(height);
                placement.width = Some(width);
                placement.height = Some(height);
                self.session = PointerSession::Resizing { index, anchor: client };
                changed
            }
        }
    }

    fn pointer_up(&mut self) -> bool {
        let was_active = self.session.is_active();
        self.session = PointerSession::Idle;
        was_active
    }

    /// Writes the whole working list. The snapshot only moves on success.
    pub fn save(&mut self) -> Result<(), LayoutError> {
        match self.store.save_placements(&self.placements) {
            Ok(()) => {
                self.snapshot = self.placements.clone();
                info!("[{}][SAVE] Saved {} widget placement(s)", DEBUG_NAME, self.placements.len());
                Ok(())
            }
            Err(e) => {
                error!("[{}][SAVE] Failed to save widget config: {}", DEBUG_NAME, e);
                Err(LayoutError::Save(e))
            }
        }
    }

    /// Restores the last saved (or loaded) list once `confirm` agrees.
    pub fn reset(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            return false;
        }
        self.placements = self.snapshot.clone();
        self.session = PointerSession::Idle;
        info!("[{}][RESET] Restored last saved configuration", DEBUG_NAME);
        true
    }
}

impl<S, P> LayoutEngine<S, P>
where
    S: ConfigStore + Clone + Send + 'static,
    P: ScreenInfoProvider,
{
    /// Starts a save of the current list on a worker thread. Saves are not
    /// queued; whichever request the store handles last wins.
    pub fn begin_save(&self) -> PendingSave {
        let store = self.store.clone();
        let sent = self.placements.clone();
        let placements = sent.clone();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(store.save_placements(&placements));
        });

        PendingSave { rx, sent }
    }

    /// `None` while the worker is still running. On success the snapshot
    /// becomes the list that was handed to the store, so edits made while
    /// the save was in flight stay dirty.
    pub fn poll_save(&mut self, pending: &PendingSave) -> Option<Result<(), LayoutError>> {
        match pending.rx.try_recv() {
            Ok(Ok(())) => {
                self.snapshot = pending.sent.clone();
                info!("[{}][SAVE] Background save finished", DEBUG_NAME);
                Some(Ok(()))
            }
            Ok(Err(e)) => {
                error!("[{}][SAVE] Background save failed: {}", DEBUG_NAME, e);
                Some(Err(LayoutError::Save(e)))
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                error!("[{}][SAVE] Save worker disappeared", DEBUG_NAME);
                Some(Err(LayoutError::SaveWorkerLost))
            }
        }
    }
}
