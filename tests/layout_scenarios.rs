use std::sync::{Arc, Mutex};

use mylivewallpaper_widgets::{
    bridge::{Bridge, Inbound, Outbound},
    layout::{
        AspectRatio, CanvasGeometry, Discovery, EngineSettings, HitTarget, LayoutEngine, Point,
        PointerEvent, WidgetMeta, WidgetPlacement,
    },
    store::{ConfigStore, ScreenInfo, ScreenInfoProvider},
    widget_catalog::FsConfigStore,
    StoreError,
};

#[derive(Clone, Default)]
struct SharedStore {
    persisted: Arc<Mutex<Vec<WidgetPlacement>>>,
    discovered: Discovery,
    saves: Arc<Mutex<usize>>,
}

impl ConfigStore for SharedStore {
    fn load_placements(&self) -> Result<Vec<WidgetPlacement>, StoreError> {
        Ok(self.persisted.lock().unwrap().clone())
    }

    fn discover(&self) -> Result<Discovery, StoreError> {
        Ok(self.discovered.clone())
    }

    fn save_placements(&self, placements: &[WidgetPlacement]) -> Result<(), StoreError> {
        *self.persisted.lock().unwrap() = placements.to_vec();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

struct Screen(f64, f64);

impl ScreenInfoProvider for Screen {
    fn screen_info(&self) -> Result<ScreenInfo, StoreError> {
        Ok(ScreenInfo::from_size(self.0, self.1))
    }
}

struct NoScreen;

impl ScreenInfoProvider for NoScreen {
    fn screen_info(&self) -> Result<ScreenInfo, StoreError> {
        Err(StoreError::Network("connection refused".into()))
    }
}

fn widget(id: &str, x: i32, y: i32, w: i32, h: i32, aspect: AspectRatio) -> WidgetPlacement {
    WidgetPlacement {
        id: id.to_string(),
        enabled: true,
        x,
        y,
        width: Some(w),
        height: Some(h),
        aspect_ratio: aspect,
    }
}

fn store_with(placements: Vec<WidgetPlacement>, discovered: &[&str]) -> SharedStore {
    SharedStore {
        persisted: Arc::new(Mutex::new(placements)),
        discovered: discovered
            .iter()
            .map(|id| (id.to_string(), WidgetMeta::default()))
            .collect(),
        ..Default::default()
    }
}

fn half_scale_engine(store: SharedStore) -> LayoutEngine<SharedStore, Screen> {
    let mut engine = LayoutEngine::new(store, Screen(1920.0, 1080.0), EngineSettings::default());
    engine.load().unwrap();
    engine.set_canvas(CanvasGeometry::new(0.0, 0.0, 960.0, 540.0));
    engine
}

#[test]
fn preview_and_drag_at_half_scale() {
    let mut engine = half_scale_engine(store_with(
        vec![widget("clock", 200, 100, 200, 100, AspectRatio::Fixed(2.0))],
        &[],
    ));

    let previews = engine.render();
    assert_eq!((previews[0].left, previews[0].top), (100.0, 50.0));

    engine.handle_pointer(PointerEvent::Down {
        index: 0,
        target: HitTarget::Body,
        client: Point::new(100.0, 50.0),
    });
    engine.handle_pointer(PointerEvent::Move {
        client: Point::new(300.0, 150.0),
    });
    engine.handle_pointer(PointerEvent::Up);

    let clock = &engine.placements()[0];
    assert_eq!((clock.x, clock.y), (600, 300));
}

#[test]
fn fixed_ratio_resize_forces_height_from_width() {
    let mut engine = LayoutEngine::new(
        store_with(vec![widget("clock", 0, 0, 200, 100, AspectRatio::Fixed(2.0))], &[]),
        Screen(1920.0, 1080.0),
        EngineSettings::default(),
    );
    engine.load().unwrap();
    engine.set_canvas(CanvasGeometry::new(0.0, 0.0, 1920.0, 1080.0));

    engine.handle_pointer(PointerEvent::Down {
        index: 0,
        target: HitTarget::ResizeHandle,
        client: Point::new(200.0, 100.0),
    });
    engine.handle_pointer(PointerEvent::Move {
        client: Point::new(240.0, 110.0),
    });
    engine.handle_pointer(PointerEvent::Up);

    let clock = &engine.placements()[0];
    assert_eq!((clock.width, clock.height), (Some(240), Some(120)));
}

#[test]
fn drags_never_leave_the_canvas() {
    let canvas = CanvasGeometry::new(35.0, 80.0, 700.0, 420.0);
    let mut engine = LayoutEngine::new(
        store_with(vec![widget("quote", 900, 500, 600, 200, AspectRatio::Fixed(3.0))], &[]),
        Screen(1920.0, 1080.0),
        EngineSettings::default(),
    );
    engine.load().unwrap();
    engine.set_canvas(canvas);

    let targets = [
        (-400.0, -400.0),
        (10_000.0, 20.0),
        (300.0, 10_000.0),
        (canvas.left + 1.0, canvas.top + 1.0),
        (512.3, 222.7),
    ];

    for (x, y) in targets {
        let start = engine.render()[0].clone();
        engine.handle_pointer(PointerEvent::Down {
            index: 0,
            target: HitTarget::Body,
            client: Point::new(canvas.left + start.left + 5.0, canvas.top + start.top + 5.0),
        });
        engine.handle_pointer(PointerEvent::Move { client: Point::new(x, y) });
        engine.handle_pointer(PointerEvent::Up);

        let preview = engine.render()[0].clone();
        let scale = engine.scale().unwrap();
        let real = &engine.placements()[0];
        let left = real.x as f64 * scale;
        let top = real.y as f64 * scale;
        assert!(left >= 0.0 && left <= canvas.width - preview.width + 0.5, "left {left}");
        assert!(top >= 0.0 && top <= canvas.height - preview.height + 0.5, "top {top}");
    }
}

#[test]
fn resizes_keep_the_ratio_within_one_unit() {
    let mut engine = half_scale_engine(store_with(
        vec![widget("clock", 100, 100, 350, 200, AspectRatio::Fixed(1.75))],
        &[],
    ));

    engine.handle_pointer(PointerEvent::Down {
        index: 0,
        target: HitTarget::ResizeHandle,
        client: Point::new(0.0, 0.0),
    });
    for step in [(13.0, 4.0), (-7.0, 30.0), (55.0, -12.0), (900.0, 900.0), (-600.0, 0.0)] {
        let anchor = match engine.session() {
            mylivewallpaper_widgets::layout::PointerSession::Resizing { anchor, .. } => anchor,
            other => panic!("unexpected session {other:?}"),
        };
        engine.handle_pointer(PointerEvent::Move {
            client: Point::new(anchor.x + step.0, anchor.y + step.1),
        });

        let clock = &engine.placements()[0];
        let (w, h) = (clock.width.unwrap() as f64, clock.height.unwrap() as f64);
        assert!((h - w / 1.75).abs() <= 1.0, "{w}x{h}");
    }
    engine.handle_pointer(PointerEvent::Up);
}

#[test]
fn discovery_adds_weather_with_defaults() {
    let mut engine = half_scale_engine(store_with(
        vec![widget("clock", 0, 0, 200, 100, AspectRatio::Fixed(2.0))],
        &["clock", "weather"],
    ));

    let placements = engine.placements();
    assert_eq!(placements.len(), 2);
    let weather = &placements[1];
    assert_eq!(weather.id, "weather");
    assert!(!weather.enabled);
    assert_eq!((weather.x, weather.y, weather.height), (100, 100, Some(100)));

    // loading again against the same store yields the same list
    let first = placements.to_vec();
    engine.load().unwrap();
    assert_eq!(engine.placements(), first.as_slice());
}

#[test]
fn reset_returns_to_loaded_then_saved_state() {
    let store = store_with(vec![widget("clock", 10, 10, 200, 100, AspectRatio::Fixed(2.0))], &[]);
    let mut engine = half_scale_engine(store.clone());
    let loaded = engine.placements().to_vec();

    engine.toggle(0);
    assert!(engine.reset(|| true));
    assert_eq!(engine.placements(), loaded.as_slice());

    engine.handle_pointer(PointerEvent::Down {
        index: 0,
        target: HitTarget::Body,
        client: Point::new(6.0, 6.0),
    });
    engine.handle_pointer(PointerEvent::Move { client: Point::new(100.0, 100.0) });
    engine.handle_pointer(PointerEvent::Up);
    engine.save().unwrap();
    let saved = engine.placements().to_vec();

    engine.toggle(0);
    assert!(engine.reset(|| true));
    assert_eq!(engine.placements(), saved.as_slice());
    assert_eq!(*store.persisted.lock().unwrap(), saved);
}

#[test]
fn screen_failure_uses_default_dimensions() {
    let mut engine = LayoutEngine::new(
        store_with(vec![widget("clock", 200, 100, 200, 100, AspectRatio::Flex)], &[]),
        NoScreen,
        EngineSettings::default(),
    );
    engine.load().unwrap();
    engine.set_canvas(CanvasGeometry::new(0.0, 0.0, 960.0, 540.0));

    assert_eq!(engine.scale(), Some(0.5));
}

#[test]
fn bridge_round_trip_with_background_save() {
    let store = store_with(vec![widget("clock", 200, 100, 200, 100, AspectRatio::Fixed(2.0))], &["quote"]);
    let engine = LayoutEngine::new(store.clone(), Screen(1920.0, 1080.0), EngineSettings::default());
    let mut bridge = Bridge::new(engine);

    let started = bridge.start();
    assert!(matches!(started.last(), Some(Outbound::Layout { .. })));

    bridge.handle(Inbound::Canvas { left: 0.0, top: 0.0, width: 960.0, height: 540.0 });
    let out = bridge.handle(Inbound::Toggle { index: 1, enabled: Some(true) });
    let Some(Outbound::Layout { previews, dirty, .. }) = out.last() else {
        panic!("expected a layout");
    };
    assert_eq!(previews.len(), 2);
    assert!(*dirty);

    bridge.handle(Inbound::Save);
    let mut saved = Vec::new();
    while bridge.is_saving() {
        saved.extend(bridge.poll());
        std::thread::yield_now();
    }

    assert!(saved.iter().any(|m| matches!(m, Outbound::Saved)));
    assert_eq!(*store.saves.lock().unwrap(), 1);
    assert!(store.persisted.lock().unwrap()[1].enabled);
    assert!(!bridge.engine().is_dirty());

    let frames = bridge.handle(Inbound::Frames);
    let [Outbound::Frames { frames }] = frames.as_slice() else {
        panic!("expected frames");
    };
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1].url, "http://localhost:8000/widgets/quote/frame");
    assert_eq!((frames[1].x, frames[1].y, frames[1].width, frames[1].height), (100, 100, 200, 100));
}

#[test]
fn local_store_feeds_the_engine() {
    let root = tempfile::tempdir().unwrap();
    let widgets = root.path().join("widgets");
    std::fs::create_dir_all(widgets.join("status")).unwrap();
    std::fs::write(widgets.join("status/widget.html"), "<!-- aspect-ratio: flex -->").unwrap();
    std::fs::create_dir_all(widgets.join("clock")).unwrap();
    std::fs::write(widgets.join("clock/widget.html"), "<!-- aspect-ratio: 4:1 -->").unwrap();

    let store = Arc::new(FsConfigStore::new(&widgets, root.path().join("widgets.json")));
    let mut engine = LayoutEngine::new(store.clone(), NoScreen, EngineSettings::default());
    engine.load().unwrap();

    let ids: Vec<_> = engine.placements().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["clock", "status"]);
    assert_eq!(engine.placements()[0].width, Some(400));
    assert_eq!(engine.placements()[1].width, None);

    engine.toggle(1);
    engine.save().unwrap();
    let persisted = store.load_placements().unwrap();
    assert!(persisted[1].enabled);
    assert!(persisted[1].aspect_ratio.is_flex());
}
