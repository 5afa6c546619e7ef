//! End-to-end engine scenarios driven through a recording [`Host`] mock.

use std::cell::{Cell, RefCell};

use emath::{Pos2, Rect, pos2, vec2};

use super::options::ticks_per_level;
use super::{
    CombineMode, Engine, EngineOptions, Host, SNAPSHOT_VERSION, Screen, ScreenId, TickKind,
    TileSnapshot, WindowId, WindowInfo, WorkspaceSnapshot,
};

#[derive(Default)]
struct TestHost {
    bounds: RefCell<ahash::HashMap<WindowId, Rect>>,
    pointer: Cell<Option<Pos2>>,
    modifier: Cell<bool>,
    applied: RefCell<Vec<(WindowId, Rect)>>,
    raised: RefCell<Vec<WindowId>>,
    split_previews: RefCell<Vec<(ScreenId, Rect)>>,
    cancel_previews: RefCell<Vec<(ScreenId, Rect, Rect, CombineMode)>>,
}

impl TestHost {
    fn place(&self, window: WindowId, bounds: Rect) {
        self.bounds.borrow_mut().insert(window, bounds);
    }

    fn bounds_of(&self, window: WindowId) -> Rect {
        self.bounds.borrow()[&window]
    }

    fn applies_to(&self, window: WindowId) -> usize {
        self.applied.borrow().iter().filter(|(w, _)| *w == window).count()
    }
}

impl Host for TestHost {
    fn window_bounds(&self, window: WindowId) -> Option<Rect> {
        self.bounds.borrow().get(&window).copied()
    }

    fn apply_bounds(&self, window: WindowId, bounds: Rect) {
        self.bounds.borrow_mut().insert(window, bounds);
        self.applied.borrow_mut().push((window, bounds));
    }

    fn raise_window(&self, window: WindowId) {
        self.raised.borrow_mut().push(window);
    }

    fn set_topmost(&self, _window: WindowId, _topmost: bool) {}

    fn pointer_pos(&self) -> Option<Pos2> {
        self.pointer.get()
    }

    fn modifier_held(&self) -> bool {
        self.modifier.get()
    }

    fn start_ticks(&self, _window: WindowId, _kind: TickKind) {}

    fn stop_ticks(&self, _window: WindowId, _kind: TickKind) {}

    fn show_split_preview(&self, screen: ScreenId, shape: Rect) {
        self.split_previews.borrow_mut().push((screen, shape));
    }

    fn show_cancel_preview(&self, screen: ScreenId, a: Rect, b: Rect, mode: CombineMode) {
        self.cancel_previews.borrow_mut().push((screen, a, b, mode));
    }

    fn clear_preview(&self, _screen: ScreenId) {}
}

fn rect(left: f32, top: f32, width: f32, height: f32) -> Rect {
    Rect::from_min_size(pos2(left, top), vec2(width, height))
}

fn work_area() -> Rect {
    rect(0.0, 0.0, 1000.0, 800.0)
}

fn engine_with_workspace() -> Engine {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine = Engine::new(EngineOptions::default());
    let screen = Screen::new(ScreenId(1), rect(0.0, 0.0, 1000.0, 820.0), work_area());
    engine.activate_workspace("main", vec![screen]);
    engine
}

fn track(engine: &mut Engine, host: &TestHost, n: u64, bounds: Rect) -> WindowId {
    let window = WindowId(n);
    host.place(window, bounds);
    engine
        .window_appeared(
            host,
            WindowInfo {
                window,
                resizable: true,
                modal: false,
                min_size: vec2(200.0, 200.0),
                persistence_key: format!("w{n}"),
            },
        )
        .unwrap();
    engine.window_reported_workspace(host, window, "main");
    window
}

/// Track the given windows and lock them into place through a saved layout.
fn lock_layout(engine: &mut Engine, host: &TestHost, tiles: &[(u64, Rect)]) -> Vec<WindowId> {
    let windows: Vec<WindowId> = tiles
        .iter()
        .map(|&(n, bounds)| track(engine, host, n, bounds))
        .collect();
    let snapshot = WorkspaceSnapshot {
        version: SNAPSHOT_VERSION,
        workspace: "main".to_owned(),
        tiles: tiles
            .iter()
            .map(|&(n, bounds)| TileSnapshot {
                key: format!("w{n}"),
                bounds,
            })
            .collect(),
    };
    engine.load_snapshot(host, snapshot).unwrap();
    windows
}

fn tile_bounds(engine: &Engine, window: WindowId) -> Rect {
    let id = engine.registry().find_by_window(window).unwrap();
    engine.registry().tile(id).unwrap().bounds()
}

fn is_locked(engine: &Engine, window: WindowId) -> bool {
    let id = engine.registry().find_by_window(window).unwrap();
    engine.registry().tile(id).unwrap().is_locked()
}

#[test]
fn modal_and_fixed_size_windows_are_never_tracked() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    host.place(WindowId(1), rect(0.0, 0.0, 300.0, 300.0));

    let info = WindowInfo {
        window: WindowId(1),
        resizable: true,
        modal: true,
        min_size: vec2(0.0, 0.0),
        persistence_key: "dialog".to_owned(),
    };
    assert!(engine.window_appeared(&host, info.clone()).is_none());
    let info = WindowInfo {
        modal: false,
        resizable: false,
        ..info
    };
    assert!(engine.window_appeared(&host, info).is_none());
    assert!(engine.registry().find_by_window(WindowId(1)).is_none());
}

#[test]
fn windows_stage_until_they_report_a_workspace() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let window = WindowId(1);
    host.place(window, rect(0.0, 0.0, 300.0, 300.0));

    let id = engine
        .window_appeared(
            &host,
            WindowInfo {
                window,
                resizable: true,
                modal: false,
                min_size: vec2(100.0, 100.0),
                persistence_key: "w1".to_owned(),
            },
        )
        .unwrap();
    assert_eq!(engine.registry().staged_tiles(), [id]);
    assert!(engine.registry().workspace_tiles("main").is_empty());

    engine.window_reported_workspace(&host, window, "main");
    assert!(engine.registry().staged_tiles().is_empty());
    assert_eq!(engine.registry().workspace_tiles("main"), [id]);
}

#[test]
fn first_drop_on_an_empty_screen_takes_the_working_area() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let window = track(&mut engine, &host, 1, rect(100.0, 100.0, 300.0, 200.0));

    engine.pointer_down(window);
    host.pointer.set(Some(pos2(500.0, 400.0)));
    engine.window_move_observed(&host, window);
    engine.on_move_tick(&host, window);

    // Split mode shrank the dragged window to the probe size under the pointer.
    assert_eq!(host.bounds_of(window), rect(495.0, 395.0, 400.0, 400.0));
    // With no locked tiles yet the preview offers the whole working area.
    assert_eq!(
        host.split_previews.borrow().last().copied(),
        Some((ScreenId(1), work_area()))
    );

    engine.pointer_up(&host, window);
    assert!(is_locked(&engine, window));
    assert_eq!(tile_bounds(&engine, window), work_area());
    assert_eq!(host.bounds_of(window), work_area());
    assert!(host.raised.borrow().contains(&window));
}

#[test]
fn left_split_of_a_full_screen_tile_yields_two_halves() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let first = lock_layout(&mut engine, &host, &[(1, work_area())])[0];
    let second = track(&mut engine, &host, 2, rect(600.0, 300.0, 300.0, 200.0));

    engine.pointer_down(second);
    host.pointer.set(Some(pos2(100.0, 400.0)));
    engine.on_move_tick(&host, second);
    assert_eq!(
        host.split_previews.borrow().last().copied(),
        Some((ScreenId(1), rect(0.0, 0.0, 500.0, 800.0)))
    );

    engine.pointer_up(&host, second);
    let a = tile_bounds(&engine, second);
    let b = tile_bounds(&engine, first);
    assert_eq!(a, rect(0.0, 0.0, 500.0, 800.0));
    assert_eq!(b, rect(500.0, 0.0, 500.0, 800.0));
    assert!(is_locked(&engine, second));

    // The group surfaces together on release.
    assert!(host.raised.borrow().contains(&first));
    assert!(host.raised.borrow().contains(&second));
}

#[test]
fn dwelling_over_a_target_grows_the_split_across_neighbors() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    lock_layout(
        &mut engine,
        &host,
        &[
            (1, rect(0.0, 0.0, 800.0, 400.0)),
            (2, rect(0.0, 400.0, 800.0, 400.0)),
        ],
    );
    let dragged = track(&mut engine, &host, 3, rect(850.0, 0.0, 150.0, 150.0));

    engine.pointer_down(dragged);
    host.pointer.set(Some(pos2(50.0, 100.0)));
    engine.on_move_tick(&host, dragged);
    assert_eq!(
        host.split_previews.borrow().last().copied(),
        Some((ScreenId(1), rect(0.0, 0.0, 400.0, 400.0)))
    );

    for _ in 0..ticks_per_level() {
        engine.on_move_tick(&host, dragged);
    }
    // One dwell period later the split spans the aligned neighbor as well.
    assert_eq!(
        host.split_previews.borrow().last().copied(),
        Some((ScreenId(1), rect(0.0, 0.0, 400.0, 800.0)))
    );
}

#[test]
fn dragging_a_shared_edge_cascades_to_the_neighbor_only() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let windows = lock_layout(
        &mut engine,
        &host,
        &[
            (1, rect(0.0, 0.0, 400.0, 800.0)),
            (2, rect(400.0, 0.0, 300.0, 800.0)),
            (3, rect(700.0, 0.0, 300.0, 800.0)),
        ],
    );
    let (left, middle, right) = (windows[0], windows[1], windows[2]);

    engine.pointer_down(left);
    engine.window_resize_observed(&host, left);
    host.place(left, rect(0.0, 0.0, 440.0, 800.0));
    engine.on_resize_tick(&host, left);

    assert_eq!(tile_bounds(&engine, middle), rect(440.0, 0.0, 260.0, 800.0));
    assert_eq!(host.bounds_of(middle), rect(440.0, 0.0, 260.0, 800.0));
    // The middle/right seam does not move.
    assert_eq!(tile_bounds(&engine, right), rect(700.0, 0.0, 300.0, 800.0));

    engine.pointer_up(&host, left);
    assert_eq!(tile_bounds(&engine, left), rect(0.0, 0.0, 440.0, 800.0));
    assert!(is_locked(&engine, left));
}

#[test]
fn minimum_size_violations_cancel_and_roll_back_on_release() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let windows = lock_layout(
        &mut engine,
        &host,
        &[
            (1, rect(0.0, 0.0, 400.0, 800.0)),
            (2, rect(400.0, 0.0, 300.0, 800.0)),
            (3, rect(700.0, 0.0, 300.0, 800.0)),
        ],
    );
    let (left, middle) = (windows[0], windows[1]);

    engine.pointer_down(left);
    engine.window_resize_observed(&host, left);
    // The neighbor would end up 150 wide, under its 200 minimum.
    host.place(left, rect(0.0, 0.0, 550.0, 800.0));
    engine.on_resize_tick(&host, left);

    assert!(matches!(
        host.cancel_previews.borrow().last(),
        Some((_, _, _, CombineMode::Intersect))
    ));
    // Nothing committed this tick.
    assert_eq!(tile_bounds(&engine, middle), rect(400.0, 0.0, 300.0, 800.0));

    engine.pointer_up(&host, left);
    // Bit-exact rollback of the dragged tile.
    assert_eq!(tile_bounds(&engine, left), rect(0.0, 0.0, 400.0, 800.0));
    assert_eq!(host.bounds_of(left), rect(0.0, 0.0, 400.0, 800.0));
    assert_eq!(tile_bounds(&engine, middle), rect(400.0, 0.0, 300.0, 800.0));
}

#[test]
fn pulling_off_a_pinned_screen_edge_cancels_the_resize() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let window = lock_layout(&mut engine, &host, &[(1, rect(0.0, 0.0, 400.0, 800.0))])[0];

    engine.pointer_down(window);
    engine.window_resize_observed(&host, window);
    host.place(window, rect(30.0, 0.0, 370.0, 800.0));
    engine.on_resize_tick(&host, window);

    assert!(matches!(
        host.cancel_previews.borrow().last(),
        Some((_, _, _, CombineMode::Xor))
    ));

    engine.pointer_up(&host, window);
    assert_eq!(tile_bounds(&engine, window), rect(0.0, 0.0, 400.0, 800.0));
    assert_eq!(host.bounds_of(window), rect(0.0, 0.0, 400.0, 800.0));
}

#[test]
fn closing_a_tiled_window_redistributes_its_area() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let windows = lock_layout(
        &mut engine,
        &host,
        &[
            (1, rect(0.0, 0.0, 500.0, 800.0)),
            (2, rect(500.0, 0.0, 500.0, 800.0)),
        ],
    );

    engine.window_disappeared(&host, windows[1], false);
    assert!(engine.registry().find_by_window(windows[1]).is_none());
    assert_eq!(tile_bounds(&engine, windows[0]), work_area());
}

#[test]
fn host_shutdown_skips_redistribution() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let windows = lock_layout(
        &mut engine,
        &host,
        &[
            (1, rect(0.0, 0.0, 500.0, 800.0)),
            (2, rect(500.0, 0.0, 500.0, 800.0)),
        ],
    );

    engine.window_disappeared(&host, windows[1], true);
    assert!(engine.registry().find_by_window(windows[1]).is_none());
    assert_eq!(tile_bounds(&engine, windows[0]), rect(0.0, 0.0, 500.0, 800.0));
}

#[test]
fn starting_to_move_a_locked_tile_releases_its_slot() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let windows = lock_layout(
        &mut engine,
        &host,
        &[
            (1, rect(0.0, 0.0, 500.0, 800.0)),
            (2, rect(500.0, 0.0, 500.0, 800.0)),
        ],
    );

    engine.pointer_down(windows[0]);
    host.pointer.set(Some(pos2(250.0, 400.0)));
    engine.on_move_tick(&host, windows[0]);

    assert!(!is_locked(&engine, windows[0]));
    assert_eq!(tile_bounds(&engine, windows[1]), work_area());
}

#[test]
fn saved_layouts_apply_exactly_once() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let window = track(&mut engine, &host, 1, rect(100.0, 100.0, 300.0, 300.0));

    let snapshot = WorkspaceSnapshot {
        version: SNAPSHOT_VERSION,
        workspace: "main".to_owned(),
        tiles: vec![TileSnapshot {
            key: "w1".to_owned(),
            bounds: rect(0.0, 0.0, 500.0, 800.0),
        }],
    };
    engine.load_snapshot(&host, snapshot.clone()).unwrap();
    assert!(is_locked(&engine, window));
    assert_eq!(tile_bounds(&engine, window), rect(0.0, 0.0, 500.0, 800.0));
    assert_eq!(host.applies_to(window), 1);

    // A second load must not re-apply to an already restored tile.
    engine.load_snapshot(&host, snapshot).unwrap();
    assert_eq!(host.applies_to(window), 1);
}

#[test]
fn incompatible_snapshot_versions_are_rejected() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let snapshot = WorkspaceSnapshot {
        version: SNAPSHOT_VERSION + 1,
        workspace: "main".to_owned(),
        tiles: Vec::new(),
    };
    assert!(engine.load_snapshot(&host, snapshot).is_err());
}

#[test]
fn save_snapshot_captures_only_locked_tiles() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    lock_layout(
        &mut engine,
        &host,
        &[
            (1, rect(0.0, 0.0, 500.0, 800.0)),
            (2, rect(500.0, 0.0, 500.0, 800.0)),
        ],
    );
    // Tracked but floating; must not be saved.
    track(&mut engine, &host, 3, rect(100.0, 100.0, 300.0, 300.0));

    let snapshot = engine.save_snapshot("main");
    assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    assert_eq!(snapshot.tiles.len(), 2);
    assert!(snapshot.tiles.iter().any(|t| t.key == "w1"));
    assert!(snapshot.tiles.iter().any(|t| t.key == "w2"));
    assert!(!snapshot.tiles.iter().any(|t| t.key == "w3"));
}

#[test]
fn disengaging_the_modifier_restores_the_probe_size() {
    let mut engine = engine_with_workspace();
    let host = TestHost::default();
    let window = track(&mut engine, &host, 1, rect(100.0, 100.0, 300.0, 200.0));

    engine.pointer_down(window);
    host.pointer.set(Some(pos2(500.0, 400.0)));
    engine.on_move_tick(&host, window);
    assert_eq!(host.bounds_of(window), rect(495.0, 395.0, 400.0, 400.0));

    // Holding the modifier disables split mode (default sense); the window gets
    // its remembered size back under the pointer.
    host.modifier.set(true);
    host.pointer.set(Some(pos2(600.0, 300.0)));
    engine.on_move_tick(&host, window);
    assert_eq!(host.bounds_of(window), rect(595.0, 295.0, 300.0, 200.0));
}
