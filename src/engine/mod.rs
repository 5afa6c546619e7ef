//! The tiling engine: a tick-driven state machine over shared window geometry.
//!
//! The host translates native window and pointer notifications into calls on
//! [`Engine`] and implements [`Host`] for queries and effects flowing back out.
//! All geometry decisions are compute-then-dispatch: the split, cascade and
//! redistribution algorithms are pure functions over a snapshot of tile state
//! returning `(tile, new bounds)` lists, which the engine then applies through
//! [`Host::apply_bounds`] and mirrors into its own registry.
//!
//! Calls into the engine must be serialized by the host (one event or tick at a
//! time). That exclusivity is what makes a split commit or a cascade tick an
//! atomic unit: no tick begins until the previous one fully applied or rejected.

mod cascade;
mod drag;
pub mod geometry;
mod host;
mod options;
mod persistence;
mod registry;
mod removal;
mod screen;
mod split;
mod tile;

#[cfg(test)]
mod engine_tests;

use ahash::HashMap;
use emath::{Rect, Vec2};

use self::cascade::{CascadeTick, ResizeSession, capture_relations, cascade_tick, screen_pin_violated};
use self::geometry::point_in_bounds;
use self::removal::redistribution_moves;
use self::split::{aligned_run, commit_moves, level_pairs, level_rects, split_border_at, split_shape};

pub use self::geometry::SharedBorder;
pub use self::host::{CombineMode, Host, TickKind, WindowId};
pub use self::options::{DWELL_MS, EngineOptions, TICK_MS};
pub use self::persistence::{SNAPSHOT_VERSION, SnapshotError, TileSnapshot, WorkspaceSnapshot};
pub use self::registry::TileRegistry;
pub use self::screen::{Screen, ScreenId, ScreenMap};
pub use self::tile::{Tile, TileId};

/// What the host knows about a window when it first appears.
#[derive(Clone, Debug)]
pub struct WindowInfo {
    pub window: WindowId,
    pub resizable: bool,
    pub modal: bool,
    /// Window-reported minimum size; enforced on every cascade tick.
    pub min_size: Vec2,
    /// Stable key for saved layouts, surviving across sessions where the window
    /// handle does not.
    pub persistence_key: String,
}

/// The tiling engine. One per host process; owned and driven by the host
/// integration layer.
#[derive(Debug, Default)]
pub struct Engine {
    options: EngineOptions,
    screens: ScreenMap,
    registry: TileRegistry,
    /// Saved layouts by workspace name, applied lazily as matching windows turn up.
    restore: HashMap<String, WorkspaceSnapshot>,
    active_workspace: Option<String>,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn screens(&self) -> &ScreenMap {
        &self.screens
    }

    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    pub fn active_workspace(&self) -> Option<&str> {
        self.active_workspace.as_deref()
    }

    /// Make `workspace` the one all tiling operates on, rebuilding the screen set.
    pub fn activate_workspace(&mut self, workspace: &str, screens: Vec<Screen>) {
        log::info!(
            "activating workspace '{workspace}' with {} screen(s)",
            screens.len()
        );
        self.screens.rebuild(screens);
        self.registry.ensure_workspace(workspace);
        self.active_workspace = Some(workspace.to_owned());
    }

    pub fn deactivate(&mut self) {
        self.active_workspace = None;
    }

    // ---- Window lifecycle ------------------------------------------------

    /// Start tracking a window. Modal and non-resizable windows are never tracked:
    /// they cannot participate in tiling, so suppressing them here keeps every
    /// later code path free of the distinction.
    pub fn window_appeared(&mut self, host: &dyn Host, info: WindowInfo) -> Option<TileId> {
        if info.modal || !info.resizable {
            log::debug!("ignoring untileable window {:?}", info.window);
            return None;
        }
        if let Some(existing) = self.registry.find_by_window(info.window) {
            return Some(existing);
        }
        let bounds = host.window_bounds(info.window).unwrap_or(Rect::ZERO);
        let id = self.registry.insert_staged(Tile::new(
            info.window,
            info.persistence_key,
            bounds,
            info.min_size,
        ));
        log::info!("tracking window {:?} as {id:?}", info.window);
        Some(id)
    }

    /// The window told us which workspace it belongs to; move its tile out of
    /// staging and apply any saved layout for it.
    pub fn window_reported_workspace(&mut self, host: &dyn Host, window: WindowId, workspace: &str) {
        let Some(id) = self.registry.find_by_window(window) else {
            return;
        };
        self.registry.assign_to_workspace(id, workspace);
        self.apply_restore(host, id, workspace);
    }

    /// Drop a window's tile. Unless the host itself is shutting down, its siblings
    /// absorb the vacated area first.
    pub fn window_disappeared(&mut self, host: &dyn Host, window: WindowId, host_exiting: bool) {
        let Some(id) = self.registry.find_by_window(window) else {
            return;
        };
        host.stop_ticks(window, TickKind::Move);
        host.stop_ticks(window, TickKind::Resize);
        if !host_exiting {
            self.release_tile(host, id);
        }
        self.registry.remove(id);
        log::info!("window {window:?} gone, dropped {id:?}");
    }

    // ---- Saved layouts ---------------------------------------------------

    /// Take a previously saved layout for a workspace. Bounds apply to already
    /// tracked tiles immediately and to later arrivals as they report the
    /// workspace; each tile is restored at most once.
    pub fn load_snapshot(
        &mut self,
        host: &dyn Host,
        snapshot: WorkspaceSnapshot,
    ) -> Result<(), SnapshotError> {
        snapshot.validate()?;
        let workspace = snapshot.workspace.clone();
        let members: Vec<TileId> = self.registry.workspace_tiles(&workspace).to_vec();
        self.restore.insert(workspace.clone(), snapshot);
        for id in members {
            self.apply_restore(host, id, &workspace);
        }
        Ok(())
    }

    /// The current locked layout of a workspace, for the persistence collaborator.
    pub fn save_snapshot(&self, workspace: &str) -> WorkspaceSnapshot {
        let tiles = self
            .registry
            .workspace_tiles(workspace)
            .iter()
            .filter_map(|id| self.registry.tile(*id))
            .filter(|t| t.is_locked())
            .map(|t| TileSnapshot {
                key: t.persistence_key.clone(),
                bounds: t.bounds(),
            })
            .collect();
        WorkspaceSnapshot::new(workspace.to_owned(), tiles)
    }

    fn apply_restore(&mut self, host: &dyn Host, id: TileId, workspace: &str) {
        let Some(tile) = self.registry.tile(id) else {
            return;
        };
        if tile.restored {
            return;
        }
        let Some(bounds) = self
            .restore
            .get(workspace)
            .and_then(|snap| snap.lookup(&tile.persistence_key))
        else {
            return;
        };
        let window = tile.window();
        let screen = self
            .screens
            .screen_at(bounds.left(), bounds.top())
            .map(|s| s.id);
        if let Some(tile) = self.registry.tile_mut(id) {
            tile.restored = true;
            tile.locked = true;
            tile.bounds = bounds;
            tile.screen = screen;
        }
        host.apply_bounds(window, bounds);
        log::info!("restored saved bounds for {id:?}");
    }

    // ---- Pointer and geometry notifications ------------------------------

    pub fn pointer_down(&mut self, window: WindowId) {
        if let Some(id) = self.registry.find_by_window(window) {
            if let Some(tile) = self.registry.tile_mut(id) {
                tile.drag.pointer_down = true;
            }
        }
    }

    /// The OS reported the window moving under the pointer. Starts the move poll
    /// unless this drag already turned into a resize.
    pub fn window_move_observed(&mut self, host: &dyn Host, window: WindowId) {
        let Some(tile) = self
            .registry
            .find_by_window(window)
            .and_then(|id| self.registry.tile(id))
        else {
            return;
        };
        if tile.drag.sizing || !tile.drag.pointer_down {
            host.stop_ticks(window, TickKind::Move);
        } else {
            host.start_ticks(window, TickKind::Move);
        }
    }

    /// The OS reported the window resizing. Engine-initiated writes (probe shrink
    /// and restore) echo back as one notification each; `code_resize` swallows it
    /// so the cascade never arms against our own write.
    pub fn window_resize_observed(&mut self, host: &dyn Host, window: WindowId) {
        let Some(id) = self.registry.find_by_window(window) else {
            return;
        };
        let Some(tile) = self.registry.tile_mut(id) else {
            return;
        };
        if tile.drag.code_resize {
            tile.drag.code_resize = false;
            return;
        }
        if tile.drag.pointer_down {
            tile.drag.sizing = true;
            host.start_ticks(window, TickKind::Resize);
        }
        host.stop_ticks(window, TickKind::Move);
    }

    /// Drag end: commit or roll back whatever session was in flight, then settle
    /// screen assignment and z-order.
    pub fn pointer_up(&mut self, host: &dyn Host, window: WindowId) {
        let Some(id) = self.registry.find_by_window(window) else {
            return;
        };
        host.stop_ticks(window, TickKind::Move);
        host.stop_ticks(window, TickKind::Resize);
        host.set_topmost(window, false);

        let (split, resize) = match self.registry.tile_mut(id) {
            Some(tile) => tile.drag.release(),
            None => return,
        };

        if let Some(live) = host.window_bounds(window) {
            if let Some(tile) = self.registry.tile_mut(id) {
                tile.bounds = live;
            }
        }

        if let Some(session) = resize {
            if session.cancel_pending {
                log::info!("resize cancelled, rolling {id:?} back to {:?}", session.rollback);
                if let Some(tile) = self.registry.tile_mut(id) {
                    tile.bounds = session.rollback;
                }
                host.apply_bounds(window, session.rollback);
            }
        } else if let Some(session) = split {
            if let Some(shape) = session.shape {
                let moves = commit_moves(shape, session.level, &session.pairs, |tid| {
                    self.registry.tile(tid).map(Tile::bounds)
                });
                if let Some(tile) = self.registry.tile_mut(id) {
                    tile.locked = true;
                    tile.bounds = shape;
                }
                host.apply_bounds(window, shape);
                self.dispatch_moves(host, &moves);
                log::info!("split committed for {id:?} at level {}", session.level);
            }
        }

        let (final_bounds, locked) = match self.registry.tile(id) {
            Some(tile) => (tile.bounds(), tile.is_locked()),
            None => return,
        };
        let screen = self
            .screens
            .screen_at(final_bounds.left(), final_bounds.top())
            .map(|s| s.id);
        if let Some(tile) = self.registry.tile_mut(id) {
            tile.screen = screen;
        }

        for screen in self.screens.iter() {
            host.clear_preview(screen.id);
        }

        if locked && self.options.bring_to_front {
            if let (Some(workspace), Some(screen)) = (self.active_workspace.clone(), screen) {
                for (tid, _) in self.registry.locked_peers(&workspace, screen, id) {
                    if let Some(tile) = self.registry.tile(tid) {
                        host.raise_window(tile.window());
                    }
                }
                host.raise_window(window);
            }
        }
    }

    // ---- Move ticks (split planning) -------------------------------------

    /// One poll tick while a window is being moved: maintain the probe shrink,
    /// recompute the split target under the pointer and advance the dwell level.
    pub fn on_move_tick(&mut self, host: &dyn Host, window: WindowId) {
        let Some(id) = self.registry.find_by_window(window) else {
            host.stop_ticks(window, TickKind::Move);
            return;
        };
        let (pointer_down, sizing, probe_engaged, locked, remembered_size) = {
            let Some(tile) = self.registry.tile(id) else {
                return;
            };
            (
                tile.drag.pointer_down,
                tile.drag.sizing,
                tile.drag.probe_engaged,
                tile.is_locked(),
                // Not refreshed during the move, so this is still the pre-drag size.
                tile.bounds().size(),
            )
        };
        if sizing || !pointer_down {
            host.stop_ticks(window, TickKind::Move);
            return;
        }

        // A locked tile that starts moving leaves the tiling; its siblings absorb
        // the slot right away.
        if locked {
            self.release_tile(host, id);
        }

        let Some(pointer) = host.pointer_pos() else {
            return;
        };
        let engaged = self.options.split_engaged(host.modifier_held());

        // Shrink the dragged window while split mode is engaged so it stops
        // covering potential targets; restore its remembered size on disengage.
        if engaged != probe_engaged {
            let size = if engaged {
                self.options.probe_size
            } else {
                remembered_size
            };
            if let Some(tile) = self.registry.tile_mut(id) {
                tile.drag.code_resize = true;
                tile.drag.probe_engaged = engaged;
            }
            host.apply_bounds(
                window,
                Rect::from_min_size(pointer - self.options.probe_grab_offset, size),
            );
        }
        host.set_topmost(window, engaged);

        let Some(screen) = self.screens.screen_at(pointer.x, pointer.y).copied() else {
            return;
        };
        let Some(workspace) = self.active_workspace.clone() else {
            return;
        };
        let peers = self.registry.locked_peers(&workspace, screen.id, id);

        let hovered = peers
            .iter()
            .find(|(_, r)| point_in_bounds(pointer.x, pointer.y, *r))
            .copied();

        let mut show = None;
        let mut clear = false;
        if let Some(tile) = self.registry.tile_mut(id) {
            let session = tile.drag.split.get_or_insert_default();
            let prev_shape = session.shape;
            if engaged {
                if peers.is_empty() {
                    // First tile on an empty screen takes the whole working area.
                    session.observe(None, Vec::new());
                    session.shape = Some(screen.work_area);
                } else if let Some((target_id, target)) = hovered {
                    let border = split_border_at(pointer, target);
                    let run = aligned_run(border, target, &peers);
                    if let Some(idx) = run.iter().position(|(tid, _)| *tid == target_id) {
                        session.observe(Some(border), level_pairs(&run, idx));
                        let rects = level_rects(&run, idx, session.level);
                        session.shape = Some(split_shape(border, target, &rects));
                    }
                }
                // Hovering no target keeps the last shape, so brushing over a gap
                // between tiles does not flicker the preview away.
                if session.shape != prev_shape {
                    show = session.shape;
                }
            } else {
                session.observe(None, Vec::new());
                clear = session.shape.take().is_some();
            }
        }

        if let Some(shape) = show {
            host.show_split_preview(screen.id, shape);
        } else if clear {
            host.clear_preview(screen.id);
        }
    }

    // ---- Resize ticks (cascade) ------------------------------------------

    /// One poll tick while a locked window is being resized: arm on the first
    /// tick, then validate-and-commit the whole neighbor set or reject the tick.
    pub fn on_resize_tick(&mut self, host: &dyn Host, window: WindowId) {
        let Some(id) = self.registry.find_by_window(window) else {
            host.stop_ticks(window, TickKind::Resize);
            return;
        };
        let Some(workspace) = self.active_workspace.clone() else {
            return;
        };
        let (screen, last_bounds, needs_arm) = {
            let Some(tile) = self.registry.tile(id) else {
                return;
            };
            if !tile.is_locked() || !tile.drag.pointer_down {
                host.stop_ticks(window, TickKind::Resize);
                return;
            }
            let Some(screen) = tile.screen().and_then(|s| self.screens.get(s)).copied() else {
                return;
            };
            (screen, tile.bounds(), tile.drag.resize.is_none())
        };
        let Some(live) = host.window_bounds(window) else {
            host.stop_ticks(window, TickKind::Resize);
            return;
        };

        if needs_arm {
            let peers = self.registry.locked_peers(&workspace, screen.id, id);
            let relations = capture_relations(last_bounds, &peers);
            log::debug!("cascade armed for {id:?} with {} relation(s)", relations.len());
            if let Some(tile) = self.registry.tile_mut(id) {
                tile.drag.resize = Some(ResizeSession::new(last_bounds, relations));
            }
        }

        let (rollback, was_cancel_pending, mut relations) = {
            let Some(tile) = self.registry.tile_mut(id) else {
                return;
            };
            tile.bounds = live;
            let Some(session) = tile.drag.resize.as_ref() else {
                return;
            };
            (session.rollback, session.cancel_pending, session.relations.clone())
        };
        // Peers that closed or unlocked mid-session fall out for good.
        relations.retain(|(_, tid)| self.registry.tile(*tid).is_some_and(Tile::is_locked));

        if screen_pin_violated(rollback, live, screen.work_area) {
            host.show_cancel_preview(screen.id, rollback, live, CombineMode::Xor);
            self.update_resize_session(id, relations, |session| {
                session.cancel_pending = true;
            });
            return;
        }

        let outcome = cascade_tick(&relations, live, |tid| {
            self.registry.tile(tid).map(|t| (t.bounds(), t.min_size()))
        });
        match outcome {
            CascadeTick::CancelInvalid { offender } => {
                host.show_cancel_preview(screen.id, live, offender, CombineMode::Intersect);
                self.update_resize_session(id, relations, |session| {
                    if !session.cancel_pending {
                        // The previous tick was the last valid state; that is what
                        // release must snap back to.
                        session.rollback = last_bounds;
                    }
                    session.cancel_pending = true;
                });
            }
            CascadeTick::Commit(moves) => {
                if was_cancel_pending {
                    host.clear_preview(screen.id);
                }
                self.dispatch_moves(host, &moves);
                self.update_resize_session(id, relations, |session| {
                    session.cancel_pending = false;
                });
            }
        }
    }

    fn update_resize_session(
        &mut self,
        id: TileId,
        relations: Vec<(SharedBorder, TileId)>,
        mutate: impl FnOnce(&mut ResizeSession),
    ) {
        if let Some(session) = self
            .registry
            .tile_mut(id)
            .and_then(|tile| tile.drag.resize.as_mut())
        {
            session.relations = relations;
            mutate(session);
        }
    }

    // ---- Shared helpers --------------------------------------------------

    /// Unlock a tile and let its locked siblings absorb the vacated slot.
    fn release_tile(&mut self, host: &dyn Host, id: TileId) {
        let Some(workspace) = self.active_workspace.clone() else {
            return;
        };
        let Some(tile) = self.registry.tile(id) else {
            return;
        };
        if !tile.is_locked() {
            return;
        }
        let vacated = tile.bounds();
        let Some(screen) = tile.screen() else {
            if let Some(tile) = self.registry.tile_mut(id) {
                tile.locked = false;
            }
            return;
        };
        let peers = self.registry.locked_peers(&workspace, screen, id);
        let moves = redistribution_moves(vacated, &peers);
        self.dispatch_moves(host, &moves);
        if let Some(tile) = self.registry.tile_mut(id) {
            tile.locked = false;
        }
        log::debug!("released {id:?}, redistributed to {} sibling(s)", moves.len());
    }

    /// Apply a computed move list: write each window's bounds through the host and
    /// mirror them in the registry.
    fn dispatch_moves(&mut self, host: &dyn Host, moves: &[(TileId, Rect)]) {
        for &(id, bounds) in moves {
            let Some(tile) = self.registry.tile_mut(id) else {
                log::warn!("move target {id:?} vanished, skipping");
                continue;
            };
            tile.bounds = bounds;
            host.apply_bounds(tile.window, bounds);
        }
    }
}
