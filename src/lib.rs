//! Geometric tiling for cooperating desktop windows.
//!
//! `tilekeep` keeps a set of top-level windows non-overlapping and edge-aligned
//! across one or more monitors. A user drags a window over a tiled one to split
//! that region and insert the window as a new tile; dwelling lets the split
//! absorb progressively larger neighbor groups. Resizing a tiled window cascades
//! the edge movement to every adjacent and aligned tile, validated and committed
//! atomically per tick with rollback on release. Closing or dragging away a tile
//! redistributes its area to its siblings.
//!
//! The crate is headless: the host integration layer translates native window
//! and pointer notifications into calls on [`Engine`] and implements [`Host`]
//! for bounds reads/writes, tick scheduling and preview overlays. See the
//! [`engine`] module for the event and threading contract.

#![forbid(unsafe_code)]

pub mod engine;

pub use engine::{
    CombineMode, DWELL_MS, Engine, EngineOptions, Host, SNAPSHOT_VERSION, Screen, ScreenId,
    ScreenMap, SharedBorder, SnapshotError, TICK_MS, TickKind, Tile, TileId, TileRegistry,
    TileSnapshot, WindowId, WindowInfo, WorkspaceSnapshot,
};
