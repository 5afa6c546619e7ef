use ahash::HashMap;
use emath::Rect;

use super::host::WindowId;
use super::screen::ScreenId;
use super::tile::{Tile, TileId};

/// Single source of truth for tile state.
///
/// Tiles live in an id-keyed arena; workspaces and the staging list only hold
/// [`TileId`]s. No collection escapes this API, so every mutation funnels through
/// `&mut TileRegistry` — the exclusivity that replaces the original per-collection
/// locking.
#[derive(Debug, Default)]
pub struct TileRegistry {
    tiles: HashMap<TileId, Tile>,
    workspaces: HashMap<String, Vec<TileId>>,
    /// Tiles whose owning window has not yet reported a workspace.
    staging: Vec<TileId>,
    next_tile_id: u64,
}

impl TileRegistry {
    /// Track a new tile; it starts on the staging list until its window reports a
    /// workspace.
    pub(super) fn insert_staged(&mut self, tile: Tile) -> TileId {
        let id = TileId::from_u64(self.next_tile_id);
        self.next_tile_id += 1;
        self.tiles.insert(id, tile);
        self.staging.push(id);
        id
    }

    /// Move a staged tile into a workspace, creating the workspace entry if needed.
    /// Re-assigning an already classified tile moves it between workspaces.
    pub(super) fn assign_to_workspace(&mut self, id: TileId, workspace: &str) {
        self.staging.retain(|t| *t != id);
        for members in self.workspaces.values_mut() {
            members.retain(|t| *t != id);
        }
        self.ensure_workspace(workspace);
        if let Some(members) = self.workspaces.get_mut(workspace) {
            members.push(id);
        }
    }

    /// Missing workspace entries are repaired by lazily creating an empty one.
    pub(super) fn ensure_workspace(&mut self, workspace: &str) {
        if !self.workspaces.contains_key(workspace) {
            log::debug!("creating workspace entry '{workspace}'");
            self.workspaces.insert(workspace.to_owned(), Vec::new());
        }
    }

    pub(super) fn remove(&mut self, id: TileId) -> Option<Tile> {
        self.staging.retain(|t| *t != id);
        for members in self.workspaces.values_mut() {
            members.retain(|t| *t != id);
        }
        self.tiles.remove(&id)
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub(super) fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(&id)
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    /// O(n) scan; tile counts are tens, not thousands.
    pub fn find_by_window(&self, window: WindowId) -> Option<TileId> {
        self.tiles
            .iter()
            .find(|(_, tile)| tile.window() == window)
            .map(|(id, _)| *id)
    }

    pub fn workspace_tiles(&self, workspace: &str) -> &[TileId] {
        self.workspaces
            .get(workspace)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn staged_tiles(&self) -> &[TileId] {
        &self.staging
    }

    /// Locked tiles of `workspace` on `screen`, excluding `except`, with their bounds.
    pub(super) fn locked_peers(
        &self,
        workspace: &str,
        screen: ScreenId,
        except: TileId,
    ) -> Vec<(TileId, Rect)> {
        self.workspace_tiles(workspace)
            .iter()
            .filter(|id| **id != except)
            .filter_map(|id| self.tiles.get(id).map(|t| (*id, t)))
            .filter(|(_, t)| t.is_locked() && t.screen() == Some(screen))
            .map(|(id, t)| (id, t.bounds()))
            .collect()
    }
}
