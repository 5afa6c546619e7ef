use emath::Rect;

/// Bump when the snapshot layout changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum SnapshotError {
    UnsupportedVersion { found: u32, expected: u32 },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedVersion { found, expected } => {
                write!(
                    f,
                    "unsupported workspace snapshot version: {found} (expected {expected})"
                )
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

/// One saved tile. `key` is the host-supplied persistence key, stable across
/// sessions where the window handle is not.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TileSnapshot {
    pub key: String,
    pub bounds: Rect,
}

/// A saved tiling layout for one workspace.
///
/// Geometry only: no window handles, no screen ids. On restore, tiles are matched
/// back to windows by persistence key as the windows turn up, so a snapshot taken
/// on one monitor arrangement degrades gracefully on another.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WorkspaceSnapshot {
    pub version: u32,
    pub workspace: String,
    pub tiles: Vec<TileSnapshot>,
}

impl WorkspaceSnapshot {
    pub(super) fn new(workspace: String, tiles: Vec<TileSnapshot>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            workspace,
            tiles,
        }
    }

    /// Reject snapshots written by an incompatible build before any tile is
    /// matched against it.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }

    /// Saved bounds for a persistence key, if this snapshot has them.
    pub(super) fn lookup(&self, key: &str) -> Option<Rect> {
        self.tiles.iter().find(|t| t.key == key).map(|t| t.bounds)
    }
}

#[cfg(test)]
mod tests {
    use emath::{pos2, vec2};

    use super::*;

    fn snapshot() -> WorkspaceSnapshot {
        WorkspaceSnapshot::new(
            "main".to_owned(),
            vec![
                TileSnapshot {
                    key: "editor".to_owned(),
                    bounds: Rect::from_min_size(pos2(0.0, 0.0), vec2(600.0, 800.0)),
                },
                TileSnapshot {
                    key: "terminal".to_owned(),
                    bounds: Rect::from_min_size(pos2(600.0, 0.0), vec2(400.0, 800.0)),
                },
            ],
        )
    }

    #[test]
    fn lookup_finds_saved_bounds_by_key() {
        let snap = snapshot();
        assert_eq!(
            snap.lookup("terminal"),
            Some(Rect::from_min_size(pos2(600.0, 0.0), vec2(400.0, 800.0)))
        );
        assert_eq!(snap.lookup("browser"), None);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let mut snap = snapshot();
        assert!(snap.validate().is_ok());
        snap.version = SNAPSHOT_VERSION + 1;
        match snap.validate() {
            Err(SnapshotError::UnsupportedVersion { found, expected }) => {
                assert_eq!(found, SNAPSHOT_VERSION + 1);
                assert_eq!(expected, SNAPSHOT_VERSION);
            }
            Ok(()) => panic!("expected version error"),
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_roundtrips_through_json() {
        let snap = snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: WorkspaceSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
