use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::ports::spotify::SpotifyApiTrack;
use crate::ports::track_store::TrackStore;

/// Snapshots live in their own directory so no playlist name can clash with
/// other files in the cache dir, such as the auth token.
const SNAPSHOT_DIR: &str = "playlists";

/// Stores each playlist snapshot as `{dir}/{playlist name}.json`.
pub struct JsonTrackStore {
    cache_dir: PathBuf,
}

impl JsonTrackStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Store rooted at the `playlists` directory of the application cache dir.
    pub fn in_cache_dir(cache_dir: &Path) -> Self {
        Self::new(cache_dir.join(SNAPSHOT_DIR))
    }

    pub fn snapshot_path(&self, playlist_name: &str) -> PathBuf {
        let file_name: String = playlist_name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.cache_dir.join(format!("{}.json", file_name))
    }

    fn write_atomically(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.cache_dir)?;
        let mut file = NamedTempFile::new_in(&self.cache_dir)?;
        file.write_all(contents)?;
        file.flush()?;
        file.persist(path).map_err(|error| error.error)?;
        Ok(())
    }
}

impl TrackStore for JsonTrackStore {
    fn load_cached(&self, playlist_name: &str) -> Result<Option<Vec<SpotifyApiTrack>>, StorageError> {
        let path = self.snapshot_path(playlist_name);
        tracing::debug!("Loading playlist tracks from file: {}", path.display());

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Read { path, source }),
        };

        let tracks = serde_json::from_str(&contents)
            .map_err(|source| StorageError::Corrupt { path, source })?;
        Ok(Some(tracks))
    }

    fn persist_snapshot(
        &self,
        playlist_name: &str,
        tracks: &[SpotifyApiTrack],
    ) -> Result<(), StorageError> {
        let path = self.snapshot_path(playlist_name);
        tracing::info!("Saving playlist tracks to file: {}", path.display());

        let contents = serde_json::to_vec_pretty(tracks).map_err(|error| StorageError::Write {
            path: path.clone(),
            source: error.into(),
        })?;
        self.write_atomically(&path, &contents)
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::info!("Saved {} tracks to {}", tracks.len(), path.display());
        Ok(())
    }
}
