use crate::error::StorageError;
use crate::ports::spotify::SpotifyApiTrack;

/// Port trait for the local snapshot cache, keyed by playlist name.
///
/// Implementations live in `services::track_store` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
pub trait TrackStore: Send + Sync {
    /// Load a snapshot, `None` when no snapshot has ever been persisted.
    fn load_cached(&self, playlist_name: &str) -> Result<Option<Vec<SpotifyApiTrack>>, StorageError>;

    /// Overwrite the snapshot for a playlist.
    fn persist_snapshot(
        &self,
        playlist_name: &str,
        tracks: &[SpotifyApiTrack],
    ) -> Result<(), StorageError>;

    /// Load a snapshot, treating a missing one as empty.
    fn load_snapshot(&self, playlist_name: &str) -> Result<Vec<SpotifyApiTrack>, StorageError> {
        Ok(self.load_cached(playlist_name)?.unwrap_or_default())
    }
}
