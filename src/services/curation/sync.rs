use crate::error::{CurationError, StorageError};
use crate::ports::spotify::{SpotifyApiPlaylist, SpotifyClient};
use crate::ports::track_store::TrackStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Snapshot length matched the remote total, nothing was fetched.
    Fresh,
    Refreshed { tracks: usize },
}

/// Bring the cached snapshot of a playlist up to date with Spotify.
///
/// The only cheap change signal Spotify gives us is the total track count, so a
/// snapshot is fresh when its length equals that total. A playlist that was
/// never cached is always fetched, even when it is empty. A corrupt snapshot is
/// replaced by a fresh fetch.
#[tracing::instrument(skip_all, fields(playlist = %playlist.name))]
pub async fn sync_playlist<C, S>(
    client: &C,
    store: &S,
    playlist: &SpotifyApiPlaylist,
) -> Result<SyncOutcome, CurationError>
where
    C: SpotifyClient + ?Sized,
    S: TrackStore + ?Sized,
{
    match store.load_cached(&playlist.name) {
        Ok(Some(cached)) if cached.len() == playlist.total_tracks => {
            return Ok(SyncOutcome::Fresh);
        }
        Ok(_) => {}
        Err(error @ StorageError::Corrupt { .. }) => {
            tracing::warn!("Replacing unreadable snapshot: {}", error);
        }
        Err(error) => return Err(error.into()),
    }

    tracing::info!(
        "Detected changes in playlist '{}'. Updating local cache.",
        playlist.name
    );

    let tracks = client.playlist_tracks(&playlist.id).await?;
    store.persist_snapshot(&playlist.name, &tracks)?;

    Ok(SyncOutcome::Refreshed {
        tracks: tracks.len(),
    })
}
