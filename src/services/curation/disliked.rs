use crate::error::{CurationError, StorageError};
use crate::ports::spotify::{SpotifyApiPlaylist, SpotifyClient};
use crate::ports::track_store::TrackStore;
use crate::services::curation::classify::{PlaylistKind, classify};
use crate::services::curation::index::{TrackIndex, index_tracks};
use crate::services::curation::removal::{RemovalMode, remove_matching_tracks};

/// Union the cached snapshots of every disliked playlist into a single index.
pub fn build_disliked_index<S>(
    store: &S,
    playlists: &[SpotifyApiPlaylist],
) -> Result<TrackIndex, StorageError>
where
    S: TrackStore + ?Sized,
{
    tracing::info!("Loading disliked tracks...");

    let mut disliked_tracks = Vec::new();
    for playlist in playlists
        .iter()
        .filter(|playlist| classify(&playlist.name) == PlaylistKind::Disliked)
    {
        disliked_tracks.extend(store.load_snapshot(&playlist.name)?);
    }

    tracing::info!("Loaded {} disliked tracks", disliked_tracks.len());
    Ok(index_tracks(&disliked_tracks))
}

/// Remove every track found in `disliked` from the cached contents of `playlist`.
///
/// Disliked playlists themselves are left alone. Works off the local snapshot,
/// so it is only as current as the last sync. Returns the removed ids.
#[tracing::instrument(skip_all, fields(playlist = %playlist.name))]
pub async fn remove_disliked_tracks<C, S>(
    client: &C,
    store: &S,
    playlist: &SpotifyApiPlaylist,
    disliked: &TrackIndex,
    mode: RemovalMode,
) -> Result<Vec<String>, CurationError>
where
    C: SpotifyClient + ?Sized,
    S: TrackStore + ?Sized,
{
    if classify(&playlist.name) == PlaylistKind::Disliked {
        return Ok(Vec::new());
    }

    tracing::debug!("Scanning for disliked tracks in playlist '{}'", playlist.name);

    let snapshot = store.load_snapshot(&playlist.name)?;
    remove_matching_tracks(
        client,
        store,
        playlist,
        snapshot,
        mode,
        "Disliked track found",
        |id| disliked.contains_key(id),
    )
    .await
}
