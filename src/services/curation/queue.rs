use crate::error::CurationError;
use crate::ports::spotify::{SpotifyApiPlaylist, SpotifyClient};
use crate::ports::track_store::TrackStore;
use crate::services::curation::classify::{PlaylistKind, classify};
use crate::services::curation::index::index_tracks;
use crate::services::curation::removal::{RemovalMode, remove_matching_tracks};

/// Drop tracks from a queue playlist once they have landed in its base playlist.
///
/// "Favorites Queue" holds tracks not yet rated; when the user adds one to
/// "Favorites" it is removed from the queue. A base playlist that was never
/// cached removes nothing. Returns the removed ids.
#[tracing::instrument(skip_all, fields(playlist = %playlist.name))]
pub async fn process_queue_playlist<C, S>(
    client: &C,
    store: &S,
    playlist: &SpotifyApiPlaylist,
    mode: RemovalMode,
) -> Result<Vec<String>, CurationError>
where
    C: SpotifyClient + ?Sized,
    S: TrackStore + ?Sized,
{
    let PlaylistKind::Queue { base_name } = classify(&playlist.name) else {
        return Ok(Vec::new());
    };

    tracing::debug!("Scanning queue playlist '{}'", playlist.name);

    let destination = index_tracks(&store.load_snapshot(base_name)?);
    let snapshot = store.load_snapshot(&playlist.name)?;

    remove_matching_tracks(
        client,
        store,
        playlist,
        snapshot,
        mode,
        "Track found in destination",
        |id| destination.contains_key(id),
    )
    .await
}
