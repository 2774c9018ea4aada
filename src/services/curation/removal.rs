use std::collections::HashSet;

use crate::error::CurationError;
use crate::ports::spotify::{SpotifyApiPlaylist, SpotifyApiTrack, SpotifyClient};
use crate::ports::track_store::TrackStore;

/// Whether matching tracks are actually removed from Spotify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemovalMode {
    #[default]
    Apply,
    /// Log what would be removed. Neither Spotify nor the snapshot is touched.
    DryRun,
}

/// Issue one removal request per matching snapshot entry, in snapshot order.
///
/// Stops at the first failed request. Whatever was removed before that is
/// pruned from the stored snapshot so it keeps mirroring the remote playlist.
/// Entries without an id are never matched.
pub(super) async fn remove_matching_tracks<C, S, F>(
    client: &C,
    store: &S,
    playlist: &SpotifyApiPlaylist,
    snapshot: Vec<SpotifyApiTrack>,
    mode: RemovalMode,
    reason: &str,
    is_match: F,
) -> Result<Vec<String>, CurationError>
where
    C: SpotifyClient + ?Sized,
    S: TrackStore + ?Sized,
    F: Fn(&str) -> bool,
{
    let mut removed = Vec::new();
    let mut failure = None;

    for track in &snapshot {
        let Some(id) = track.id.as_deref().filter(|id| is_match(id)) else {
            continue;
        };

        tracing::info!(
            "{}: Artist:\"{}\" Name:\"{}\" URI:\"{}\"",
            reason,
            track.primary_artist(),
            track.name,
            track.uri
        );

        if mode == RemovalMode::DryRun {
            tracing::info!("Dry run: would remove {} from playlist {}", id, playlist.id);
            removed.push(id.to_string());
            continue;
        }

        if let Err(error) = client
            .remove_tracks(&playlist.id, &[id.to_string()])
            .await
        {
            failure = Some(error);
            break;
        }
        removed.push(id.to_string());
    }

    if mode == RemovalMode::Apply && !removed.is_empty() {
        let removed_ids: HashSet<&str> = removed.iter().map(String::as_str).collect();
        let remaining: Vec<SpotifyApiTrack> = snapshot
            .iter()
            .filter(|track| {
                !track
                    .id
                    .as_deref()
                    .is_some_and(|id| removed_ids.contains(id))
            })
            .cloned()
            .collect();
        store.persist_snapshot(&playlist.name, &remaining)?;
    }

    match failure {
        Some(error) => Err(error.into()),
        None => Ok(removed),
    }
}
