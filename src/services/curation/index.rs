use std::collections::HashMap;

use crate::ports::spotify::SpotifyApiTrack;

/// Tracks keyed by track id.
pub type TrackIndex = HashMap<String, SpotifyApiTrack>;

/// Build an id lookup over a track list. Later tracks with a repeated id replace earlier ones.
/// Entries without an id are left out.
pub fn index_tracks<'a>(tracks: impl IntoIterator<Item = &'a SpotifyApiTrack>) -> TrackIndex {
    tracks
        .into_iter()
        .filter_map(|track| Some((track.id.clone()?, track.clone())))
        .collect()
}
