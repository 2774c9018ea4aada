use tempfile::TempDir;

use crate::ports::spotify::{SpotifyApiPlaylist, SpotifyApiTrack};
use crate::ports::track_store::TrackStore;
use crate::services::track_store::JsonTrackStore;

pub fn track(id: &str, name: &str, artist: &str, duration_ms: i64) -> SpotifyApiTrack {
    SpotifyApiTrack {
        id: Some(id.into()),
        name: name.into(),
        artists: vec![artist.into()],
        duration_ms,
        uri: format!("spotify:track:{}", id),
    }
}

/// A track where only the id matters.
pub fn track_with_id(id: &str) -> SpotifyApiTrack {
    track(id, &format!("Track {}", id), "Artist", 200000)
}

/// A local file: counted by Spotify, but without an id.
pub fn local_track(name: &str) -> SpotifyApiTrack {
    SpotifyApiTrack {
        id: None,
        name: name.into(),
        artists: vec![],
        duration_ms: 1000,
        uri: format!("spotify:local:::{}:1", name),
    }
}

pub fn playlist(id: &str, name: &str, total_tracks: usize) -> SpotifyApiPlaylist {
    SpotifyApiPlaylist {
        id: id.into(),
        name: name.into(),
        owner_id: "test_user".into(),
        total_tracks,
    }
}

/// A file-backed store in a fresh temp dir. Keep the `TempDir` alive for the test's duration.
pub fn temp_store() -> (TempDir, JsonTrackStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonTrackStore::new(dir.path().to_path_buf());
    (dir, store)
}

/// A file-backed store pre-seeded with snapshots.
pub fn seeded_store(snapshots: &[(&str, Vec<SpotifyApiTrack>)]) -> (TempDir, JsonTrackStore) {
    let (dir, store) = temp_store();
    for (name, tracks) in snapshots {
        store.persist_snapshot(name, tracks).unwrap();
    }
    (dir, store)
}
