use std::collections::{HashMap, HashSet};

use crate::error::StorageError;
use crate::ports::spotify::{SpotifyApiPlaylist, SpotifyApiTrack};
use crate::ports::track_store::TrackStore;
use crate::services::curation::classify::{PlaylistKind, classify};

/// Two same-named tracks by the same artist are duplicates when their lengths differ by at most this much.
pub const DUPLICATE_DURATION_TOLERANCE_MS: i64 = 10_000;

fn duplicate_key(track: &SpotifyApiTrack) -> String {
    format!("{} - {}", track.name, track.primary_artist()).to_lowercase()
}

/// Find tracks that look like repeats of an earlier track in the list.
///
/// Only the first track seen for a name/artist key is ever compared against, and
/// it is never flagged itself. Entries without an id are ignored.
pub fn detect_duplicates(tracks: &[SpotifyApiTrack]) -> HashSet<String> {
    let mut first_seen: HashMap<String, &SpotifyApiTrack> = HashMap::new();
    let mut possible_duplicates = HashSet::new();

    for track in tracks {
        let Some(id) = track.id.as_ref() else {
            continue;
        };
        let key = duplicate_key(track);
        let Some(original) = first_seen.get(&key) else {
            first_seen.insert(key, track);
            continue;
        };

        if (original.duration_ms - track.duration_ms).abs() <= DUPLICATE_DURATION_TOLERANCE_MS {
            tracing::warn!(
                "Possible duplicate in playlist (by name and artist): {} - {}",
                track.primary_artist(),
                track.name
            );
            possible_duplicates.insert(id.clone());
        }
    }

    possible_duplicates
}

/// Report probable duplicates in the cached snapshot of a playlist. Nothing is removed.
pub fn find_possible_duplicates<S>(
    store: &S,
    playlist: &SpotifyApiPlaylist,
) -> Result<HashSet<String>, StorageError>
where
    S: TrackStore + ?Sized,
{
    if classify(&playlist.name) == PlaylistKind::Disliked {
        return Ok(HashSet::new());
    }

    let snapshot = store.load_snapshot(&playlist.name)?;
    Ok(detect_duplicates(&snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::track_store::MockTrackStore;
    use crate::test_utils::{local_track, playlist, seeded_store, track};

    #[test]
    fn test_close_durations_are_duplicates() {
        let tracks = vec![track("1", "A", "X", 10000), track("2", "A", "X", 10001)];

        assert_eq!(detect_duplicates(&tracks), HashSet::from(["2".to_string()]));
    }

    #[test]
    fn test_distant_durations_are_not_duplicates() {
        let tracks = vec![track("1", "A", "X", 10000), track("2", "A", "X", 20001)];

        assert!(detect_duplicates(&tracks).is_empty());
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let tracks = vec![track("1", "A", "X", 10000), track("2", "A", "X", 20000)];

        assert_eq!(detect_duplicates(&tracks), HashSet::from(["2".to_string()]));
    }

    #[test]
    fn test_key_ignores_case() {
        let tracks = vec![
            track("1", "Hey Jude", "The Beatles", 431000),
            track("2", "HEY JUDE", "the beatles", 425000),
        ];

        assert_eq!(detect_duplicates(&tracks), HashSet::from(["2".to_string()]));
    }

    #[test]
    fn test_different_artist_is_not_a_duplicate() {
        let tracks = vec![
            track("1", "Hallelujah", "Leonard Cohen", 280000),
            track("2", "Hallelujah", "Jeff Buckley", 281000),
        ];

        assert!(detect_duplicates(&tracks).is_empty());
    }

    #[test]
    fn test_only_first_occurrence_is_the_baseline() {
        // 3 is close to 2 but not to 1, and 2 never becomes the baseline.
        let tracks = vec![
            track("1", "Song", "Band", 100000),
            track("2", "Song", "Band", 200000),
            track("3", "Song", "Band", 205000),
            track("4", "Song", "Band", 95000),
        ];

        assert_eq!(detect_duplicates(&tracks), HashSet::from(["4".to_string()]));
    }

    #[test]
    fn test_track_without_artists() {
        let mut first = track("1", "Intro", "", 60000);
        first.artists.clear();
        let mut second = track("2", "Intro", "", 61000);
        second.artists.clear();

        assert_eq!(
            detect_duplicates(&[first, second]),
            HashSet::from(["2".to_string()])
        );
    }

    #[test]
    fn test_entries_without_id_are_ignored() {
        let tracks = vec![
            local_track("Demo"),
            local_track("Demo"),
            track("1", "Demo", "", 1000),
        ];

        assert!(detect_duplicates(&tracks).is_empty());
    }

    #[test]
    fn test_find_possible_duplicates_reads_snapshot() {
        let (_dir, store) = seeded_store(&[(
            "Favorites",
            vec![
                track("1", "A", "X", 10000),
                track("2", "B", "Y", 10000),
                track("3", "a", "x", 12000),
            ],
        )]);

        let duplicates = find_possible_duplicates(&store, &playlist("f1", "Favorites", 3)).unwrap();

        assert_eq!(duplicates, HashSet::from(["3".to_string()]));
    }

    #[test]
    fn test_disliked_playlists_are_skipped() {
        let mut store = MockTrackStore::new();
        store.expect_load_snapshot().never();
        store.expect_load_cached().never();

        let duplicates =
            find_possible_duplicates(&store, &playlist("d1", "disliked_rock", 2)).unwrap();

        assert!(duplicates.is_empty());
    }
}
