use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Decoupled representation of a Spotify playlist from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyApiPlaylist {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub total_tracks: usize,
}

/// Decoupled representation of a Spotify track from the API.
///
/// This is also the on-disk shape of a cached snapshot entry. Two tracks are
/// the same track when their `id` matches; the other fields are informational.
/// Local files, episodes and removed tracks have no `id`. They are kept so a
/// snapshot holds one entry per playlist item, but no rule ever touches them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyApiTrack {
    pub id: Option<String>,
    pub name: String,
    /// Ordered, the first entry is the primary artist.
    pub artists: Vec<String>,
    pub duration_ms: i64,
    pub uri: String,
}

impl SpotifyApiTrack {
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or_default()
    }
}

/// Port trait wrapping the Spotify API capabilities used by business logic.
///
/// Implementations live in `services::spotify::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SpotifyClient: Send + Sync {
    async fn current_user_id(&self) -> Result<String, TransportError>;

    async fn current_user_playlists(&self) -> Result<Vec<SpotifyApiPlaylist>, TransportError>;

    /// Fetch the full track list of a playlist, following pagination.
    /// Returns one entry per playlist item, playable or not.
    async fn playlist_tracks(&self, playlist_id: &str)
    -> Result<Vec<SpotifyApiTrack>, TransportError>;

    /// Remove every occurrence of the given track ids from a playlist.
    async fn remove_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), TransportError>;
}
