use serde::{Deserialize, Serialize};

/// Spotify OAuth token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
    pub scope: String,
}

/// Spotify user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyUser {
    pub id: String,
    pub display_name: Option<String>,
}

/// Spotify playlist from API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    pub owner: SpotifyUser,
    pub tracks: SpotifyPlaylistTracks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyPlaylistTracks {
    pub total: usize,
}

/// Spotify track from API. Local files have no id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub id: Option<String>,
    pub name: String,
    pub artists: Vec<SpotifyArtist>,
    pub duration_ms: i64,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTrackObject {
    /// `None` for removed tracks and for podcast episodes.
    #[serde(default, deserialize_with = "deserialize_track")]
    pub track: Option<SpotifyTrack>,
}

/// Episodes share the `track` field but not its shape; treat them as absent.
fn deserialize_track<'de, D>(deserializer: D) -> Result<Option<SpotifyTrack>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(value) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match serde_json::from_value(value) {
        Ok(track) => Ok(Some(track)),
        Err(error) => {
            tracing::debug!("Skipping playlist item that is not a track: {}", error);
            Ok(None)
        }
    }
}

/// One page of a Spotify paging object.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackUri {
    pub uri: String,
}

/// Body of `DELETE /playlists/{id}/tracks`
#[derive(Debug, Clone, Serialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackUri>,
}

/// Token persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp, seconds.
    pub expires_at: i64,
}

impl CachedToken {
    pub fn from_response(
        response: SpotifyTokenResponse,
        previous_refresh_token: Option<String>,
    ) -> Self {
        Self {
            access_token: response.access_token,
            // Spotify may omit the refresh token when refreshing
            refresh_token: response.refresh_token.or(previous_refresh_token),
            expires_at: chrono::Utc::now().timestamp() + response.expires_in as i64,
        }
    }

    pub fn is_expired(&self) -> bool {
        // A minute of slack so the token doesn't expire mid run
        chrono::Utc::now().timestamp() >= self.expires_at - 60
    }
}
