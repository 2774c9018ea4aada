use crate::error::TransportError;
use crate::ports::spotify::{SpotifyApiPlaylist, SpotifyApiTrack, SpotifyClient};
use crate::spotify_rs::client::SpotifyClient as SpotifyHttpClient;
use crate::spotify_rs::types::{SpotifyPlaylist, SpotifyTrack};

pub struct SpotifyHttpAdapter {
    client: SpotifyHttpClient,
}

impl SpotifyHttpAdapter {
    pub fn new(access_token: String) -> Self {
        Self {
            client: SpotifyHttpClient::new(access_token),
        }
    }
}

impl From<SpotifyPlaylist> for SpotifyApiPlaylist {
    fn from(playlist: SpotifyPlaylist) -> Self {
        Self {
            id: playlist.id,
            name: playlist.name,
            owner_id: playlist.owner.id,
            total_tracks: playlist.tracks.total,
        }
    }
}

/// Every playlist item becomes an entry so the snapshot length matches the
/// playlist total. Local files keep their details but have no id; removed
/// tracks and episodes become empty entries.
fn into_api_track(track: Option<SpotifyTrack>) -> SpotifyApiTrack {
    let Some(track) = track else {
        return SpotifyApiTrack {
            id: None,
            name: String::new(),
            artists: Vec::new(),
            duration_ms: 0,
            uri: String::new(),
        };
    };

    if track.id.is_none() {
        tracing::debug!("Local track without an id: {}", track.uri);
    }

    SpotifyApiTrack {
        id: track.id,
        name: track.name,
        artists: track.artists.into_iter().map(|artist| artist.name).collect(),
        duration_ms: track.duration_ms,
        uri: track.uri,
    }
}

#[async_trait::async_trait]
impl SpotifyClient for SpotifyHttpAdapter {
    async fn current_user_id(&self) -> Result<String, TransportError> {
        let user = self.client.get_current_user().await?;
        tracing::info!(
            "Successfully logged in as: {}",
            user.display_name.as_deref().unwrap_or(&user.id)
        );
        Ok(user.id)
    }

    async fn current_user_playlists(&self) -> Result<Vec<SpotifyApiPlaylist>, TransportError> {
        let playlists = self.client.get_user_playlists().await?;
        Ok(playlists.into_iter().map(SpotifyApiPlaylist::from).collect())
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<SpotifyApiTrack>, TransportError> {
        let tracks = self.client.get_playlist_tracks(playlist_id).await?;
        Ok(tracks.into_iter().map(into_api_track).collect())
    }

    async fn remove_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), TransportError> {
        self.client
            .remove_playlist_tracks(playlist_id, track_ids)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify_rs::types::{SpotifyArtist, SpotifyPlaylistTracks, SpotifyUser};

    #[test]
    fn test_playlist_conversion() {
        let playlist = SpotifyPlaylist {
            id: "pl1".into(),
            name: "Favorites".into(),
            owner: SpotifyUser {
                id: "me".into(),
                display_name: None,
            },
            tracks: SpotifyPlaylistTracks { total: 12 },
        };

        let converted = SpotifyApiPlaylist::from(playlist);

        assert_eq!(converted.owner_id, "me");
        assert_eq!(converted.total_tracks, 12);
    }

    #[test]
    fn test_track_conversion_keeps_artist_order() {
        let track = SpotifyTrack {
            id: Some("t1".into()),
            name: "Song".into(),
            artists: vec![
                SpotifyArtist {
                    name: "Main".into(),
                },
                SpotifyArtist {
                    name: "Feature".into(),
                },
            ],
            duration_ms: 123456,
            uri: "spotify:track:t1".into(),
        };

        let converted = into_api_track(Some(track));

        assert_eq!(converted.id.as_deref(), Some("t1"));
        assert_eq!(converted.primary_artist(), "Main");
        assert_eq!(converted.artists.len(), 2);
    }

    #[test]
    fn test_local_track_is_kept_without_id() {
        let track = SpotifyTrack {
            id: None,
            name: "Home recording".into(),
            artists: vec![],
            duration_ms: 1000,
            uri: "spotify:local:::Home+recording:1".into(),
        };

        let converted = into_api_track(Some(track));

        assert!(converted.id.is_none());
        assert_eq!(converted.name, "Home recording");
    }

    #[test]
    fn test_unavailable_item_becomes_empty_entry() {
        let converted = into_api_track(None);

        assert!(converted.id.is_none());
        assert!(converted.uri.is_empty());
    }
}
