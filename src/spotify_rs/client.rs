use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::TransportError;
use crate::spotify_rs::types::{
    Page, PlaylistTrackObject, RemoveTracksRequest, SpotifyPlaylist, SpotifyTrack, SpotifyUser,
    TrackUri,
};

const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Stop paging through a playlist after this many tracks.
pub const MAX_PLAYLIST_TRACKS: usize = 11_000;

/// Spotify accepts at most this many tracks per removal request.
const MAX_TRACKS_PER_REQUEST: usize = 100;

/// Spotify API client
pub struct SpotifyClient {
    access_token: String,
    client: reqwest::Client,
}

impl SpotifyClient {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, TransportError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// Get the current user's profile
    pub async fn get_current_user(&self) -> Result<SpotifyUser, TransportError> {
        self.get_json(&format!("{}/me", SPOTIFY_API_URL)).await
    }

    /// Get all playlists for the current user, including followed ones
    pub async fn get_user_playlists(&self) -> Result<Vec<SpotifyPlaylist>, TransportError> {
        let first_url = format!("{}/me/playlists?limit=50", SPOTIFY_API_URL);
        collect_pages(first_url, None, |url| async move {
            self.get_json::<Page<SpotifyPlaylist>>(&url).await
        })
        .await
    }

    /// Get one entry per playlist item. Removed tracks and episodes are `None`.
    pub async fn get_playlist_tracks(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<Option<SpotifyTrack>>, TransportError> {
        let first_url = format!(
            "{}/playlists/{}/tracks?limit=100",
            SPOTIFY_API_URL,
            urlencoding::encode(playlist_id)
        );
        let items: Vec<PlaylistTrackObject> =
            collect_pages(first_url, Some(MAX_PLAYLIST_TRACKS), |url| async move {
                self.get_json::<Page<PlaylistTrackObject>>(&url).await
            })
            .await?;

        Ok(items.into_iter().map(|item| item.track).collect())
    }

    /// Remove all occurrences of the given track ids from a playlist
    pub async fn remove_playlist_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), TransportError> {
        let url = format!(
            "{}/playlists/{}/tracks",
            SPOTIFY_API_URL,
            urlencoding::encode(playlist_id)
        );

        for chunk in track_ids.chunks(MAX_TRACKS_PER_REQUEST) {
            let body = removal_request(chunk);
            let response = self
                .client
                .delete(&url)
                .bearer_auth(&self.access_token)
                .json(&body)
                .timeout(Duration::from_secs(10))
                .send()
                .await?;
            check_status(response).await?;
        }

        Ok(())
    }
}

/// Follow `next` links starting at `first_url`, keeping at most `limit` items.
async fn collect_pages<T, F, Fut>(
    first_url: String,
    limit: Option<usize>,
    mut fetch_page: F,
) -> Result<Vec<T>, TransportError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>, TransportError>>,
{
    let mut items = Vec::new();
    let mut next_url = Some(first_url);

    while let Some(url) = next_url {
        let page = fetch_page(url).await?;
        items.extend(page.items);
        next_url = page.next;

        if let Some(limit) = limit {
            if items.len() >= limit {
                if items.len() > limit || next_url.is_some() {
                    tracing::warn!("More than {} items, ignoring the rest", limit);
                }
                items.truncate(limit);
                break;
            }
        }
    }

    Ok(items)
}

fn removal_request(track_ids: &[String]) -> RemoveTracksRequest {
    RemoveTracksRequest {
        tracks: track_ids
            .iter()
            .map(|id| TrackUri {
                uri: format!("spotify:track:{}", id),
            })
            .collect(),
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(TransportError::UnexpectedStatus {
        status: status.as_u16(),
        reason: response
            .text()
            .await
            .unwrap_or("Failed to get error text".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn page(items: Vec<u32>, next: Option<&str>) -> Page<u32> {
        Page {
            items,
            next: next.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_collect_pages_follows_next_links() {
        let pages = HashMap::from([
            ("first".to_string(), page(vec![1, 2], Some("second"))),
            ("second".to_string(), page(vec![3], Some("third"))),
            ("third".to_string(), page(vec![4, 5], None)),
        ]);
        let mut requested = Vec::new();

        let items = collect_pages("first".to_string(), None, |url| {
            requested.push(url.clone());
            let page = pages[&url].clone();
            async move { Ok::<_, TransportError>(page) }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(requested, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_collect_pages_stops_at_limit() {
        let mut fetched = 0;

        let items = collect_pages("page0".to_string(), Some(250), |_| {
            fetched += 1;
            let page = page(vec![7; 100], Some(&format!("page{}", fetched)));
            async move { Ok::<_, TransportError>(page) }
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 250);
        assert_eq!(fetched, 3);
    }

    #[tokio::test]
    async fn test_collect_pages_stops_on_error() {
        let mut fetched = 0;

        let result: Result<Vec<u32>, TransportError> =
            collect_pages("first".to_string(), None, |_| {
                fetched += 1;
                async move {
                    Err::<Page<u32>, _>(TransportError::UnexpectedStatus {
                        status: 429,
                        reason: "Too many requests".into(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(fetched, 1);
    }

    #[test]
    fn test_max_playlist_tracks() {
        assert_eq!(MAX_PLAYLIST_TRACKS, 11_000);
    }

    #[test]
    fn test_removal_request_uses_track_uris() {
        let body = removal_request(&["abc".to_string(), "def".to_string()]);

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "tracks": [
                    {"uri": "spotify:track:abc"},
                    {"uri": "spotify:track:def"}
                ]
            })
        );
    }
}
