pub mod classify;
pub mod disliked;
pub mod duplicates;
pub mod index;
pub mod queue;
mod removal;
pub mod sync;

pub use removal::RemovalMode;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CurationError, TransportError};
use crate::ports::spotify::{SpotifyApiPlaylist, SpotifyClient};
use crate::ports::track_store::TrackStore;
use crate::services::curation::disliked::{build_disliked_index, remove_disliked_tracks};
use crate::services::curation::duplicates::find_possible_duplicates;
use crate::services::curation::index::TrackIndex;
use crate::services::curation::queue::process_queue_playlist;
use crate::services::curation::sync::{SyncOutcome, sync_playlist};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sync,
    DislikedIndex,
    DislikedTracks,
    Queue,
    Duplicates,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Sync => "cache sync",
            Stage::DislikedIndex => "disliked index",
            Stage::DislikedTracks => "disliked track removal",
            Stage::Queue => "queue processing",
            Stage::Duplicates => "duplicate detection",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct PlaylistFailure {
    /// `None` when the failure was not tied to a single playlist.
    pub playlist: Option<String>,
    pub stage: Stage,
    pub error: CurationError,
}

/// What a pass over the user's playlists did.
#[derive(Debug, Default)]
pub struct RunReport {
    pub playlists: usize,
    /// Names of playlists whose snapshot was re-fetched.
    pub refreshed: Vec<String>,
    /// Playlist name to removed track ids, in removal order.
    pub removed: BTreeMap<String, Vec<String>>,
    /// Playlist name to sorted ids of probable duplicates.
    pub duplicates: BTreeMap<String, Vec<String>>,
    pub failures: Vec<PlaylistFailure>,
}

impl RunReport {
    fn record_failure(&mut self, playlist: Option<&str>, stage: Stage, error: CurationError) {
        match playlist {
            Some(name) => tracing::warn!(
                "Skipping playlist '{}' after {} failed: {}",
                name,
                stage,
                error
            ),
            None => tracing::error!("{} failed: {}", stage, error),
        }
        self.failures.push(PlaylistFailure {
            playlist: playlist.map(str::to_string),
            stage,
            error,
        });
    }

    fn record_removed(&mut self, playlist: &str, removed: Vec<String>) {
        if !removed.is_empty() {
            self.removed
                .entry(playlist.to_string())
                .or_default()
                .extend(removed);
        }
    }

    pub fn removed_count(&self) -> usize {
        self.removed.values().map(Vec::len).sum()
    }
}

/// Runs the curation rules over every playlist owned by one user.
///
/// Playlists are handled one after another. A failure in one playlist is
/// recorded in the report and the pass moves on to the next playlist.
pub struct CurationService<C: SpotifyClient, S: TrackStore> {
    client: C,
    store: S,
    owner_id: String,
    removal_mode: RemovalMode,
}

impl<C: SpotifyClient, S: TrackStore> CurationService<C, S> {
    pub fn new(client: C, store: S, owner_id: String) -> Self {
        Self {
            client,
            store,
            owner_id,
            removal_mode: RemovalMode::Apply,
        }
    }

    pub fn with_removal_mode(mut self, removal_mode: RemovalMode) -> Self {
        self.removal_mode = removal_mode;
        self
    }

    /// Playlists owned by the configured user. Followed playlists are left out.
    pub async fn owned_playlists(&self) -> Result<Vec<SpotifyApiPlaylist>, TransportError> {
        tracing::info!("Retrieving list of playlists from Spotify...");
        let playlists: Vec<SpotifyApiPlaylist> = self
            .client
            .current_user_playlists()
            .await?
            .into_iter()
            .filter(|playlist| playlist.owner_id == self.owner_id)
            .collect();
        tracing::info!("Retrieved {} playlists", playlists.len());
        Ok(playlists)
    }

    /// Refresh stale snapshots only.
    pub async fn sync(&self) -> Result<RunReport, TransportError> {
        let playlists = self.owned_playlists().await?;
        let mut report = RunReport {
            playlists: playlists.len(),
            ..Default::default()
        };
        self.sync_playlists(&playlists, &mut report).await;
        Ok(report)
    }

    /// Report probable duplicates from the cached snapshots, without syncing first.
    pub async fn duplicates(&self) -> Result<RunReport, TransportError> {
        let playlists = self.owned_playlists().await?;
        let mut report = RunReport {
            playlists: playlists.len(),
            ..Default::default()
        };
        for playlist in &playlists {
            if let Err((stage, error)) = self.report_duplicates(playlist, &mut report) {
                report.record_failure(Some(&playlist.name), stage, error);
            }
        }
        Ok(report)
    }

    /// Full pass: sync every playlist, then apply the disliked, queue and duplicate rules.
    pub async fn run(&self) -> Result<RunReport, TransportError> {
        let playlists = self.owned_playlists().await?;
        let mut report = RunReport {
            playlists: playlists.len(),
            ..Default::default()
        };

        let synced = self.sync_playlists(&playlists, &mut report).await;

        // Built only after every sync has finished writing.
        let disliked = match build_disliked_index(&self.store, &playlists) {
            Ok(index) => Some(index),
            Err(error) => {
                report.record_failure(None, Stage::DislikedIndex, error.into());
                None
            }
        };

        for playlist in synced {
            if let Err((stage, error)) = self
                .curate_playlist(playlist, disliked.as_ref(), &mut report)
                .await
            {
                report.record_failure(Some(&playlist.name), stage, error);
            }
        }

        tracing::info!(
            "Curated {} playlists: {} tracks removed, {} failures",
            report.playlists,
            report.removed_count(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Returns the playlists whose snapshot is now current.
    async fn sync_playlists<'a>(
        &self,
        playlists: &'a [SpotifyApiPlaylist],
        report: &mut RunReport,
    ) -> Vec<&'a SpotifyApiPlaylist> {
        tracing::info!("Updating local cache of playlists...");
        let mut synced = Vec::with_capacity(playlists.len());

        for playlist in playlists {
            match sync_playlist(&self.client, &self.store, playlist).await {
                Ok(SyncOutcome::Fresh) => synced.push(playlist),
                Ok(SyncOutcome::Refreshed { .. }) => {
                    report.refreshed.push(playlist.name.clone());
                    synced.push(playlist);
                }
                Err(error) => report.record_failure(Some(&playlist.name), Stage::Sync, error),
            }
        }

        synced
    }

    async fn curate_playlist(
        &self,
        playlist: &SpotifyApiPlaylist,
        disliked: Option<&TrackIndex>,
        report: &mut RunReport,
    ) -> Result<(), (Stage, CurationError)> {
        if let Some(disliked) = disliked {
            let removed = remove_disliked_tracks(
                &self.client,
                &self.store,
                playlist,
                disliked,
                self.removal_mode,
            )
            .await
                .map_err(|error| (Stage::DislikedTracks, error))?;
            report.record_removed(&playlist.name, removed);
        }

        let removed =
            process_queue_playlist(&self.client, &self.store, playlist, self.removal_mode)
                .await
            .map_err(|error| (Stage::Queue, error))?;
        report.record_removed(&playlist.name, removed);

        self.report_duplicates(playlist, report)
    }

    fn report_duplicates(
        &self,
        playlist: &SpotifyApiPlaylist,
        report: &mut RunReport,
    ) -> Result<(), (Stage, CurationError)> {
        let duplicates = find_possible_duplicates(&self.store, playlist)
            .map_err(|error| (Stage::Duplicates, error.into()))?;

        if !duplicates.is_empty() {
            let mut ids: Vec<String> = duplicates.into_iter().collect();
            ids.sort();
            report.duplicates.insert(playlist.name.clone(), ids);
        }
        Ok(())
    }
}
