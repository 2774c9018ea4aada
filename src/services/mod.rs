pub mod curation;
pub mod spotify;
pub mod track_store;
