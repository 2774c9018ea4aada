pub mod spotify;
pub mod track_store;
