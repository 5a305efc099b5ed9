use serde::Deserialize;

use crate::state::game::{Artist, Song};

/// One page of the upstream playlist document.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PlaylistPage {
    /// Song records carried by this page, in playlist order.
    #[serde(default)]
    pub data: Vec<SongRecord>,
    /// Total number of tracks announced by the provider.
    #[serde(default)]
    pub total: u64,
    /// URI of the following page; empty or absent on the last page.
    #[serde(default)]
    pub next: String,
}

/// Song record as published by the playlist provider.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SongRecord {
    /// Provider track identifier.
    pub id: u64,
    /// Preview audio URI, empty when the track cannot be previewed.
    #[serde(default)]
    pub preview: String,
    /// Title without version suffixes.
    pub title_short: String,
    /// Credited artist.
    pub artist: ArtistRecord,
}

/// Artist record nested in a [`SongRecord`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ArtistRecord {
    /// Display name.
    pub name: String,
    /// Picture URI, possibly empty.
    #[serde(default)]
    pub picture: String,
}

impl From<SongRecord> for Song {
    fn from(value: SongRecord) -> Self {
        Self {
            id: value.id,
            preview: value.preview,
            title: value.title_short,
            artist: Artist {
                name: value.artist.name,
                picture: value.artist.picture,
            },
        }
    }
}
