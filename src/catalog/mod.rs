//! Playlist catalog: paginated loading from the provider and random song draws.

/// Catalog loading and sampling errors.
pub mod error;
/// HTTP-backed playlist source.
pub mod http;
/// Provider page documents.
pub mod models;

use std::collections::HashSet;

use futures::future::BoxFuture;
use rand::{rng, seq::IndexedRandom};
use tracing::{info, warn};

use crate::state::game::Song;

pub use self::error::{CatalogError, CatalogResult};
pub use self::http::HttpPlaylistSource;
use self::models::PlaylistPage;

/// Abstraction over where playlist pages come from.
pub trait PlaylistSource: Send + Sync {
    /// Fetch and decode the page at `uri`.
    fn fetch_page(&self, uri: &str) -> BoxFuture<'static, CatalogResult<PlaylistPage>>;
}

/// Immutable set of playable songs loaded once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    songs: Vec<Song>,
}

impl Catalog {
    /// Build a catalog, keeping only songs that carry a preview URI.
    pub fn new(songs: Vec<Song>) -> CatalogResult<Self> {
        let songs: Vec<Song> = songs.into_iter().filter(Song::is_playable).collect();
        if songs.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        Ok(Self { songs })
    }

    /// Playable songs in playlist order.
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Number of playable songs.
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Whether the catalog holds no song; never true for a built catalog.
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Draw a song uniformly at random. Draws are independent, so repeats happen.
    pub fn pick_random(&self) -> CatalogResult<Song> {
        self.songs
            .choose(&mut rng())
            .cloned()
            .ok_or(CatalogError::EmptyCatalog)
    }
}

/// Fetch every page reachable from `uri` and build the catalog from the concatenated songs.
///
/// Any failing page aborts the whole load.
pub async fn load_catalog(source: &dyn PlaylistSource, uri: &str) -> CatalogResult<Catalog> {
    let mut visited = HashSet::new();
    let mut songs = Vec::new();
    let mut next = uri.to_string();

    while !next.is_empty() {
        if !visited.insert(next.clone()) {
            return Err(CatalogError::PaginationLoop { uri: next });
        }

        let page = source.fetch_page(&next).await?;
        songs.extend(page.data.into_iter().map(Song::from));
        next = page.next;
    }

    let fetched = songs.len();
    let catalog = Catalog::new(songs)?;
    if catalog.len() < fetched {
        warn!(
            dropped = fetched - catalog.len(),
            "skipped songs without preview"
        );
    }
    info!(
        pages = visited.len(),
        songs = catalog.len(),
        "playlist catalog loaded"
    );

    Ok(catalog)
}
