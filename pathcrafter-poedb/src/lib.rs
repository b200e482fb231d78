//! poedb.tw lookup: name resolution, page fetching and extraction.
//!
//! - [`resolver`]: item name → page identifier, table first, ASCII guess second
//! - [`fetcher`]: one politely delayed GET per call, failures logged once
//! - [`extract`]: the selector ruleset applied to fetched HTML
//! - [`types`]: [`ItemRecord`], [`LeagueInfo`] and input classification
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use pathcrafter_poedb::{IdentifierResolver, PageSource, PoedbFetcher, PoedbSettings};
//!
//! let resolver = IdentifierResolver::bundled()?;
//! let fetcher = PoedbFetcher::new(&PoedbSettings::default())?;
//! if let Some(id) = resolver.resolve_identifier("카옴의 심장") {
//!     let item = fetcher.fetch_item(&id).await;
//!     println!("{item:?}");
//! }
//! # Ok(()) }
//! ```

pub mod extract;
pub mod fetcher;
pub mod resolver;
pub mod types;

pub use extract::{ExtractError, Extractor};
pub use fetcher::{FetchFailure, PageSource, PoedbFetcher, PoedbSettings, SetupError};
pub use resolver::{IdentifierResolver, IdentifierTable, Provenance, Resolution, TableError};
pub use types::{ItemQuery, ItemRecord, LeagueInfo, NO_DETAIL_MOD, Notice, REFERENCE_HOST};
