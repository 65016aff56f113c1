//! Fragsync engine: fetching, region extraction and effect execution.
mod chart_client;
mod controller;
mod debounce;
mod decode;
mod fetch;
mod flash;
mod page;
mod regions;
mod types;

pub use chart_client::ChartClient;
pub use controller::{
    Clock, ControllerBuilder, FilterSyncController, NullObserver, SyncObserver,
};
pub use debounce::Debouncer;
pub use decode::{decode_body, DecodeError};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use flash::{take_flash, MemorySessionStore, SessionStore};
pub use page::{apply_regions, ensure_empty_state, rebind_pagination, LivePage, MemoryPage};
pub use regions::{count_rows, pagination_links, select_regions};
pub use types::{ControllerEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, SyncError};
