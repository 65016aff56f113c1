//! Fragsync core: pure controller state machine, view profiles and query building.
pub mod charts;
mod effect;
mod fragment;
mod label;
mod msg;
mod profile;
mod query;
mod state;
mod update;

pub use effect::{Effect, RefreshOrigin};
pub use fragment::{FragmentMap, RegionMode, RegionName, RegionSpec, RegionUpdate, RegionUpdates};
pub use label::{filter_info_label, month_name};
pub use msg::{Msg, RequestSeq};
pub use profile::{EmptyState, FilterBinding, ViewKind, ViewProfile, DEFAULT_DEBOUNCE_MS};
pub use query::{
    build_query, page_from_href, request_path, toggle_show_all, ControlValues, FilterSet,
    PageTarget, QueryState, PAGE_KEY,
};
pub use state::{ControllerState, ControllerView};
pub use update::update;
