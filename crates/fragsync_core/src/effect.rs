use crate::fragment::RegionUpdates;
use crate::msg::RequestSeq;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace any pending timer with a new one.
    ScheduleRefresh { token: u64, delay_ms: u64 },
    IssueRequest {
        seq: RequestSeq,
        path: String,
        origin: RefreshOrigin,
    },
    ApplyRegions { seq: RequestSeq, regions: RegionUpdates },
    DiscardStale {
        seq: RequestSeq,
        last_applied: RequestSeq,
    },
    ReportFailure { seq: RequestSeq, message: String },
    /// Rewrite the address bar without navigating.
    ReplaceAddress { path: String },
    RebindPagination,
    CleanupModals,
    EnsureEmptyState { row_id: String, message: String },
    RefreshFilterInfo { month: Option<String> },
    ScrollToTop,
    RestoreControls { values: Vec<(String, String)> },
    ConsumeFlash { key: String },
    /// Full navigation; all client state is discarded.
    Navigate { path: String },
}

/// What triggered a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOrigin {
    Filter,
    Pagination,
}
