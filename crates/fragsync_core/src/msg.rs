use crate::fragment::RegionUpdates;

pub type RequestSeq = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Page finished loading with the given address-bar query.
    Initialized { location: String },
    /// A filter control fired `input` or `change`.
    ControlChanged { control: String, value: String },
    /// User clicked a link inside the pagination region.
    PaginationClicked { href: String },
    /// The debounce quiet period elapsed for the given schedule token.
    DebounceElapsed { token: u64 },
    /// The collaborator answered request `seq` with these regions.
    ResponseReceived { seq: RequestSeq, regions: RegionUpdates },
    /// Request `seq` failed in transport or produced an unusable document.
    RequestFailed { seq: RequestSeq, message: String },
    /// User clicked "clear filters".
    ClearFiltersClicked,
    /// User toggled "show all".
    ShowAllToggled,
    /// Fallback for placeholder wiring.
    NoOp,
}
