use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use fragsync_core::{
    filter_info_label, update, ControllerState, ControllerView, Effect, FragmentMap, Msg,
    RegionName, RegionUpdates, RequestSeq, ViewProfile,
};
use fragsync_logging::{sync_debug, sync_error, sync_info, sync_trace, sync_warn};
use url::Url;

use crate::debounce::Debouncer;
use crate::decode::decode_body;
use crate::fetch::Fetcher;
use crate::flash::{take_flash, MemorySessionStore, SessionStore};
use crate::page::{apply_regions, ensure_empty_state, rebind_pagination, LivePage};
use crate::regions::select_regions;
use crate::{ControllerEvent, SyncError};

/// Receives controller notifications.
pub trait SyncObserver: Send + Sync {
    fn on_event(&self, event: ControllerEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SyncObserver for NullObserver {
    fn on_event(&self, _event: ControllerEvent) {}
}

pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct ControllerBuilder<P> {
    profile: ViewProfile,
    page: P,
    fetcher: Arc<dyn Fetcher>,
    base_url: Url,
    observer: Arc<dyn SyncObserver>,
    session: Arc<dyn SessionStore>,
    today: Clock,
}

impl<P: LivePage + 'static> ControllerBuilder<P> {
    pub fn observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn session_store(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = session;
        self
    }

    pub fn clock(mut self, today: Clock) -> Self {
        self.today = today;
        self
    }

    pub fn build(self) -> FilterSyncController<P> {
        FilterSyncController {
            inner: Arc::new(Inner {
                state: Mutex::new(ControllerState::new(self.profile)),
                page: Mutex::new(self.page),
                fetcher: self.fetcher,
                debouncer: Debouncer::new(),
                base_url: self.base_url,
                observer: self.observer,
                session: self.session,
                today: self.today,
            }),
        }
    }
}

struct Inner<P> {
    state: Mutex<ControllerState>,
    page: Mutex<P>,
    fetcher: Arc<dyn Fetcher>,
    debouncer: Debouncer,
    base_url: Url,
    observer: Arc<dyn SyncObserver>,
    session: Arc<dyn SessionStore>,
    today: Clock,
}

/// Keeps the regions of one list view in sync with its filter controls.
///
/// All entry points must be called from within a tokio runtime; timers and
/// requests run as spawned tasks.
pub struct FilterSyncController<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for FilterSyncController<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P: LivePage + 'static> FilterSyncController<P> {
    pub fn builder(
        profile: ViewProfile,
        page: P,
        fetcher: Arc<dyn Fetcher>,
        base_url: Url,
    ) -> ControllerBuilder<P> {
        ControllerBuilder {
            profile,
            page,
            fetcher,
            base_url,
            observer: Arc::new(NullObserver),
            session: Arc::new(MemorySessionStore::new()),
            today: Arc::new(|| Local::now().date_naive()),
        }
    }

    /// Binds to the page as loaded: restores controls, consumes flash
    /// messages, and settles the empty-state row and pagination links.
    pub fn initialize(&self) {
        let location = self.page().address_query();
        sync_info!("Initializing {} view", self.view().view_name);
        self.dispatch(Msg::Initialized { location });
    }

    pub fn control_changed(&self, control: &str, value: &str) {
        if self.lock_state().profile().binding_for_control(control).is_none() {
            sync_warn!("Ignoring change of unknown control {control:?}");
            return;
        }
        self.page().set_control_value(control, value);
        self.dispatch(Msg::ControlChanged {
            control: control.to_string(),
            value: value.to_string(),
        });
    }

    pub fn pagination_clicked(&self, href: &str) {
        self.dispatch(Msg::PaginationClicked {
            href: href.to_string(),
        });
    }

    pub fn clear_filters(&self) {
        self.dispatch(Msg::ClearFiltersClicked);
    }

    pub fn toggle_show_all(&self) {
        self.dispatch(Msg::ShowAllToggled);
    }

    pub fn view(&self) -> ControllerView {
        self.lock_state().view()
    }

    /// Runs `f` against the live page.
    pub fn with_page<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        let page = self.page();
        f(&*page)
    }

    pub fn dispatch(&self, msg: Msg) {
        sync_trace!("Dispatching {msg:?}");
        let effects = {
            let mut state = self.lock_state();
            let (next, effects) = update(mem::take(&mut *state), msg);
            *state = next;
            effects
        };

        let mut events = Vec::new();
        let mut deferred = Vec::new();
        {
            // Page effects of one response run as a unit, and only while
            // that response is still the newest applied one.
            let mut page = self.page();
            let last_applied = self.lock_state().last_applied();
            if let Some(seq) = superseded_apply(&effects, last_applied) {
                let last_applied = last_applied.unwrap_or(seq);
                sync_info!("Discarding superseded response {seq} (last applied {last_applied})");
                events.push(ControllerEvent::Discarded { seq, last_applied });
            } else {
                for effect in effects {
                    if let Some(effect) = self.run_on_page(&mut *page, effect, &mut events) {
                        deferred.push(effect);
                    }
                }
            }
        }

        for event in events {
            self.notify(event);
        }
        for effect in deferred {
            self.run(effect);
        }
    }

    /// Executes effects that touch the live page; everything else is handed
    /// back for [`run`](Self::run).
    fn run_on_page(
        &self,
        page: &mut P,
        effect: Effect,
        events: &mut Vec<ControllerEvent>,
    ) -> Option<Effect> {
        match effect {
            Effect::ApplyRegions { seq, regions } => {
                apply_regions(page, &regions);
                sync_debug!("Applied {} regions of request {seq}", regions.len());
                events.push(ControllerEvent::Applied { seq });
            }
            Effect::ReplaceAddress { path } => page.replace_address(&path),
            Effect::RebindPagination => {
                let bound = rebind_pagination(page);
                sync_trace!("Bound {bound} pagination links");
            }
            Effect::CleanupModals => page.remove_modal_overlays(),
            Effect::EnsureEmptyState { row_id, message } => {
                ensure_empty_state(page, &row_id, &message);
            }
            Effect::RefreshFilterInfo { month } => {
                let label = filter_info_label(month.as_deref(), (self.inner.today)());
                page.set_region_text(RegionName::FilterInfo, &label);
            }
            Effect::ScrollToTop => page.scroll_to_top(),
            Effect::RestoreControls { values } => {
                for (control, value) in values {
                    page.set_control_value(&control, &value);
                }
            }
            Effect::Navigate { path } => {
                self.inner.debouncer.cancel();
                page.navigate(&path);
                sync_info!("Navigating to {path}");
                events.push(ControllerEvent::Navigated { path });
            }
            other => return Some(other),
        }
        None
    }

    fn run(&self, effect: Effect) {
        match effect {
            Effect::ScheduleRefresh { token, delay_ms } => {
                let this = self.clone();
                self.inner
                    .debouncer
                    .schedule(Duration::from_millis(delay_ms), async move {
                        this.dispatch(Msg::DebounceElapsed { token });
                    });
            }
            Effect::IssueRequest { seq, path, .. } => self.issue(seq, &path),
            Effect::DiscardStale { seq, last_applied } => {
                sync_info!("Discarding stale response {seq} (last applied {last_applied})");
                self.notify(ControllerEvent::Discarded { seq, last_applied });
            }
            Effect::ReportFailure { seq, message } => {
                sync_error!("Error fetching {}: {message}", self.view().view_name);
                self.notify(ControllerEvent::Failed { seq, message });
            }
            Effect::ConsumeFlash { key } => {
                if let Some(message) = take_flash(self.inner.session.as_ref(), &key) {
                    sync_info!("Flash {key}: {message}");
                    self.notify(ControllerEvent::Flash { message });
                }
            }
            page_effect => sync_warn!("Page effect {page_effect:?} reached the task runner"),
        }
    }

    fn issue(&self, seq: RequestSeq, path: &str) {
        let url = match self.inner.base_url.join(path) {
            Ok(url) => url,
            Err(err) => {
                let err = SyncError::InvalidPath {
                    path: path.to_string(),
                    message: err.to_string(),
                };
                self.dispatch(Msg::RequestFailed {
                    seq,
                    message: err.to_string(),
                });
                return;
            }
        };
        sync_debug!("Request {seq}: GET {url}");
        self.notify(ControllerEvent::RequestIssued {
            seq,
            url: url.to_string(),
        });

        let regions = self.lock_state().profile().regions.clone();
        let this = self.clone();
        tokio::spawn(async move {
            let msg = match this.load(url.as_str(), &regions).await {
                Ok(regions) => Msg::ResponseReceived { seq, regions },
                Err(err) => Msg::RequestFailed {
                    seq,
                    message: err.to_string(),
                },
            };
            this.dispatch(msg);
        });
    }

    async fn load(&self, url: &str, map: &FragmentMap) -> Result<RegionUpdates, SyncError> {
        let output = self.inner.fetcher.fetch(url).await?;
        let html = decode_body(&output.bytes, output.metadata.content_type.as_deref())?;
        select_regions(&html, map)
    }

    fn notify(&self, event: ControllerEvent) {
        self.inner.observer.on_event(event);
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn page(&self) -> MutexGuard<'_, P> {
        self.inner.page.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The response an effect batch would apply, when a newer one has been
/// applied since the batch was produced.
fn superseded_apply(effects: &[Effect], last_applied: Option<RequestSeq>) -> Option<RequestSeq> {
    effects.iter().find_map(|effect| match effect {
        Effect::ApplyRegions { seq, .. } if last_applied != Some(*seq) => Some(*seq),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use fragsync_core::{Effect, RegionUpdates};

    use super::superseded_apply;

    fn batch(seq: u64) -> Vec<Effect> {
        vec![
            Effect::ApplyRegions {
                seq,
                regions: RegionUpdates::new(),
            },
            Effect::ReplaceAddress {
                path: format!("/sales/?page={seq}"),
            },
        ]
    }

    #[test]
    fn batch_of_the_newest_response_applies() {
        assert_eq!(superseded_apply(&batch(2), Some(2)), None);
        assert_eq!(superseded_apply(&[Effect::RebindPagination], Some(7)), None);
    }

    #[test]
    fn batch_overtaken_by_a_newer_response_is_dropped() {
        // Response 1 passed its sequencing check, then response 2 was applied
        // before response 1 reached the page.
        assert_eq!(superseded_apply(&batch(1), Some(2)), Some(1));
    }
}
