use crate::fragment::RegionName;
use crate::query::{build_query, page_from_href, request_path, toggle_show_all, PageTarget};
use crate::{ControllerState, Effect, Msg, RefreshOrigin};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ControllerState, msg: Msg) -> (ControllerState, Vec<Effect>) {
    let effects = match msg {
        Msg::Initialized { location } => {
            state.set_location(location);
            let mut effects = Vec::new();
            // Controls start from the address so a deep link keeps its filters.
            let values = state.restore_controls_from_location();
            if state.profile().restore_from_location && !values.is_empty() {
                effects.push(Effect::RestoreControls { values });
            }
            if let Some(key) = state.profile().flash_key.clone() {
                effects.push(Effect::ConsumeFlash { key });
            }
            effects.extend(housekeeping(&state));
            effects
        }
        Msg::ControlChanged { control, value } => {
            let Some(key) = state
                .profile()
                .binding_for_control(&control)
                .map(|binding| binding.key.clone())
            else {
                return (state, Vec::new());
            };
            let drives_label = state.profile().month_label_key.as_deref() == Some(key.as_str());
            let cleared = if value.trim().is_empty() {
                Vec::new()
            } else {
                state.clear_excluded_controls(&key)
            };
            state.set_control(control, value);

            let mut effects = Vec::with_capacity(3);
            if !cleared.is_empty() {
                effects.push(Effect::RestoreControls { values: cleared });
            }
            if drives_label {
                effects.push(filter_info_effect(&state));
            }
            let target = if state.profile().reset_page_on_filter {
                PageTarget::Reset
            } else {
                PageTarget::Keep
            };
            effects.push(schedule(&mut state, target, RefreshOrigin::Filter));
            effects
        }
        Msg::PaginationClicked { href } => {
            let page = page_from_href(&href).unwrap_or(1);
            vec![schedule(
                &mut state,
                PageTarget::Goto(page),
                RefreshOrigin::Pagination,
            )]
        }
        Msg::DebounceElapsed { token } => match state.take_pending(token) {
            Some(pending) => {
                let query = build_query(
                    state.profile(),
                    &state.filters(),
                    state.location(),
                    pending.target,
                );
                let path = request_path(state.profile(), &query);
                let seq = state.issue(path.clone(), query.to_query_string(), pending.origin);
                vec![Effect::IssueRequest {
                    seq,
                    path,
                    origin: pending.origin,
                }]
            }
            // Superseded by a later trigger.
            None => Vec::new(),
        },
        Msg::ResponseReceived { seq, regions } => {
            let Some(request) = state.complete(seq) else {
                return (state, Vec::new());
            };
            if let Some(last_applied) = state.last_applied().filter(|last| seq <= *last) {
                return (state, vec![Effect::DiscardStale { seq, last_applied }]);
            }
            state.mark_applied(seq);

            let rebind = regions.contains(RegionName::Pagination);
            let mut effects = vec![Effect::ApplyRegions { seq, regions }];
            if state.profile().modal_cleanup {
                effects.push(Effect::CleanupModals);
            }
            if rebind {
                effects.push(Effect::RebindPagination);
            }
            if let Some(empty) = &state.profile().empty_state {
                effects.push(Effect::EnsureEmptyState {
                    row_id: empty.row_id.clone(),
                    message: empty.message.clone(),
                });
            }
            if state.profile().month_label_key.is_some() {
                effects.push(filter_info_effect(&state));
            }
            if state.profile().deep_link {
                state.set_location(request.query);
                effects.push(Effect::ReplaceAddress { path: request.path });
            }
            if request.origin == RefreshOrigin::Pagination && state.profile().scroll_on_paginate {
                effects.push(Effect::ScrollToTop);
            }
            effects
        }
        Msg::RequestFailed { seq, message } => {
            state.complete(seq);
            vec![Effect::ReportFailure { seq, message }]
        }
        Msg::ClearFiltersClicked => {
            state.clear_controls();
            vec![Effect::Navigate {
                path: state.profile().endpoint.clone(),
            }]
        }
        Msg::ShowAllToggled => match toggle_show_all(state.profile(), state.location()) {
            Some(path) => vec![Effect::Navigate { path }],
            None => Vec::new(),
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn schedule(state: &mut ControllerState, target: PageTarget, origin: RefreshOrigin) -> Effect {
    let delay_ms = state.profile().debounce_ms;
    let token = state.schedule(target, origin);
    Effect::ScheduleRefresh { token, delay_ms }
}

fn filter_info_effect(state: &ControllerState) -> Effect {
    let month = state
        .profile()
        .month_label_key
        .as_deref()
        .and_then(|key| state.filters().get(key).map(str::to_string));
    Effect::RefreshFilterInfo { month }
}

/// Effects that bring a freshly loaded page in line with the live regions.
fn housekeeping(state: &ControllerState) -> Vec<Effect> {
    let profile = state.profile();
    let mut effects = Vec::new();
    if profile.month_label_key.is_some() {
        effects.push(filter_info_effect(state));
    }
    if let Some(empty) = &profile.empty_state {
        effects.push(Effect::EnsureEmptyState {
            row_id: empty.row_id.clone(),
            message: empty.message.clone(),
        });
    }
    if profile.regions.contains(RegionName::Pagination) {
        effects.push(Effect::RebindPagination);
    }
    effects
}
