use std::collections::BTreeMap;

use crate::effect::RefreshOrigin;
use crate::msg::RequestSeq;
use crate::profile::ViewProfile;
use crate::query::{ControlValues, FilterSet, PageTarget, QueryState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingRefresh {
    pub token: u64,
    pub target: PageTarget,
    pub origin: RefreshOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IssuedRequest {
    pub path: String,
    pub query: String,
    pub origin: RefreshOrigin,
}

/// State of one filter-sync controller. Owned exclusively by its controller;
/// changed only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerState {
    profile: ViewProfile,
    controls: ControlValues,
    location: String,
    pending: Option<PendingRefresh>,
    next_token: u64,
    next_seq: RequestSeq,
    last_applied: Option<RequestSeq>,
    issued: BTreeMap<RequestSeq, IssuedRequest>,
}

/// Read-only snapshot for observers and tests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerView {
    pub view_name: String,
    pub location: String,
    pub controls: ControlValues,
    pub refresh_pending: bool,
    pub in_flight: usize,
    pub last_issued: Option<RequestSeq>,
    pub last_applied: Option<RequestSeq>,
}

impl ControllerState {
    pub fn new(profile: ViewProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    pub fn profile(&self) -> &ViewProfile {
        &self.profile
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn control_value(&self, control: &str) -> Option<&str> {
        self.controls.get(control).map(String::as_str)
    }

    pub fn filters(&self) -> FilterSet {
        FilterSet::collect(&self.profile, &self.controls)
    }

    pub fn view(&self) -> ControllerView {
        ControllerView {
            view_name: self.profile.name.clone(),
            location: self.location.clone(),
            controls: self.controls.clone(),
            refresh_pending: self.pending.is_some(),
            in_flight: self.issued.len(),
            last_issued: self.next_seq.checked_sub(1),
            last_applied: self.last_applied,
        }
    }

    pub(crate) fn set_location(&mut self, location: impl Into<String>) {
        let location = location.into();
        self.location = location.strip_prefix('?').unwrap_or(&location).to_string();
    }

    pub(crate) fn set_control(&mut self, control: String, value: String) {
        self.controls.insert(control, value);
    }

    pub(crate) fn clear_controls(&mut self) {
        for value in self.controls.values_mut() {
            value.clear();
        }
    }

    /// Empties every non-empty control whose key cannot be combined with
    /// `key`. Returns the cleared controls with their new (empty) values.
    pub(crate) fn clear_excluded_controls(&mut self, key: &str) -> Vec<(String, String)> {
        let mut cleared = Vec::new();
        for other in self.profile.excluded_by(key) {
            let Some(binding) = self.profile.binding_for_key(other) else {
                continue;
            };
            if let Some(value) = self.controls.get_mut(&binding.control) {
                if !value.is_empty() {
                    value.clear();
                    cleared.push((binding.control.clone(), String::new()));
                }
            }
        }
        cleared
    }

    /// Copies bound keys from the address query into their controls.
    pub(crate) fn restore_controls_from_location(&mut self) -> Vec<(String, String)> {
        let query = QueryState::parse(&self.location);
        let mut restored = Vec::new();
        for binding in &self.profile.filters {
            if let Some(value) = query.get(&binding.key).filter(|v| !v.is_empty()) {
                self.controls
                    .insert(binding.control.clone(), value.to_string());
                restored.push((binding.control.clone(), value.to_string()));
            }
        }
        restored
    }

    /// Replaces any pending refresh; the returned token identifies the new one.
    pub(crate) fn schedule(&mut self, target: PageTarget, origin: RefreshOrigin) -> u64 {
        self.next_token += 1;
        let token = self.next_token;
        self.pending = Some(PendingRefresh {
            token,
            target,
            origin,
        });
        token
    }

    /// Takes the pending refresh if `token` is still the current one.
    pub(crate) fn take_pending(&mut self, token: u64) -> Option<PendingRefresh> {
        match self.pending {
            Some(pending) if pending.token == token => self.pending.take(),
            _ => None,
        }
    }

    pub(crate) fn issue(&mut self, path: String, query: String, origin: RefreshOrigin) -> RequestSeq {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.issued.insert(seq, IssuedRequest {
            path,
            query,
            origin,
        });
        seq
    }

    pub(crate) fn complete(&mut self, seq: RequestSeq) -> Option<IssuedRequest> {
        self.issued.remove(&seq)
    }

    /// Sequence number of the newest response applied so far.
    pub fn last_applied(&self) -> Option<RequestSeq> {
        self.last_applied
    }

    pub(crate) fn mark_applied(&mut self, seq: RequestSeq) {
        self.last_applied = Some(seq);
    }
}
