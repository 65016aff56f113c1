use std::collections::BTreeMap;

use url::{form_urlencoded, Url};

use crate::profile::ViewProfile;

pub const PAGE_KEY: &str = "page";

/// Ordered query parameters with `URLSearchParams`-like editing: `set`
/// keeps the position of an existing key, new keys go to the end.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryState {
    pairs: Vec<(String, String)>,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an address-bar query, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(idx) => {
                self.pairs[idx].1 = value;
                let mut seen = 0usize;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.pairs.push((key.to_string(), value.into()));
    }

    pub fn delete(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn page(&self) -> Option<u32> {
        self.get(PAGE_KEY).and_then(|p| p.trim().parse().ok())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Current control values, keyed by control id.
pub type ControlValues = BTreeMap<String, String>;

/// Filter values in registration order; empty values are kept so that the
/// query builder can delete their keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    entries: Vec<(String, String)>,
}

impl FilterSet {
    pub fn collect(profile: &ViewProfile, controls: &ControlValues) -> Self {
        let entries = profile
            .filters
            .iter()
            .map(|binding| {
                let raw = controls
                    .get(&binding.control)
                    .map(String::as_str)
                    .unwrap_or("");
                let value = if binding.trim { raw.trim() } else { raw };
                (binding.key.clone(), value.to_string())
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    /// Drop any `page` key (filters changed).
    Reset,
    /// Leave `page` as found in the base query.
    Keep,
    /// Navigate to the given page.
    Goto(u32),
}

/// Serializes filters plus pagination into the query for one refresh.
pub fn build_query(
    profile: &ViewProfile,
    filters: &FilterSet,
    location: &str,
    target: PageTarget,
) -> QueryState {
    let mut query = if profile.preserve_location {
        QueryState::parse(location)
    } else {
        QueryState::new()
    };

    if let PageTarget::Goto(page) = target {
        query.set(PAGE_KEY, page.max(1).to_string());
    }

    for (key, value) in filters.iter() {
        if value.is_empty() {
            query.delete(key);
        } else {
            query.set(key, value);
            for other in profile.excluded_by(key) {
                query.delete(other);
            }
        }
    }

    if target == PageTarget::Reset {
        query.delete(PAGE_KEY);
    }
    if profile.always_send_page && !query.contains(PAGE_KEY) {
        query.append(PAGE_KEY, "1");
    }
    query
}

/// Path plus query of a request or navigation target for this view.
pub fn request_path(profile: &ViewProfile, query: &QueryState) -> String {
    if query.is_empty() {
        profile.endpoint.clone()
    } else {
        format!("{}?{}", profile.endpoint, query.to_query_string())
    }
}

/// Flips the show-all flag of the current address query. Activating it
/// clears every key it excludes (the month filter in the bestseller view).
pub fn toggle_show_all(profile: &ViewProfile, location: &str) -> Option<String> {
    let key = profile.show_all_key.as_deref()?;
    let mut query = QueryState::parse(location);
    if query.get(key).is_some_and(|v| !v.is_empty()) {
        query.delete(key);
    } else {
        query.set(key, "1");
        for other in profile.excluded_by(key) {
            query.delete(other);
        }
    }
    Some(request_path(profile, &query))
}

/// Extracts the target page of a pagination link, which may be relative.
pub fn page_from_href(href: &str) -> Option<u32> {
    let base = Url::parse("http://localhost/").ok()?;
    let url = base.join(href.trim()).ok()?;
    let page = url
        .query_pairs()
        .find(|(k, _)| k == PAGE_KEY)
        .and_then(|(_, v)| v.trim().parse::<u32>().ok())?;
    (page > 0).then_some(page)
}
