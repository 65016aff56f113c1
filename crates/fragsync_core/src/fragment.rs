use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical name of an independently refreshable page region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionName {
    TableBody,
    Pagination,
    Summary,
    Modals,
    Content,
    FilterInfo,
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegionName::TableBody => "table_body",
            RegionName::Pagination => "pagination",
            RegionName::Summary => "summary",
            RegionName::Modals => "modals",
            RegionName::Content => "content",
            RegionName::FilterInfo => "filter_info",
        };
        f.write_str(name)
    }
}

/// How a region's replacement is taken from the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionMode {
    /// Inner markup replaces inner markup.
    #[default]
    Markup,
    /// Only text content is copied over.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub name: RegionName,
    pub selector: String,
    #[serde(default)]
    pub mode: RegionMode,
}

/// Fixed mapping from region name to the selector that locates it, in both
/// the live page and a server response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentMap {
    regions: Vec<RegionSpec>,
}

impl FragmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markup(mut self, name: RegionName, selector: impl Into<String>) -> Self {
        self.insert(name, selector.into(), RegionMode::Markup);
        self
    }

    pub fn text(mut self, name: RegionName, selector: impl Into<String>) -> Self {
        self.insert(name, selector.into(), RegionMode::Text);
        self
    }

    fn insert(&mut self, name: RegionName, selector: String, mode: RegionMode) {
        self.regions.retain(|spec| spec.name != name);
        self.regions.push(RegionSpec {
            name,
            selector,
            mode,
        });
    }

    pub fn get(&self, name: RegionName) -> Option<&RegionSpec> {
        self.regions.iter().find(|spec| spec.name == name)
    }

    pub fn contains(&self, name: RegionName) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionSpec> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionUpdate {
    pub mode: RegionMode,
    pub content: String,
}

/// Regions found in one response. Regions missing from the response are
/// simply absent and leave the live page untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionUpdates {
    updates: BTreeMap<RegionName, RegionUpdate>,
}

impl RegionUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: RegionName, mode: RegionMode, content: impl Into<String>) {
        self.updates.insert(
            name,
            RegionUpdate {
                mode,
                content: content.into(),
            },
        );
    }

    pub fn get(&self, name: RegionName) -> Option<&RegionUpdate> {
        self.updates.get(&name)
    }

    pub fn contains(&self, name: RegionName) -> bool {
        self.updates.contains_key(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionName, &RegionUpdate)> {
        self.updates.iter().map(|(name, update)| (*name, update))
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}
