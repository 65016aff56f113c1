use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fragment::{FragmentMap, RegionName};

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

const SHOW_ALL_KEY: &str = "show_all";

/// Built-in list views of the business application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Sales,
    Expenses,
    Withdrawals,
    StockChanges,
    HistoryLog,
    Products,
    ProductBatches,
    ProductInventory,
    RawMaterials,
    RawMaterialBatches,
    RawMaterialInventory,
    BestSellers,
}

impl ViewKind {
    pub const ALL: [ViewKind; 12] = [
        ViewKind::Sales,
        ViewKind::Expenses,
        ViewKind::Withdrawals,
        ViewKind::StockChanges,
        ViewKind::HistoryLog,
        ViewKind::Products,
        ViewKind::ProductBatches,
        ViewKind::ProductInventory,
        ViewKind::RawMaterials,
        ViewKind::RawMaterialBatches,
        ViewKind::RawMaterialInventory,
        ViewKind::BestSellers,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Sales => "sales",
            ViewKind::Expenses => "expenses",
            ViewKind::Withdrawals => "withdrawals",
            ViewKind::StockChanges => "stock_changes",
            ViewKind::HistoryLog => "history_log",
            ViewKind::Products => "products",
            ViewKind::ProductBatches => "product_batches",
            ViewKind::ProductInventory => "product_inventory",
            ViewKind::RawMaterials => "raw_materials",
            ViewKind::RawMaterialBatches => "raw_material_batches",
            ViewKind::RawMaterialInventory => "raw_material_inventory",
            ViewKind::BestSellers => "best_sellers",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(&wanted))
    }

    pub fn profile(self) -> ViewProfile {
        match self {
            ViewKind::Sales => ViewProfile::new(self.name(), "/sales/")
                .filter("categoryFilter", "category")
                .filter("dateFilter", "month")
                .regions(standard_regions("#salesTableBody").markup(RegionName::Summary, "#salesSummary"))
                .preserve_location()
                .deep_link()
                .scroll_on_paginate(),
            ViewKind::Expenses => ViewProfile {
                month_label_key: Some("month".to_string()),
                flash_key: Some("expenseSuccess".to_string()),
                ..ViewProfile::new(self.name(), "/expenses/")
                    .filter("categoryFilter", "category")
                    .filter("dateFilter", "month")
                    .regions(
                        standard_regions("#expensesTableBody")
                            .markup(RegionName::Summary, "#expensesSummary")
                            .text(RegionName::FilterInfo, "#currentMonthDisplay"),
                    )
                    .preserve_location()
                    .deep_link()
                    .scroll_on_paginate()
            },
            ViewKind::Withdrawals => ViewProfile {
                always_send_page: true,
                ..ViewProfile::new(self.name(), "/withdrawals/")
                    .trimmed_filter("searchInput", "q")
                    .filter("itemTypeFilter", "item_type")
                    .filter("reasonFilter", "reason")
                    .filter("dateFilter", "date")
                    .regions(standard_regions("#withdrawalTableBody"))
            },
            ViewKind::StockChanges => ViewProfile {
                empty_state: Some(EmptyState {
                    row_id: "noStockChangesRow".to_string(),
                    message: "No stock changes found".to_string(),
                }),
                modal_cleanup: true,
                flash_key: Some("stockChangeSuccess".to_string()),
                restore_from_location: true,
                ..ViewProfile::new(self.name(), "/stock-changes/")
                    .trimmed_filter("itemSearch", "item")
                    .filter("categoryFilter", "category")
                    .filter("dateFilter", "date")
                    .regions(
                        standard_regions("#stockChangesTableBody")
                            .markup(RegionName::Modals, "#stockChangeModalsContainer"),
                    )
                    .preserve_location()
                    .deep_link()
                    .scroll_on_paginate()
            },
            ViewKind::HistoryLog => ViewProfile::new(self.name(), "/historylog/")
                .filter("adminFilter", "admin")
                .filter("logFilter", "log")
                .filter("dateFilter", "date")
                .regions(standard_regions("#historyTableBody")),
            ViewKind::Products => ViewProfile::new(self.name(), "/products/")
                .trimmed_filter("searchInput", "q")
                .filter("dateInput", "date_created")
                .regions(
                    FragmentMap::new()
                        .markup(RegionName::TableBody, "#productsTableBody")
                        .markup(RegionName::Pagination, ".pagination"),
                ),
            ViewKind::ProductBatches => ViewProfile::new(self.name(), "/prodbatch/")
                .trimmed_filter("batchSearchInput", "q")
                .filter("batchDateFilter", "month")
                .regions(standard_regions("#batchTableBody")),
            ViewKind::ProductInventory => ViewProfile::new(self.name(), "/product-inventory/")
                .trimmed_filter("searchInput", "q")
                .regions(
                    FragmentMap::new()
                        .markup(RegionName::TableBody, "#inventoryTableBody")
                        .markup(RegionName::Pagination, ".pagination"),
                ),
            ViewKind::RawMaterials => ViewProfile::new(self.name(), "/rawmaterials/")
                .trimmed_filter("rawMaterialSearchInput", "q")
                .regions(standard_regions("#rawMaterialTableBody")),
            ViewKind::RawMaterialBatches => ViewProfile::new(self.name(), "/rawmatbatch/")
                .trimmed_filter("batchSearchInput", "q")
                .regions(standard_regions("#batchTableBody")),
            ViewKind::RawMaterialInventory => {
                ViewProfile::new(self.name(), "/rawmaterial-inventory/")
                    .trimmed_filter("inventorySearchInput", "q")
                    .regions(standard_regions("#inventoryTableBody"))
            }
            ViewKind::BestSellers => ViewProfile {
                show_all_key: Some(SHOW_ALL_KEY.to_string()),
                ..ViewProfile::new(self.name(), "/best-seller-products/")
                    .filter("monthFilter", "month")
                    .regions(
                        FragmentMap::new()
                            .markup(RegionName::Content, "#bestsellerContent")
                            .text(RegionName::FilterInfo, "#filterInfo"),
                    )
                    .preserve_location()
                    .exclusive("month", SHOW_ALL_KEY)
            },
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn standard_regions(table_body: &str) -> FragmentMap {
    FragmentMap::new()
        .markup(RegionName::TableBody, table_body)
        .markup(RegionName::Pagination, ".pagination-container")
}

/// One input control wired to one query key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterBinding {
    pub control: String,
    pub key: String,
    /// Free-text inputs are trimmed before use.
    #[serde(default)]
    pub trim: bool,
}

/// Synthetic row shown when the table body has no records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyState {
    pub row_id: String,
    pub message: String,
}

/// Everything the controller needs to know about one list view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewProfile {
    pub name: String,
    pub endpoint: String,
    /// Registration order defines serialization order for fresh queries.
    pub filters: Vec<FilterBinding>,
    pub regions: FragmentMap,
    /// Start from the current address query instead of an empty one.
    pub preserve_location: bool,
    /// Always write a `page` key, defaulting to 1.
    pub always_send_page: bool,
    /// A filter change drops the `page` key.
    pub reset_page_on_filter: bool,
    /// Replace the address bar with each applied request.
    pub deep_link: bool,
    /// Pairs of keys that cannot both be set.
    pub exclusions: Vec<(String, String)>,
    pub scroll_on_paginate: bool,
    pub empty_state: Option<EmptyState>,
    pub modal_cleanup: bool,
    /// Query key whose `YYYY-MM` value drives the local filter-info label.
    pub month_label_key: Option<String>,
    pub flash_key: Option<String>,
    pub restore_from_location: bool,
    pub show_all_key: Option<String>,
    pub debounce_ms: u64,
}

impl ViewProfile {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            reset_page_on_filter: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            ..Self::default()
        }
    }

    pub fn filter(mut self, control: impl Into<String>, key: impl Into<String>) -> Self {
        self.filters.push(FilterBinding {
            control: control.into(),
            key: key.into(),
            trim: false,
        });
        self
    }

    pub fn trimmed_filter(mut self, control: impl Into<String>, key: impl Into<String>) -> Self {
        self.filters.push(FilterBinding {
            control: control.into(),
            key: key.into(),
            trim: true,
        });
        self
    }

    pub fn regions(mut self, regions: FragmentMap) -> Self {
        self.regions = regions;
        self
    }

    pub fn preserve_location(mut self) -> Self {
        self.preserve_location = true;
        self
    }

    pub fn deep_link(mut self) -> Self {
        self.deep_link = true;
        self
    }

    pub fn scroll_on_paginate(mut self) -> Self {
        self.scroll_on_paginate = true;
        self
    }

    pub fn exclusive(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.exclusions.push((a.into(), b.into()));
        self
    }

    pub fn binding_for_control(&self, control: &str) -> Option<&FilterBinding> {
        self.filters.iter().find(|binding| binding.control == control)
    }

    pub fn binding_for_key(&self, key: &str) -> Option<&FilterBinding> {
        self.filters.iter().find(|binding| binding.key == key)
    }

    /// Keys that must be cleared when `key` receives a value.
    pub fn excluded_by<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.exclusions.iter().filter_map(move |(a, b)| {
            if a == key {
                Some(b.as_str())
            } else if b == key {
                Some(a.as_str())
            } else {
                None
            }
        })
    }
}
