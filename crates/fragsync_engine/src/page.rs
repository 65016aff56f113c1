use std::collections::BTreeMap;

use fragsync_core::{RegionMode, RegionName, RegionUpdates};

use crate::regions::{count_rows, escape_text, pagination_links};

/// The live document a controller keeps in sync. Browser bindings implement
/// this over the DOM; [`MemoryPage`] implements it in memory.
pub trait LivePage: Send {
    /// Inner markup of a region, `None` when the page lacks it.
    fn region_html(&self, region: RegionName) -> Option<String>;
    /// Replaces inner markup. Ignored for regions the page lacks.
    fn set_region_html(&mut self, region: RegionName, html: &str);
    /// Replaces text content only.
    fn set_region_text(&mut self, region: RegionName, text: &str);
    /// Number of header cells of the table a region belongs to.
    fn column_count(&self, region: RegionName) -> Option<usize>;
    /// Current address-bar query, without the leading `?`.
    fn address_query(&self) -> String;
    /// Rewrites the address bar without navigating.
    fn replace_address(&mut self, path: &str);
    /// Full navigation.
    fn navigate(&mut self, path: &str);
    /// Intercepts clicks on these pagination links from now on.
    fn bind_pagination_links(&mut self, hrefs: Vec<String>);
    fn set_control_value(&mut self, control: &str, value: &str);
    /// Removes overlays left behind by replaced modal dialogs.
    fn remove_modal_overlays(&mut self);
    fn scroll_to_top(&mut self);
}

/// Applies selected regions. Regions absent from `updates` are left as they
/// are.
pub fn apply_regions(page: &mut dyn LivePage, updates: &RegionUpdates) {
    for (region, update) in updates.iter() {
        if page.region_html(region).is_none() {
            continue;
        }
        match update.mode {
            RegionMode::Markup => page.set_region_html(region, &update.content),
            RegionMode::Text => page.set_region_text(region, &update.content),
        }
    }
}

/// Binds click interception to the links currently in the pagination region.
pub fn rebind_pagination(page: &mut dyn LivePage) -> usize {
    let Some(html) = page.region_html(RegionName::Pagination) else {
        return 0;
    };
    let links = pagination_links(&html);
    let count = links.len();
    page.bind_pagination_links(links);
    count
}

/// Inserts or removes the synthetic "no records" row depending on whether the
/// table body has real rows. Returns whether the placeholder is present.
pub fn ensure_empty_state(page: &mut dyn LivePage, row_id: &str, message: &str) -> bool {
    let Some(body) = page.region_html(RegionName::TableBody) else {
        return false;
    };
    let has_placeholder = body.contains(&format!("id=\"{row_id}\""));
    if count_rows(&body, row_id) == 0 {
        if !has_placeholder {
            let columns = page.column_count(RegionName::TableBody).unwrap_or(1).max(1);
            let row = format!(
                "<tr id=\"{row_id}\"><td colspan=\"{columns}\" class=\"text-center text-muted\">{}</td></tr>",
                escape_text(message)
            );
            page.set_region_html(RegionName::TableBody, &format!("{body}{row}"));
        }
        true
    } else {
        if has_placeholder {
            let trimmed = remove_row(&body, row_id);
            page.set_region_html(RegionName::TableBody, &trimmed);
        }
        false
    }
}

fn remove_row(body: &str, row_id: &str) -> String {
    let marker = format!("id=\"{row_id}\"");
    let Some(id_at) = body.find(&marker) else {
        return body.to_string();
    };
    let Some(start) = body[..id_at].rfind("<tr") else {
        return body.to_string();
    };
    match body[id_at..].find("</tr>") {
        Some(end) => format!("{}{}", &body[..start], &body[id_at + end + "</tr>".len()..]),
        None => body[..start].to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct RegionSlot {
    html: String,
    columns: Option<usize>,
}

/// In-memory page used by the console driver and tests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryPage {
    address: String,
    regions: BTreeMap<RegionName, RegionSlot>,
    controls: BTreeMap<String, String>,
    bound_links: Vec<String>,
    modal_overlays: usize,
    scroll_count: usize,
    navigations: Vec<String>,
}

impl MemoryPage {
    /// `address` is a path with optional query, e.g. `/sales/?page=2`.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn with_region(mut self, region: RegionName, html: impl Into<String>) -> Self {
        self.regions.insert(
            region,
            RegionSlot {
                html: html.into(),
                columns: None,
            },
        );
        self
    }

    pub fn with_table(mut self, html: impl Into<String>, columns: usize) -> Self {
        self.regions.insert(
            RegionName::TableBody,
            RegionSlot {
                html: html.into(),
                columns: Some(columns),
            },
        );
        self
    }

    pub fn with_modal_overlays(mut self, count: usize) -> Self {
        self.modal_overlays = count;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn region(&self, region: RegionName) -> Option<&str> {
        self.regions.get(&region).map(|slot| slot.html.as_str())
    }

    pub fn control(&self, control: &str) -> Option<&str> {
        self.controls.get(control).map(String::as_str)
    }

    pub fn bound_links(&self) -> &[String] {
        &self.bound_links
    }

    pub fn modal_overlays(&self) -> usize {
        self.modal_overlays
    }

    pub fn scroll_count(&self) -> usize {
        self.scroll_count
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }
}

impl LivePage for MemoryPage {
    fn region_html(&self, region: RegionName) -> Option<String> {
        self.region(region).map(str::to_string)
    }

    fn set_region_html(&mut self, region: RegionName, html: &str) {
        if let Some(slot) = self.regions.get_mut(&region) {
            slot.html = html.to_string();
        }
    }

    fn set_region_text(&mut self, region: RegionName, text: &str) {
        if let Some(slot) = self.regions.get_mut(&region) {
            slot.html = escape_text(text);
        }
    }

    fn column_count(&self, region: RegionName) -> Option<usize> {
        self.regions.get(&region).and_then(|slot| slot.columns)
    }

    fn address_query(&self) -> String {
        self.address
            .split_once('?')
            .map(|(_, query)| query.to_string())
            .unwrap_or_default()
    }

    fn replace_address(&mut self, path: &str) {
        self.address = path.to_string();
    }

    fn navigate(&mut self, path: &str) {
        self.address = path.to_string();
        self.navigations.push(path.to_string());
    }

    fn bind_pagination_links(&mut self, hrefs: Vec<String>) {
        self.bound_links = hrefs;
    }

    fn set_control_value(&mut self, control: &str, value: &str) {
        self.controls.insert(control.to_string(), value.to_string());
    }

    fn remove_modal_overlays(&mut self) {
        self.modal_overlays = 0;
    }

    fn scroll_to_top(&mut self) {
        self.scroll_count += 1;
    }
}
