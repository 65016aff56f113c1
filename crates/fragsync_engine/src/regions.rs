use fragsync_core::{FragmentMap, RegionMode, RegionUpdates};
use scraper::{Html, Selector};

use crate::SyncError;

/// Picks every mapped region out of a server-rendered document.
///
/// Regions the document lacks are skipped. A document containing none of
/// them is treated as malformed.
pub fn select_regions(html: &str, map: &FragmentMap) -> Result<RegionUpdates, SyncError> {
    let document = Html::parse_document(html);
    let mut updates = RegionUpdates::new();

    for spec in map.iter() {
        let selector = parse_selector(&spec.selector)?;
        let Some(node) = document.select(&selector).next() else {
            continue;
        };
        let content = match spec.mode {
            RegionMode::Markup => node.inner_html(),
            RegionMode::Text => node.text().collect::<String>(),
        };
        updates.insert(spec.name, spec.mode, content);
    }

    if updates.is_empty() && !map.is_empty() {
        return Err(SyncError::MalformedResponse {
            expected: map.len(),
        });
    }
    Ok(updates)
}

/// `href`s of the anchors inside a pagination fragment, in document order.
pub fn pagination_links(fragment: &str) -> Vec<String> {
    let html = Html::parse_fragment(fragment);
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    html.select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

/// Counts `<tr>` rows of a table-body fragment, ignoring the row with
/// `excluded_id`.
pub fn count_rows(fragment: &str, excluded_id: &str) -> usize {
    // Rows only survive parsing inside a table context.
    let html = Html::parse_fragment(&format!("<table><tbody>{fragment}</tbody></table>"));
    let Ok(row) = Selector::parse("tr") else {
        return 0;
    };
    html.select(&row)
        .filter(|tr| tr.value().id() != Some(excluded_id))
        .count()
}

pub(crate) fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn parse_selector(selector: &str) -> Result<Selector, SyncError> {
    Selector::parse(selector).map_err(|_| SyncError::InvalidSelector {
        selector: selector.to_string(),
    })
}
