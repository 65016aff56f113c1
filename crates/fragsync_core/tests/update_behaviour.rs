use std::sync::Once;

use fragsync_core::{
    update, ControllerState, Effect, Msg, RefreshOrigin, RegionMode, RegionName, RegionUpdates,
    ViewKind, ViewProfile,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(fragsync_logging::initialize_for_tests);
}

fn initialized(kind: ViewKind, location: &str) -> ControllerState {
    let (state, _) = update(
        ControllerState::new(kind.profile()),
        Msg::Initialized {
            location: location.to_string(),
        },
    );
    state
}

fn change(state: ControllerState, control: &str, value: &str) -> (ControllerState, Vec<Effect>) {
    update(
        state,
        Msg::ControlChanged {
            control: control.to_string(),
            value: value.to_string(),
        },
    )
}

fn scheduled_token(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::ScheduleRefresh { token, .. } => Some(*token),
            _ => None,
        })
        .expect("schedule effect")
}

fn issued(effects: &[Effect]) -> (u64, String) {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::IssueRequest { seq, path, .. } => Some((*seq, path.clone())),
            _ => None,
        })
        .expect("issue effect")
}

fn table_rows(html: &str) -> RegionUpdates {
    let mut regions = RegionUpdates::new();
    regions.insert(RegionName::TableBody, RegionMode::Markup, html);
    regions
}

#[test]
fn control_change_schedules_with_default_quiet_period() {
    init_logging();
    let state = initialized(ViewKind::Sales, "");
    let (state, effects) = change(state, "categoryFilter", "Snacks");

    assert_eq!(
        effects,
        vec![Effect::ScheduleRefresh {
            token: 1,
            delay_ms: 300
        }]
    );
    assert!(state.view().refresh_pending);
}

#[test]
fn unknown_control_is_ignored() {
    init_logging();
    let state = initialized(ViewKind::Sales, "");
    let before = state.clone();

    let (state, effects) = change(state, "notAFilter", "x");

    assert_eq!(state, before);
    assert!(effects.is_empty());
}

#[test]
fn burst_of_changes_issues_one_request_with_latest_values() {
    init_logging();
    let state = initialized(ViewKind::Withdrawals, "");
    let (state, first) = change(state, "searchInput", "f");
    let (state, second) = change(state, "searchInput", "fl");
    let (state, third) = change(state, "searchInput", "flour");

    let stale_a = scheduled_token(&first);
    let stale_b = scheduled_token(&second);
    let live = scheduled_token(&third);

    let (state, effects) = update(state, Msg::DebounceElapsed { token: stale_a });
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::DebounceElapsed { token: stale_b });
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::DebounceElapsed { token: live });
    assert_eq!(
        effects,
        vec![Effect::IssueRequest {
            seq: 0,
            path: "/withdrawals/?q=flour&page=1".to_string(),
            origin: RefreshOrigin::Filter,
        }]
    );
    assert_eq!(state.view().in_flight, 1);
    assert!(!state.view().refresh_pending);

    // Firing the same token again does nothing.
    let (_state, effects) = update(state, Msg::DebounceElapsed { token: live });
    assert!(effects.is_empty());
}

#[test]
fn pagination_click_keeps_active_filters() {
    init_logging();
    let state = initialized(ViewKind::Sales, "");
    let (state, effects) = change(state, "categoryFilter", "Snacks");
    let (state, _) = update(
        state,
        Msg::DebounceElapsed {
            token: scheduled_token(&effects),
        },
    );

    let (state, effects) = update(
        state,
        Msg::PaginationClicked {
            href: "?page=3".to_string(),
        },
    );
    let (_state, effects) = update(
        state,
        Msg::DebounceElapsed {
            token: scheduled_token(&effects),
        },
    );

    let (_, path) = issued(&effects);
    assert_eq!(path, "/sales/?page=3&category=Snacks");
}

#[test]
fn pagination_link_without_page_goes_to_first_page() {
    init_logging();
    let state = initialized(ViewKind::HistoryLog, "");
    let (state, _) = change(state, "logFilter", "Deleted");
    let (state, effects) = update(
        state,
        Msg::PaginationClicked {
            href: "/historylog/?log=Other".to_string(),
        },
    );
    let (_state, effects) = update(
        state,
        Msg::DebounceElapsed {
            token: scheduled_token(&effects),
        },
    );

    assert_eq!(issued(&effects).1, "/historylog/?page=1&log=Deleted");
}

#[test]
fn applied_response_runs_view_housekeeping() {
    init_logging();
    let state = initialized(ViewKind::StockChanges, "");
    let (state, effects) = change(state, "itemSearch", "sugar");
    let (state, effects) = update(
        state,
        Msg::DebounceElapsed {
            token: scheduled_token(&effects),
        },
    );
    let (seq, path) = issued(&effects);
    let mut regions = table_rows("<tr><td>sugar</td></tr>");
    regions.insert(RegionName::Pagination, RegionMode::Markup, "<a href=\"?page=2\">2</a>");

    let (state, effects) = update(
        state,
        Msg::ResponseReceived {
            seq,
            regions: regions.clone(),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::ApplyRegions { seq, regions },
            Effect::CleanupModals,
            Effect::RebindPagination,
            Effect::EnsureEmptyState {
                row_id: "noStockChangesRow".to_string(),
                message: "No stock changes found".to_string(),
            },
            Effect::ReplaceAddress { path },
        ]
    );
    assert_eq!(state.location(), "item=sugar");
    assert_eq!(state.view().last_applied, Some(seq));
    assert_eq!(state.view().in_flight, 0);
}

#[test]
fn pagination_refresh_scrolls_but_filter_refresh_does_not() {
    init_logging();
    let state = initialized(ViewKind::Sales, "");
    let (state, effects) = update(
        state,
        Msg::PaginationClicked {
            href: "?page=2".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::DebounceElapsed {
            token: scheduled_token(&effects),
        },
    );
    let (seq, _) = issued(&effects);
    let (state, effects) = update(
        state,
        Msg::ResponseReceived {
            seq,
            regions: table_rows("<tr></tr>"),
        },
    );
    assert_eq!(effects.last(), Some(&Effect::ScrollToTop));

    let (state, effects) = change(state, "categoryFilter", "Snacks");
    let (state, effects) = update(
        state,
        Msg::DebounceElapsed {
            token: scheduled_token(&effects),
        },
    );
    let (seq, path) = issued(&effects);
    assert_eq!(path, "/sales/?category=Snacks");
    let (_state, effects) = update(
        state,
        Msg::ResponseReceived {
            seq,
            regions: table_rows("<tr></tr>"),
        },
    );
    assert!(!effects.contains(&Effect::ScrollToTop));
}

#[test]
fn deep_linked_location_feeds_the_next_request() {
    init_logging();
    let state = initialized(ViewKind::Sales, "month=2024-01");
    let (state, effects) = update(
        state,
        Msg::PaginationClicked {
            href: "?page=2&month=2024-01".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::DebounceElapsed {
            token: scheduled_token(&effects),
        },
    );
    let (seq, path) = issued(&effects);
    assert_eq!(path, "/sales/?month=2024-01&page=2");
    let (state, _) = update(
        state,
        Msg::ResponseReceived {
            seq,
            regions: table_rows("<tr></tr>"),
        },
    );
    assert_eq!(state.location(), "month=2024-01&page=2");
}

#[test]
fn address_filters_seed_controls_on_every_view() {
    init_logging();
    let (state, effects) = update(
        ControllerState::new(ViewKind::Sales.profile()),
        Msg::Initialized {
            location: "?category=Snacks&month=2024-05".to_string(),
        },
    );
    assert_eq!(state.control_value("categoryFilter"), Some("Snacks"));
    assert_eq!(state.control_value("dateFilter"), Some("2024-05"));
    // Sales controls are server-rendered, so nothing is written back.
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::RestoreControls { .. })));

    let (state, effects) = change(state, "categoryFilter", "Drinks");
    let (_state, effects) = update(
        state,
        Msg::DebounceElapsed {
            token: scheduled_token(&effects),
        },
    );
    let (_, path) = issued(&effects);
    assert_eq!(path, "/sales/?category=Drinks&month=2024-05");
}

fn report_profile(year_first: bool) -> ViewProfile {
    let profile = ViewProfile::new("report", "/reports/");
    let profile = if year_first {
        profile.filter("yearFilter", "year").filter("monthFilter", "month")
    } else {
        profile.filter("monthFilter", "month").filter("yearFilter", "year")
    };
    profile.exclusive("month", "year")
}

fn request_after(profile: ViewProfile, changes: &[(&str, &str)]) -> (String, Vec<Effect>) {
    let (mut state, _) = update(
        ControllerState::new(profile),
        Msg::Initialized {
            location: String::new(),
        },
    );
    let mut last = Vec::new();
    for (control, value) in changes {
        let (next, effects) = change(state, control, value);
        state = next;
        last = effects;
    }
    let (_state, effects) = update(
        state,
        Msg::DebounceElapsed {
            token: scheduled_token(&last),
        },
    );
    (issued(&effects).1, last)
}

#[test]
fn latest_exclusive_choice_wins_in_any_registration_order() {
    init_logging();
    for year_first in [true, false] {
        let (path, effects) = request_after(
            report_profile(year_first),
            &[("yearFilter", "2024"), ("monthFilter", "2024-05")],
        );
        assert_eq!(path, "/reports/?month=2024-05");
        assert_eq!(
            effects[0],
            Effect::RestoreControls {
                values: vec![("yearFilter".to_string(), String::new())]
            }
        );

        let (path, _) = request_after(
            report_profile(year_first),
            &[("monthFilter", "2024-05"), ("yearFilter", "2024")],
        );
        assert_eq!(path, "/reports/?year=2024");
    }
}

#[test]
fn emptying_a_control_keeps_its_exclusive_partner() {
    init_logging();
    let (path, effects) = request_after(
        report_profile(true),
        &[("yearFilter", "2024"), ("monthFilter", "")],
    );
    assert_eq!(path, "/reports/?year=2024");
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::RestoreControls { .. })));
}

#[test]
fn failures_leave_applied_state_untouched() {
    init_logging();
    let state = initialized(ViewKind::Expenses, "");
    let (state, effects) = change(state, "categoryFilter", "Rent");
    let (state, effects) = update(
        state,
        Msg::DebounceElapsed {
            token: scheduled_token(&effects),
        },
    );
    let (seq, _) = issued(&effects);
    let location_before = state.location().to_string();

    let (state, effects) = update(
        state,
        Msg::RequestFailed {
            seq,
            message: "network error".to_string(),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::ReportFailure {
            seq,
            message: "network error".to_string(),
        }]
    );
    assert_eq!(state.location(), location_before);
    assert_eq!(state.view().last_applied, None);
    assert_eq!(state.view().in_flight, 0);
}

#[test]
fn expenses_label_follows_month_control() {
    init_logging();
    let (state, effects) = update(
        ControllerState::new(ViewKind::Expenses.profile()),
        Msg::Initialized {
            location: String::new(),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::ConsumeFlash {
                key: "expenseSuccess".to_string()
            },
            Effect::RefreshFilterInfo { month: None },
            Effect::RebindPagination,
        ]
    );

    let (_state, effects) = change(state, "dateFilter", "2024-05");
    assert_eq!(
        effects[0],
        Effect::RefreshFilterInfo {
            month: Some("2024-05".to_string())
        }
    );
}

#[test]
fn stock_changes_restore_controls_from_address() {
    init_logging();
    let (state, effects) = update(
        ControllerState::new(ViewKind::StockChanges.profile()),
        Msg::Initialized {
            location: "?item=salt&date=2024-02-02&page=2".to_string(),
        },
    );

    assert_eq!(
        effects[0],
        Effect::RestoreControls {
            values: vec![
                ("itemSearch".to_string(), "salt".to_string()),
                ("dateFilter".to_string(), "2024-02-02".to_string()),
            ]
        }
    );
    assert_eq!(state.control_value("itemSearch"), Some("salt"));
}

#[test]
fn clear_filters_navigates_to_bare_endpoint() {
    init_logging();
    let state = initialized(ViewKind::StockChanges, "item=salt");
    let (state, _) = change(state, "categoryFilter", "Spices");

    let (state, effects) = update(state, Msg::ClearFiltersClicked);

    assert_eq!(
        effects,
        vec![Effect::Navigate {
            path: "/stock-changes/".to_string()
        }]
    );
    assert_eq!(state.control_value("categoryFilter"), Some(""));
}

#[test]
fn show_all_toggle_navigates_only_where_supported() {
    init_logging();
    let state = initialized(ViewKind::BestSellers, "month=2024-03");
    let (_state, effects) = update(state, Msg::ShowAllToggled);
    assert_eq!(
        effects,
        vec![Effect::Navigate {
            path: "/best-seller-products/?show_all=1".to_string()
        }]
    );

    let state = initialized(ViewKind::Products, "");
    let (_state, effects) = update(state, Msg::ShowAllToggled);
    assert!(effects.is_empty());
}
