mod config;
mod console;
mod dashboard;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use fragsync_core::charts::{ChartBoard, Theme};
use fragsync_core::{RegionName, ViewProfile};
use fragsync_engine::{
    ChartClient, ControllerEvent, FilterSyncController, MemoryPage, ReqwestFetcher, SyncObserver,
};
use fragsync_logging::{sync_error, sync_info, sync_warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use config::{AppConfig, DEFAULT_CONFIG_FILE};
use console::ConsoleCommand;
use dashboard::{describe, Dashboard};

#[derive(Parser, Debug)]
#[command(
    name = "fragsync",
    version,
    about = "Drives a filter-sync controller for one list view from the console."
)]
struct CliArgs {
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Overrides `base_url` from the config file.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Overrides `view` from the config file.
    #[arg(long, value_name = "NAME")]
    view: Option<String>,
}

struct ConsoleObserver;

impl SyncObserver for ConsoleObserver {
    fn on_event(&self, event: ControllerEvent) {
        match event {
            ControllerEvent::RequestIssued { seq, url } => println!("-> #{seq} {url}"),
            ControllerEvent::Applied { seq } => println!("<- #{seq} applied"),
            ControllerEvent::Discarded { seq, last_applied } => {
                println!("<- #{seq} discarded (#{last_applied} is newer)")
            }
            ControllerEvent::Failed { seq, message } => println!("<- #{seq} failed: {message}"),
            ControllerEvent::Flash { message } => println!("** {message}"),
            ControllerEvent::Navigated { path } => println!("=> {path}"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let mut config = AppConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(view) = args.view {
        config.view = view;
    }

    fragsync_logging::initialize(config.log.destination(), config.log.level()?);

    let profile = config.profile()?;
    let base_url = config.base_url()?;
    sync_info!("Syncing view {} against {}", profile.name, base_url);

    let page = page_for(&profile);
    let fetcher =
        Arc::new(ReqwestFetcher::new(config.fetch.settings()).context("building http client")?);
    let charts = ChartClient::over_http(config.fetch.settings(), base_url.clone())
        .context("building chart client")?;
    let mut dashboard = Dashboard::new(charts, ChartBoard::new(Theme::Light));
    let sync = FilterSyncController::builder(profile, page, fetcher, base_url)
        .observer(Arc::new(ConsoleObserver))
        .build();
    sync.initialize();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let command = match ConsoleCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                sync_warn!("{err}");
                continue;
            }
        };
        match command {
            ConsoleCommand::Set { control, value } => sync.control_changed(&control, &value),
            ConsoleCommand::Page { href } => sync.pagination_clicked(&href),
            ConsoleCommand::Clear => sync.clear_filters(),
            ConsoleCommand::ShowAll => sync.toggle_show_all(),
            ConsoleCommand::Show => show(&sync),
            ConsoleCommand::Charts { year, month } => {
                let today = Local::now().date_naive();
                match dashboard.load(today, year, month).await {
                    Ok(charts) => {
                        for (chart, colors) in charts {
                            for line in describe(&chart) {
                                println!("{line}");
                            }
                            println!("  colors: text {} grid {}", colors.text, colors.grid);
                        }
                    }
                    Err(err) => sync_error!("Error loading charts: {err}"),
                }
            }
            ConsoleCommand::Theme { value } => {
                for (chart, colors) in dashboard.set_theme(&value) {
                    println!("restyled {chart:?}: text {} grid {}", colors.text, colors.grid);
                }
            }
            ConsoleCommand::Quit => break,
        }
    }
    Ok(())
}

/// Empty page carrying every region of the profile.
fn page_for(profile: &ViewProfile) -> MemoryPage {
    profile
        .regions
        .iter()
        .fold(MemoryPage::new(profile.endpoint.clone()), |page, spec| {
            page.with_region(spec.name, "")
        })
}

fn show(sync: &FilterSyncController<MemoryPage>) {
    let view = sync.view();
    println!("view {} at ?{}", view.view_name, view.location);
    for (control, value) in &view.controls {
        println!("  {control} = {value:?}");
    }
    println!(
        "  pending={} in_flight={} last_issued={:?} last_applied={:?}",
        view.refresh_pending, view.in_flight, view.last_issued, view.last_applied
    );
    sync.with_page(|page| {
        println!("address {}", page.address());
        for region in [
            RegionName::TableBody,
            RegionName::Pagination,
            RegionName::Summary,
            RegionName::Modals,
            RegionName::Content,
            RegionName::FilterInfo,
        ] {
            if let Some(html) = page.region(region) {
                println!("[{region}] {}", html.trim());
            }
        }
    });
}
