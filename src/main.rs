//! SushiDB console - terminal front end for the page controllers

use std::str::FromStr;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sushi_console::models::{MetricKey, MetricType};
use sushi_console::pages::keys::KeysController;
use sushi_console::pages::message::MessageMetricController;
use sushi_console::pages::query::QueryController;
use sushi_console::pages::single::SingleMetricController;
use sushi_console::pages::stores::StoreInfoController;
use sushi_console::{ApiClient, Config};

const USAGE: &str = "usage: sushi-console <command>

commands:
  keys                         list all metric keys
  metric <single|message> <id> show rows of one metric
  query <single|message> <id> [file]
                               run a JSON query (from file, or the empty query)
  delete <single|message> <id> delete a metric and relist keys
  stores [--watch]             show cluster store health (watch: auto-refresh)";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sushi_console=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let api = ApiClient::new(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("");

    match command {
        "keys" => run_keys(api).await,
        "metric" => {
            let (metric_type, metric_id) = metric_args(&args)?;
            run_metric(api, metric_type, metric_id).await
        }
        "query" => {
            let (metric_type, metric_id) = metric_args(&args)?;
            run_query(api, metric_type, metric_id, args.get(3)).await
        }
        "delete" => {
            let (metric_type, metric_id) = metric_args(&args)?;
            run_delete(api, metric_type, metric_id).await
        }
        "stores" => {
            let watch = args.iter().any(|a| a == "--watch");
            run_stores(api, &config, watch).await
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn metric_args(args: &[String]) -> anyhow::Result<(MetricType, &str)> {
    let type_arg = args.get(1).context("missing metric type")?;
    let metric_id = args.get(2).context("missing metric id")?;
    Ok((MetricType::from_str(type_arg)?, metric_id))
}

async fn run_keys(api: ApiClient) -> anyhow::Result<()> {
    let controller = KeysController::bind(api).await;
    let state = controller.state();
    if let Some(error) = state.error {
        bail!("failed to list keys: {}", error);
    }

    println!("{:<30} {:<8} {:<30} {}", "METRIC ID", "TYPE", "VIEW", "QUERY");
    for row in controller.rows() {
        println!(
            "{:<30} {:<8} {:<30} {}",
            row.metric_id, row.metric_type, row.view_path, row.query_path
        );
    }
    Ok(())
}

async fn run_metric(api: ApiClient, metric_type: MetricType, metric_id: &str) -> anyhow::Result<()> {
    match metric_type {
        MetricType::Single => {
            let controller = SingleMetricController::bind(api, metric_id).await;
            if let Some(error) = controller.state().error {
                bail!("failed to fetch metric: {}", error);
            }
            println!("{:<26} {}", "TIME", "VALUE");
            for row in controller.table_rows() {
                println!("{:<26} {}", row.time, row.value);
            }
        }
        MetricType::Message => {
            let controller = MessageMetricController::bind(api, metric_id).await;
            if let Some(error) = controller.state().error {
                bail!("failed to fetch metric: {}", error);
            }
            println!("{:<26} {}", "TIME", "VALUE");
            for row in controller.table_rows() {
                println!("{:<26} {}", row.time, row.value_json);
            }
        }
    }
    Ok(())
}

async fn run_query(
    api: ApiClient,
    metric_type: MetricType,
    metric_id: &str,
    query_file: Option<&String>,
) -> anyhow::Result<()> {
    let controller = QueryController::bind(api, metric_type, metric_id).await;

    if let Some(path) = query_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read query file {}", path))?;
        controller.set_draft(text);
        controller.submit().await?;
    }

    let model = controller.view_model();
    if let Some(error) = model.error {
        bail!("query failed: {}", error);
    }

    println!("{:<20} {:<26} {}", "METRIC", "TIME", "VALUE");
    for row in &model.rows {
        println!("{:<20} {:<26} {}", row.metric_key, row.time, row.value);
    }
    if let Some(query_time) = model.query_time {
        println!("query time: {}", query_time);
    }
    if let Some(cursor) = model.cursor {
        println!("more results, cursor: {}", cursor);
    }
    Ok(())
}

async fn run_delete(api: ApiClient, metric_type: MetricType, metric_id: &str) -> anyhow::Result<()> {
    let controller = KeysController::bind(api).await;
    let key = MetricKey::new(metric_id, metric_type);
    controller
        .delete_key(&key)
        .await
        .with_context(|| format!("failed to delete {}/{}", metric_type, metric_id))?;
    info!(metric_id, %metric_type, "metric deleted");

    println!("remaining keys:");
    for row in controller.rows() {
        println!("  {} ({})", row.metric_id, row.metric_type);
    }
    Ok(())
}

async fn run_stores(api: ApiClient, config: &Config, watch: bool) -> anyhow::Result<()> {
    let controller = StoreInfoController::bind(api, config.poll_interval).await;
    print_stores(&controller);

    if !watch {
        return Ok(());
    }

    info!(interval_ms = config.poll_interval.as_millis() as u64, "watching stores, ctrl-c to stop");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(config.poll_interval) => {
                print_stores(&controller);
            }
        }
    }
    Ok(())
}

fn print_stores(controller: &StoreInfoController) {
    let state = controller.state();
    if let Some(error) = &state.error {
        eprintln!("store fetch failed: {}", error);
    }
    for info in controller.stores() {
        println!("{} [{}]", info.store.address, info.store.state_name);
        println!("  id: {}  version: {}", info.store.id, info.store.version);
        println!("  disk: {}", info.disk_summary());
        println!("  regions: {}", info.region_summary());
        println!(
            "  start: {}  heartbeat: {}  uptime: {}",
            info.status.start_ts, info.status.last_heartbeat_ts, info.status.uptime
        );
    }
}
