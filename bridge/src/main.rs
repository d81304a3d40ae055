use anyhow::Context;
use clap::Parser;
use generator::profile::{build_telemetry_payloads, GeneratorConfig};
use gui_bridge::bridge::{BridgeContext, GuiBridge};
use gui_bridge::model::DashboardModel;
use ld2450core::sensor_interface::SensorSnapshot;
use ld2450core::zones::{ZoneConfigCell, ZoneSet};
use session::{CommandPublisher, SensorSession};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use tokio::sync::watch;
use workflow::config::{BridgeConfig, BridgeOverrides};
use workflow::runner::FrameRunner;

mod generator;
mod gui_bridge;
mod session;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "LD2450 zone configurator bridge")]
struct Args {
    /// Load bridge settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// MQTT broker, e.g. mqtt://127.0.0.1:1883
    #[arg(long, env = "MQTT_BROKER")]
    broker: Option<String>,
    #[arg(long, env = "MQTT_USERNAME")]
    username: Option<String>,
    #[arg(long, env = "MQTT_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Zigbee2MQTT device topic
    #[arg(long, env = "MQTT_BASE_TOPIC")]
    base_topic: Option<String>,
    /// Address for the dashboard HTTP endpoint
    #[arg(long)]
    http_bind: Option<SocketAddr>,
    /// Replay synthetic telemetry through the zone engine and print a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    #[arg(long, default_value_t = 20)]
    frames: usize,
    #[arg(long, default_value_t = 2)]
    targets: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Append the offline summary to this file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Connect to the broker and serve the dashboard until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

/// Publisher used when no broker session exists.
struct OfflinePublisher;

impl CommandPublisher for OfflinePublisher {
    fn publish_zone_config(&self, _zones: &ZoneSet) -> anyhow::Result<()> {
        anyhow::bail!("not connected to MQTT broker (offline mode)")
    }

    fn set_position_reporting(&self, _enabled: bool) -> anyhow::Result<()> {
        anyhow::bail!("not connected to MQTT broker (offline mode)")
    }
}

fn run_offline(args: &Args, runner: &FrameRunner, gui_bridge: &GuiBridge) -> anyhow::Result<()> {
    let generator = GeneratorConfig {
        frames: args.frames,
        targets: args.targets,
        seed: args.seed,
        ..Default::default()
    };
    let payloads = build_telemetry_payloads(&generator, &runner.cell().snapshot())?;

    let mut model = DashboardModel::new(*runner.cell().snapshot());
    let mut snapshot = SensorSnapshot::default();
    for payload in &payloads {
        let result = runner.execute(&snapshot, payload)?;
        snapshot = result.snapshot.clone();
        model.apply_frame(result, runner.metrics().snapshot());
    }

    let metrics = runner.metrics().snapshot();
    println!(
        "Offline run -> frames {}, targets seen {}, kept {}, mode {}",
        metrics.frames, metrics.targets_seen, metrics.targets_kept, model.stats.mode
    );
    gui_bridge.publish(&model)?;
    gui_bridge.publish_status("Offline replay results ready.");

    if let Some(report_path) = &args.report {
        let report = format!(
            "frames={} seen={} kept={} mode={} enabled_zones={}\n",
            metrics.frames,
            metrics.targets_seen,
            metrics.targets_kept,
            model.stats.mode,
            model.stats.enabled_zones
        );
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)
            .with_context(|| format!("opening report {}", report_path.display()))?;
        file.write_all(report.as_bytes())?;
    }
    Ok(())
}

/// Logs every zone replacement until Ctrl+C.
async fn watch_until_shutdown(mut zone_updates: watch::Receiver<Arc<ZoneSet>>) -> anyhow::Result<()> {
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut watching = true;
    loop {
        tokio::select! {
            result = &mut shutdown => {
                result.context("awaiting Ctrl+C to exit")?;
                return Ok(());
            }
            changed = zone_updates.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }
                let zones = zone_updates.borrow_and_update().clone();
                log::info!(
                    "Active zones changed: mode {}, {} enabled",
                    zones.mode,
                    zones.enabled_zones().count()
                );
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let base_config = if let Some(path) = &args.config {
        BridgeConfig::load(path)?
    } else {
        BridgeConfig::default()
    };
    let config = base_config.with_overrides(BridgeOverrides {
        broker: args.broker.clone(),
        username: args.username.clone(),
        password: args.password.clone(),
        base_topic: args.base_topic.clone(),
        http_bind: args.http_bind,
    });
    log::debug!("Bridge settings: {:?}", config.mqtt);

    let runner = FrameRunner::new(ZoneConfigCell::new(config.zones));
    let dashboard = DashboardModel::shared(config.zones);

    if args.offline {
        let gui_bridge = GuiBridge::new(BridgeContext {
            dashboard: dashboard.clone(),
            runner: runner.clone(),
            publisher: Arc::new(OfflinePublisher),
        });
        run_offline(&args, &runner, &gui_bridge)?;
    }

    if args.serve {
        let zone_updates = runner.cell().subscribe();
        let session = SensorSession::new(config.mqtt.clone(), runner.clone(), dashboard.clone());
        let gui_bridge = GuiBridge::new(BridgeContext {
            dashboard,
            runner,
            publisher: Arc::new(session.publisher()),
        });
        let _http = gui_bridge.serve(config.http.bind);
        let _session = session.spawn();
        gui_bridge.publish_status("Bridge running (Ctrl+C to stop)...");

        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(watch_until_shutdown(zone_updates))?;
    }

    Ok(())
}
