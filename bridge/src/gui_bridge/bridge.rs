use crate::gui_bridge::model::{DashboardModel, SharedDashboard};
use crate::session::CommandPublisher;
use crate::workflow::runner::FrameRunner;
use anyhow::Result;
use ld2450core::sensor_interface::PositionReportingCommand;
use ld2450core::zones::{validate_zone_set, ZoneSet, ZoneSetForm};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc, thread};
use tokio::runtime::Builder;
use warp::{
    http::StatusCode,
    reply::{Json, WithStatus},
    Filter,
};

/// State shared by every HTTP route.
#[derive(Clone)]
pub struct BridgeContext {
    pub dashboard: SharedDashboard,
    pub runner: FrameRunner,
    pub publisher: Arc<dyn CommandPublisher>,
}

fn reply(status: StatusCode, body: Value) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&body), status)
}

fn parse_form(form: &ZoneSetForm) -> Result<ZoneSet, WithStatus<Json>> {
    form.parse().map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        reply(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "status": "invalid", "errors": messages }),
        )
    })
}

/// Swaps the active zones and re-classifies the last known targets.
fn install_zones(ctx: &BridgeContext, zones: ZoneSet) {
    let mut guard = ctx.dashboard.write().unwrap();
    ctx.runner.cell().replace(zones);
    let result = ctx.runner.classify(guard.snapshot.clone());
    guard.apply_frame(result, ctx.runner.metrics().snapshot());
}

fn preview_zones(ctx: &BridgeContext, form: ZoneSetForm) -> WithStatus<Json> {
    let zones = match parse_form(&form) {
        Ok(zones) => zones,
        Err(rejection) => return rejection,
    };
    install_zones(ctx, zones);
    let stats = ctx.dashboard.read().unwrap().stats.clone();
    reply(StatusCode::OK, json!({ "status": "ok", "stats": stats }))
}

fn apply_zones(ctx: &BridgeContext, form: ZoneSetForm) -> WithStatus<Json> {
    let zones = match parse_form(&form) {
        Ok(zones) => zones,
        Err(rejection) => return rejection,
    };

    let invalid: Vec<Value> = validate_zone_set(&zones)
        .into_iter()
        .filter(|(_, report)| !report.valid)
        .map(|(zone, report)| json!({ "zone": zone, "errors": report.errors }))
        .collect();
    if !invalid.is_empty() {
        return reply(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "status": "invalid", "zones": invalid }),
        );
    }

    install_zones(ctx, zones);
    match ctx.publisher.publish_zone_config(&zones) {
        Ok(()) => reply(StatusCode::OK, json!({ "status": "ok" })),
        Err(err) => {
            log::error!("Failed to publish zone config: {:#}", err);
            reply(
                StatusCode::BAD_GATEWAY,
                json!({ "status": "error", "message": format!("{:#}", err) }),
            )
        }
    }
}

fn reset_zones(ctx: &BridgeContext) -> WithStatus<Json> {
    install_zones(ctx, ZoneSet::default());
    reply(StatusCode::OK, json!({ "status": "ok" }))
}

fn toggle_position_reporting(ctx: &BridgeContext) -> WithStatus<Json> {
    let current = ctx.dashboard.read().unwrap().snapshot.position_reporting;
    let requested = PositionReportingCommand::toggle(current).position_reporting;
    match ctx.publisher.set_position_reporting(requested) {
        Ok(()) => reply(
            StatusCode::OK,
            json!({ "status": "ok", "position_reporting": requested }),
        ),
        Err(err) => {
            log::error!("Failed to toggle position reporting: {:#}", err);
            reply(
                StatusCode::BAD_GATEWAY,
                json!({ "status": "error", "message": format!("{:#}", err) }),
            )
        }
    }
}

pub fn routes(
    ctx: BridgeContext,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let ctx_filter = warp::any().map(move || ctx.clone());

    let payload_route = warp::path!("payload")
        .and(warp::get())
        .and(ctx_filter.clone())
        .map(|ctx: BridgeContext| warp::reply::json(&*ctx.dashboard.read().unwrap()));

    let preview_route = warp::path!("zones" / "preview")
        .and(warp::post())
        .and(warp::body::json())
        .and(ctx_filter.clone())
        .map(|form: ZoneSetForm, ctx: BridgeContext| preview_zones(&ctx, form));

    let apply_route = warp::path!("zones" / "apply")
        .and(warp::post())
        .and(warp::body::json())
        .and(ctx_filter.clone())
        .map(|form: ZoneSetForm, ctx: BridgeContext| apply_zones(&ctx, form));

    let reset_route = warp::path!("zones" / "reset")
        .and(warp::post())
        .and(ctx_filter.clone())
        .map(|ctx: BridgeContext| reset_zones(&ctx));

    let toggle_route = warp::path!("position-reporting" / "toggle")
        .and(warp::post())
        .and(ctx_filter)
        .map(|ctx: BridgeContext| toggle_position_reporting(&ctx));

    payload_route
        .or(preview_route)
        .or(apply_route)
        .or(reset_route)
        .or(toggle_route)
}

/// Hosts the dashboard HTTP endpoint consumed by the visualizer.
pub struct GuiBridge {
    ctx: BridgeContext,
}

impl GuiBridge {
    pub fn new(ctx: BridgeContext) -> Self {
        Self { ctx }
    }

    pub fn serve(&self, bind: SocketAddr) -> thread::JoinHandle<()> {
        let routes = routes(self.ctx.clone());
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    log::error!("failed to build HTTP runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                match warp::serve(routes).try_bind_ephemeral(bind) {
                    Ok((addr, server)) => {
                        log::info!("Dashboard bridge listening on http://{}", addr);
                        server.await;
                    }
                    Err(err) => log::error!("failed to bind {}: {}", bind, err),
                }
            });
        })
    }

    pub fn publish(&self, model: &DashboardModel) -> Result<()> {
        let mut guard = self.ctx.dashboard.write().unwrap();
        *guard = model.clone();
        println!(
            "[GUI] targets: {}, visible: {}, mode: {}",
            guard.targets.len(),
            guard.visible_targets.len(),
            guard.stats.mode
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> DashboardModel {
        self.ctx.dashboard.read().unwrap().clone()
    }
}
