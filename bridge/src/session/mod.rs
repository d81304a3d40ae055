pub mod mqtt;

use crate::gui_bridge::model::{DashboardModel, SharedDashboard};
use crate::workflow::config::MqttSettings;
use crate::workflow::runner::FrameRunner;
use anyhow::{anyhow, Context, Result};
use ld2450core::sensor_interface::{command_topic, PositionReportingCommand, ZoneConfigCommand};
use ld2450core::telemetry::LogManager;
use ld2450core::zones::{ensure_zone_set_valid, ZoneSet};
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::{Client, Event, Incoming};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLockWriteGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Outbound side of the sensor session.
pub trait CommandPublisher: Send + Sync {
    /// Validates every zone, then writes the configuration to the device.
    fn publish_zone_config(&self, zones: &ZoneSet) -> Result<()>;
    fn set_position_reporting(&self, enabled: bool) -> Result<()>;
}

/// Client handle shared between the connection loop and publishers.
#[derive(Default)]
struct SessionLink {
    client: Mutex<Option<Client>>,
    connected: AtomicBool,
}

#[derive(Clone)]
pub struct MqttPublisher {
    link: Arc<SessionLink>,
    base_topic: String,
}

impl MqttPublisher {
    fn publish_json<T: Serialize>(&self, command: &T) -> Result<()> {
        if !self.link.connected.load(Ordering::SeqCst) {
            return Err(anyhow!("not connected to MQTT broker"));
        }
        let body = serde_json::to_vec(command).context("serializing command")?;
        let guard = self
            .link
            .client
            .lock()
            .map_err(|_| anyhow!("MQTT client lock poisoned"))?;
        let client = guard
            .as_ref()
            .ok_or_else(|| anyhow!("not connected to MQTT broker"))?;
        client
            .try_publish(command_topic(&self.base_topic), QoS::AtMostOnce, false, body)
            .context("queueing MQTT publish")?;
        Ok(())
    }
}

impl CommandPublisher for MqttPublisher {
    fn publish_zone_config(&self, zones: &ZoneSet) -> Result<()> {
        ensure_zone_set_valid(zones)?;
        self.publish_json(&ZoneConfigCommand::from_zone_set(zones))?;
        log::info!("Published zone config (mode {})", zones.mode);
        Ok(())
    }

    fn set_position_reporting(&self, enabled: bool) -> Result<()> {
        self.publish_json(&PositionReportingCommand::new(enabled))?;
        log::info!("Requested position reporting: {}", enabled);
        Ok(())
    }
}

/// Live MQTT connection to the sensor's Zigbee2MQTT topic.
pub struct SensorSession {
    settings: MqttSettings,
    runner: FrameRunner,
    dashboard: SharedDashboard,
    link: Arc<SessionLink>,
    logger: LogManager,
}

impl SensorSession {
    pub fn new(settings: MqttSettings, runner: FrameRunner, dashboard: SharedDashboard) -> Self {
        Self {
            settings,
            runner,
            dashboard,
            link: Arc::new(SessionLink::default()),
            logger: LogManager::new("session"),
        }
    }

    pub fn publisher(&self) -> MqttPublisher {
        MqttPublisher {
            link: self.link.clone(),
            base_topic: self.settings.base_topic.clone(),
        }
    }

    /// Feeds one telemetry payload through the runner into the dashboard.
    pub fn handle_frame(&self, payload: &[u8]) {
        let Some(mut guard) = self.dashboard_mut() else {
            return;
        };
        match self.runner.execute(&guard.snapshot, payload) {
            Ok(result) => guard.apply_frame(result, self.runner.metrics().snapshot()),
            Err(err) => {
                guard.set_metrics(self.runner.metrics().snapshot());
                self.logger.warn(&format!("Dropping frame: {:#}", err));
            }
        }
    }

    fn set_connected(&self, connected: bool) {
        self.link.connected.store(connected, Ordering::SeqCst);
        if let Some(mut guard) = self.dashboard_mut() {
            guard.set_connected(connected);
        }
    }

    fn dashboard_mut(&self) -> Option<RwLockWriteGuard<'_, DashboardModel>> {
        match self.dashboard.write() {
            Ok(guard) => Some(guard),
            Err(_) => {
                log::error!("Dashboard lock poisoned; skipping update");
                None
            }
        }
    }

    fn run_connection(&self) -> Result<()> {
        let (client, mut connection) = mqtt::connect_mqtt(&self.settings)?;
        client
            .subscribe(self.settings.base_topic.clone(), QoS::AtMostOnce)
            .context("subscribing to sensor topic")?;
        *self
            .link
            .client
            .lock()
            .map_err(|_| anyhow!("MQTT client lock poisoned"))? = Some(client);

        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    self.set_connected(true);
                    self.logger.record(&format!(
                        "Connected, subscribed to {}",
                        self.settings.base_topic
                    ));
                }
                Ok(Event::Incoming(Incoming::Publish(publish))) => {
                    self.handle_frame(&publish.payload);
                }
                Ok(Event::Incoming(Incoming::Disconnect(_))) => break,
                Ok(_) => {}
                Err(err) => {
                    self.set_connected(false);
                    return Err(anyhow!("MQTT connection error: {}", err));
                }
            }
        }

        self.set_connected(false);
        Ok(())
    }

    /// Runs the connection loop on its own thread, reconnecting after errors.
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || loop {
            match self.run_connection() {
                Ok(()) => self.logger.warn("MQTT connection closed. Reconnecting..."),
                Err(err) => self.logger.warn(&format!("{:#}. Reconnecting...", err)),
            }
            if let Ok(mut client) = self.link.client.lock() {
                *client = None;
            }
            thread::sleep(RECONNECT_DELAY);
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use ld2450core::zones::{Zone, ZoneConfigCell, ZoneMode};

    fn session_with(zones: ZoneSet) -> SensorSession {
        let cell = ZoneConfigCell::new(zones);
        SensorSession::new(
            MqttSettings::default(),
            FrameRunner::new(cell),
            DashboardModel::shared(zones),
        )
    }

    #[test]
    fn frames_accumulate_into_dashboard() {
        let zones = ZoneSet::default()
            .with_mode(ZoneMode::FilterExclude)
            .replace_zone(1, Zone::new(-1000, 0, 1000, 2000))
            .unwrap();
        let session = session_with(zones);
        session.handle_frame(br#"{"target1_x": 500, "target1_y": 1000}"#);
        session.handle_frame(br#"{"target2_x": 2000, "target2_y": 1000, "position_reporting": true}"#);
        session.handle_frame(b"not json");

        let model = session.dashboard.read().unwrap().clone();
        assert_eq!(model.targets.len(), 2);
        assert_eq!(model.visible_targets, vec![model.targets[1]]);
        assert!(model.snapshot.position_reporting);
        assert_eq!(model.metrics.frames, 2);
        assert_eq!(model.metrics.decode_errors, 1);
    }

    #[test]
    fn undecodable_frame_still_refreshes_metrics() {
        let session = session_with(ZoneSet::default());
        session.handle_frame(b"{");
        let model = session.dashboard.read().unwrap().clone();
        assert_eq!(model.metrics.frames, 0);
        assert_eq!(model.metrics.decode_errors, 1);
        assert!(model.targets.is_empty());
    }

    #[test]
    fn poisoned_dashboard_does_not_panic_the_session() {
        let session = session_with(ZoneSet::default());
        let dashboard = session.dashboard.clone();
        let _ = std::thread::spawn(move || {
            let _guard = dashboard.write().unwrap();
            panic!("dashboard writer failed");
        })
        .join();
        assert!(session.dashboard.is_poisoned());

        session.handle_frame(br#"{"target1_x": 500, "target1_y": 1000}"#);
        session.set_connected(true);
        assert!(session.link.connected.load(Ordering::SeqCst));
    }

    #[test]
    fn publisher_refuses_while_disconnected() {
        let session = session_with(ZoneSet::default());
        let err = session
            .publisher()
            .set_position_reporting(true)
            .unwrap_err();
        assert!(err.to_string().contains("not connected"));
    }

    #[test]
    fn publisher_validates_before_sending() {
        let session = session_with(ZoneSet::default());
        let bad = ZoneSet::default()
            .replace_zone(3, Zone::new(0, 0, 0, 0))
            .unwrap();
        let err = session.publisher().publish_zone_config(&bad).unwrap_err();
        assert!(err.to_string().contains("zone 3"));
    }

    #[test]
    fn recording_publisher_captures_commands() {
        let publisher = testing::RecordingPublisher::default();
        publisher.set_position_reporting(false).unwrap();
        publisher.publish_zone_config(&ZoneSet::default()).unwrap();
        let sent = publisher.sent.lock().unwrap();
        assert_eq!(sent[0]["position_reporting"], false);
        assert_eq!(sent[1]["zone_type"], 0);
    }
}
