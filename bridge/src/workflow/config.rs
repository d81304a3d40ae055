use anyhow::Context;
use ld2450core::zones::ZoneSet;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

pub const DEFAULT_BROKER: &str = "mqtt://127.0.0.1:1883";
pub const DEFAULT_BASE_TOPIC: &str = "zigbee2mqtt/SHS01";

fn random_client_id() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..0x0100_0000);
    format!("ld2450-configurator-{:06x}", suffix)
}

fn default_http_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttSettings {
    pub broker: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub base_topic: String,
    pub client_id: String,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            broker: DEFAULT_BROKER.into(),
            username: None,
            password: None,
            base_topic: DEFAULT_BASE_TOPIC.into(),
            client_id: random_client_id(),
        }
    }
}

// Keeps the password out of log output.
impl fmt::Debug for MqttSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttSettings")
            .field("broker", &self.broker)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("base_topic", &self.base_topic)
            .field("client_id", &self.client_id)
            .finish()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub bind: SocketAddr,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            bind: default_http_bind(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub mqtt: MqttSettings,
    pub http: HttpSettings,
    pub zones: ZoneSet,
}

/// Command-line values that take precedence over the config file.
#[derive(Clone, Debug, Default)]
pub struct BridgeOverrides {
    pub broker: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub base_topic: Option<String>,
    pub http_bind: Option<SocketAddr>,
}

impl BridgeConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading bridge config {}", path_ref.display()))?;
        let config: BridgeConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing bridge config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: BridgeOverrides) -> Self {
        if let Some(broker) = overrides.broker {
            self.mqtt.broker = broker;
        }
        if overrides.username.is_some() {
            self.mqtt.username = overrides.username;
        }
        if overrides.password.is_some() {
            self.mqtt.password = overrides.password;
        }
        if let Some(base_topic) = overrides.base_topic {
            self.mqtt.base_topic = base_topic;
        }
        if let Some(bind) = overrides.http_bind {
            self.http.bind = bind;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ld2450core::zones::ZoneMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_stock_configurator() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.mqtt.base_topic, "zigbee2mqtt/SHS01");
        assert_eq!(cfg.http.bind.port(), 9000);
        assert!(cfg.mqtt.client_id.starts_with("ld2450-configurator-"));
        assert_eq!(cfg.mqtt.client_id.len(), "ld2450-configurator-".len() + 6);
        assert_eq!(cfg.zones, ZoneSet::default());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"mqtt:\n  broker: mqtt://broker.local:1883\n  username: radar\n  base_topic: zigbee2mqtt/hall\nzones:\n  mode: 1\n  zones:\n    - {enabled: true, x1: -1000, y1: 0, x2: 1000, y2: 2000}\n    - {enabled: false, x1: -1500, y1: 0, x2: 1500, y2: 3000}\n    - {enabled: false, x1: -1500, y1: 0, x2: 1500, y2: 3000}\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = BridgeConfig::load(&path).unwrap();
        assert_eq!(cfg.mqtt.broker, "mqtt://broker.local:1883");
        assert_eq!(cfg.mqtt.username.as_deref(), Some("radar"));
        assert_eq!(cfg.mqtt.base_topic, "zigbee2mqtt/hall");
        assert_eq!(cfg.zones.mode, ZoneMode::DetectionOnly);
        assert!(cfg.zones.zones[0].enabled);
        assert_eq!(cfg.http.bind.port(), 9000);
    }

    #[test]
    fn config_load_rejects_unknown_mode() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"zones:\n  mode: 5\n  zones:\n    - {enabled: false, x1: 0, y1: 0, x2: 1, y2: 1}\n    - {enabled: false, x1: 0, y1: 0, x2: 1, y2: 1}\n    - {enabled: false, x1: 0, y1: 0, x2: 1, y2: 1}\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        assert!(BridgeConfig::load(&path).is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let cfg = BridgeConfig::default().with_overrides(BridgeOverrides {
            broker: Some("tcp://10.0.0.2:1883".into()),
            password: Some("secret".into()),
            ..Default::default()
        });
        assert_eq!(cfg.mqtt.broker, "tcp://10.0.0.2:1883");
        assert_eq!(cfg.mqtt.base_topic, DEFAULT_BASE_TOPIC);
        assert!(!format!("{:?}", cfg.mqtt).contains("secret"));
    }
}
