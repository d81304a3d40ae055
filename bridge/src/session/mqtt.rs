use crate::workflow::config::MqttSettings;
use anyhow::{anyhow, Context, Result};
use rumqttc::v5::{Client, Connection, MqttOptions};
use std::time::Duration;

const DEFAULT_MQTT_PORT: u16 = 1883;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttEndpoint {
    pub host: String,
    pub port: u16,
}

/// Accepts `mqtt://host:port`, `tcp://host:port` or a bare `host[:port]`.
pub fn parse_mqtt_endpoint(addr: &str) -> Result<MqttEndpoint> {
    let mut remainder = addr.trim();

    if let Some((scheme, rest)) = remainder.split_once("://") {
        match scheme {
            "mqtt" | "tcp" => {}
            other => return Err(anyhow!("unsupported MQTT scheme: {}", other)),
        }
        remainder = rest;
    }
    let remainder = remainder.trim_end_matches('/');
    if remainder.is_empty() {
        return Err(anyhow!("missing MQTT host in {}", addr));
    }

    let (host, port) = split_host_port(remainder)?;
    Ok(MqttEndpoint { host, port })
}

fn split_host_port(addr: &str) -> Result<(String, u16)> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, rest) = rest
            .split_once(']')
            .ok_or_else(|| anyhow!("invalid MQTT address: {}", addr))?;
        let port = match rest.strip_prefix(':') {
            Some(port) => port.parse().context("invalid MQTT port")?,
            None => DEFAULT_MQTT_PORT,
        };
        return Ok((host.to_string(), port));
    }

    match addr.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port.parse().context("invalid MQTT port")?;
            Ok((host.to_string(), port))
        }
        None => Ok((addr.to_string(), DEFAULT_MQTT_PORT)),
    }
}

pub fn build_options(settings: &MqttSettings, endpoint: &MqttEndpoint) -> MqttOptions {
    let mut options = MqttOptions::new(&settings.client_id, &endpoint.host, endpoint.port);
    options.set_keep_alive(Duration::from_secs(60));
    options.set_clean_start(true);
    if let Some(user) = settings.username.as_deref().filter(|user| !user.is_empty()) {
        options.set_credentials(user, settings.password.clone().unwrap_or_default());
    }
    options
}

pub fn connect_mqtt(settings: &MqttSettings) -> Result<(Client, Connection)> {
    let endpoint = parse_mqtt_endpoint(&settings.broker)?;
    let options = build_options(settings, &endpoint);
    let (client, connection) = Client::new(options, 10);
    log::info!(
        "Connecting to MQTT broker {}:{} (auth: {})",
        endpoint.host,
        endpoint.port,
        settings.username.is_some()
    );
    Ok((client, connection))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_broker_forms() {
        assert_eq!(
            parse_mqtt_endpoint("mqtt://broker.local:1884").unwrap(),
            MqttEndpoint {
                host: "broker.local".into(),
                port: 1884
            }
        );
        assert_eq!(
            parse_mqtt_endpoint("tcp://10.0.0.5:1883/").unwrap().host,
            "10.0.0.5"
        );
        assert_eq!(parse_mqtt_endpoint("localhost").unwrap().port, 1883);
        assert_eq!(
            parse_mqtt_endpoint("[::1]:1999").unwrap(),
            MqttEndpoint {
                host: "::1".into(),
                port: 1999
            }
        );
    }

    #[test]
    fn rejects_unsupported_schemes_and_bad_ports() {
        assert!(parse_mqtt_endpoint("ws://localhost:9001").is_err());
        assert!(parse_mqtt_endpoint("mqtts://localhost:8883").is_err());
        assert!(parse_mqtt_endpoint("mqtt://localhost:port").is_err());
        assert!(parse_mqtt_endpoint("mqtt://").is_err());
    }

    #[test]
    fn options_carry_client_id_and_endpoint() {
        let settings = MqttSettings {
            client_id: "ld2450-configurator-abc123".into(),
            username: Some("radar".into()),
            password: Some("pw".into()),
            ..Default::default()
        };
        let endpoint = parse_mqtt_endpoint("mqtt://broker:1883").unwrap();
        let options = build_options(&settings, &endpoint);
        assert_eq!(options.client_id(), "ld2450-configurator-abc123");
        assert_eq!(options.broker_address(), ("broker".to_string(), 1883));
    }
}
