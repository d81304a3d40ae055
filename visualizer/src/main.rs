use editor::{Coordinate, ZoneEditor};
use iced::{
    time,
    widget::{button, canvas::Canvas, column, row, scrollable, text, text_input, Column, Container, Row},
    Alignment, Element, Length, Subscription, Task, Theme,
};
use ld2450core::sensor_interface::SensorSnapshot;
use ld2450core::zones::{Target, ZoneMode, ZoneSet, ZoneSetForm, ZoneStats, ZONE_COUNT};
use radar::RadarView;
use serde::Deserialize;
use std::time::Duration;

mod editor;
mod radar;

const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:9000";

fn bridge_url(path: &str) -> String {
    let base = std::env::var("LD2450_BRIDGE_URL").unwrap_or_else(|_| DEFAULT_BRIDGE_URL.into());
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "LD2450 Zone Configurator".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    editor: ZoneEditor,
    editor_loaded: bool,
    payload: Option<DashboardPayload>,
    errors: Vec<String>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    PayloadFetched(Result<DashboardPayload, String>),
    SelectZone(usize),
    ToggleZoneEnabled,
    FieldChanged(Coordinate, String),
    ModeSelected(ZoneMode),
    Preview,
    Apply,
    Reset,
    TogglePositionReporting,
    RequestFinished(&'static str, Result<String, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                editor: ZoneEditor::default(),
                editor_loaded: false,
                payload: None,
                errors: Vec::new(),
                status: "Waiting for bridge...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_payload(), Message::PayloadFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_payload(), Message::PayloadFetched),
            Message::PayloadFetched(Ok(payload)) => {
                if !state.editor_loaded {
                    state.editor.load(&payload.zones);
                    state.editor_loaded = true;
                }
                state.status = format!(
                    "{} - {} targets, {} visible ({})",
                    if payload.connected { "Connected" } else { "Disconnected" },
                    payload.targets.len(),
                    payload.visible_targets.len(),
                    payload.stats.mode
                );
                state.payload = Some(payload);
                Task::none()
            }
            Message::PayloadFetched(Err(err)) => {
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
            Message::SelectZone(index) => {
                state.editor.select_zone(index);
                Task::none()
            }
            Message::ToggleZoneEnabled => {
                state.editor.toggle_enabled();
                Task::none()
            }
            Message::FieldChanged(coordinate, value) => {
                state.editor.update_field(coordinate, value);
                Task::none()
            }
            Message::ModeSelected(mode) => {
                state.editor.select_mode(mode);
                Task::none()
            }
            Message::Preview => {
                state.errors = state.editor.parse_errors();
                if !state.errors.is_empty() {
                    return Task::none();
                }
                let form = state.editor.form.clone();
                Task::perform(post_json("/zones/preview", Some(form)), |result| {
                    Message::RequestFinished("Preview", result)
                })
            }
            Message::Apply => {
                state.errors = state.editor.apply_errors();
                if !state.errors.is_empty() {
                    state.push_history(format!("Apply blocked: {} problem(s)", state.errors.len()));
                    return Task::none();
                }
                let form = state.editor.form.clone();
                Task::perform(post_json("/zones/apply", Some(form)), |result| {
                    Message::RequestFinished("Apply", result)
                })
            }
            Message::Reset => {
                state.editor.load(&ZoneSet::default());
                state.errors.clear();
                Task::perform(post_json::<ZoneSetForm>("/zones/reset", None), |result| {
                    Message::RequestFinished("Reset", result)
                })
            }
            Message::TogglePositionReporting => Task::perform(
                post_json::<ZoneSetForm>("/position-reporting/toggle", None),
                |result| Message::RequestFinished("Position reporting", result),
            ),
            Message::RequestFinished(action, Ok(_)) => {
                state.push_history(format!("{action}: ok"));
                Task::none()
            }
            Message::RequestFinished(action, Err(err)) => {
                state.status = format!("{action} failed: {err}");
                state.push_history(format!("{action}: failed"));
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let zone_tabs = (1..=ZONE_COUNT).fold(Row::new().spacing(6), |row, index| {
            let label = if index == state.editor.active_zone {
                format!("[Zone {index}]")
            } else {
                format!("Zone {index}")
            };
            row.push(button(text(label)).on_press(Message::SelectZone(index)))
        });

        let mode_buttons = ZoneMode::ALL.iter().fold(Row::new().spacing(6), |row, mode| {
            let label = if state.editor.mode() == Some(*mode) {
                format!("[{mode}]")
            } else {
                mode.to_string()
            };
            row.push(button(text(label)).on_press(Message::ModeSelected(*mode)))
        });

        let coordinate_inputs = Coordinate::ALL.iter().fold(
            Column::new().spacing(6),
            |col, coordinate| {
                let coordinate = *coordinate;
                col.push(
                    text_input(coordinate.label(), state.editor.value(coordinate))
                        .on_input(move |value| Message::FieldChanged(coordinate, value))
                        .padding(6),
                )
            },
        );

        let enabled_label = if state.editor.enabled() {
            "Enabled (click to disable)"
        } else {
            "Disabled (click to enable)"
        };

        let error_list = state
            .errors
            .iter()
            .fold(Column::new().spacing(2), |col, error| col.push(text(error.clone()).size(12)));

        let reporting = state
            .payload
            .as_ref()
            .map(|payload| payload.snapshot.position_reporting)
            .unwrap_or(false);
        let reporting_label = if reporting {
            "Disable position reporting"
        } else {
            "Enable position reporting"
        };

        let editor_column = column![
            text("Zones").size(26),
            text("Mode").size(16),
            mode_buttons,
            zone_tabs,
            button(text(enabled_label)).on_press(Message::ToggleZoneEnabled),
            coordinate_inputs,
            row![
                button("Preview").on_press(Message::Preview).padding(10),
                button("Apply").on_press(Message::Apply).padding(10),
                button("Reset").on_press(Message::Reset).padding(10),
            ]
            .spacing(8),
            button(reporting_label)
                .on_press(Message::TogglePositionReporting)
                .padding(10),
            error_list,
            text(&state.status).size(14),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(360.0));

        let (targets, visible, zones) = state
            .payload
            .as_ref()
            .map(|payload| {
                (
                    payload.targets.clone(),
                    payload.visible_targets.clone(),
                    payload.zones.zones.to_vec(),
                )
            })
            .unwrap_or_default();

        let zone_status = state
            .payload
            .as_ref()
            .map(|payload| {
                payload
                    .snapshot
                    .zone_occupied
                    .iter()
                    .enumerate()
                    .map(|(idx, occupied)| {
                        format!("Zone {}: {}", idx + 1, if *occupied { "Occupied" } else { "Clear" })
                    })
                    .collect::<Vec<_>>()
                    .join("   ")
            })
            .unwrap_or_else(|| "Zone status: n/a".into());

        let target_entries = if targets.is_empty() {
            Column::new().push(text("No targets detected").size(12))
        } else {
            targets
                .iter()
                .enumerate()
                .fold(Column::new().spacing(4), |col, (idx, target)| {
                    col.push(
                        text(format!(
                            "Target {}: X={}mm, Y={}mm, Dist={}mm{}",
                            idx + 1,
                            target.x,
                            target.y,
                            target.distance.round(),
                            if visible.contains(target) { "" } else { " (filtered)" }
                        ))
                        .size(12),
                    )
                })
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let radar = Canvas::new(RadarView {
            zones,
            targets: targets.clone(),
            visible: visible.clone(),
            active_zone: state.editor.active_zone,
        })
        .width(Length::Fixed(480.0))
        .height(Length::Fixed(480.0));

        let telemetry_column = column![
            text("Radar").size(26),
            radar,
            text(zone_status).size(14),
            text("Targets").size(16),
            Container::new(target_entries).padding(6),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![editor_column, telemetry_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

async fn fetch_payload() -> Result<DashboardPayload, String> {
    let response = reqwest::get(bridge_url("/payload"))
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<DashboardPayload>()
        .await
        .map_err(|e| e.to_string())
}

async fn post_json<T: serde::Serialize>(path: &'static str, body: Option<T>) -> Result<String, String> {
    let client = reqwest::Client::new();
    let mut request = client.post(bridge_url(path));
    if let Some(body) = &body {
        request = request.json(body);
    }
    let response = request.send().await.map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok(response.text().await.unwrap_or_default())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_else(|_| "".into());
        Err(format!("{}: {}", status, text))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct DashboardPayload {
    #[serde(default)]
    connected: bool,
    #[serde(default)]
    snapshot: SensorSnapshot,
    #[serde(default)]
    targets: Vec<Target>,
    #[serde(default)]
    visible_targets: Vec<Target>,
    #[serde(default)]
    zones: ZoneSet,
    stats: ZoneStats,
}
