use ld2450core::zones::{validate_zone_set, ZoneMode, ZoneSet, ZoneSetForm, ZONE_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinate {
    X1,
    Y1,
    X2,
    Y2,
}

impl Coordinate {
    pub const ALL: [Coordinate; 4] = [
        Coordinate::X1,
        Coordinate::Y1,
        Coordinate::X2,
        Coordinate::Y2,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Coordinate::X1 => "X1 (mm)",
            Coordinate::Y1 => "Y1 (mm)",
            Coordinate::X2 => "X2 (mm)",
            Coordinate::Y2 => "Y2 (mm)",
        }
    }
}

/// Text-level zone editor state; nothing here is sent until it parses.
#[derive(Debug, Clone)]
pub struct ZoneEditor {
    pub form: ZoneSetForm,
    pub active_zone: usize,
}

impl Default for ZoneEditor {
    fn default() -> Self {
        Self {
            form: ZoneSetForm::default(),
            active_zone: 1,
        }
    }
}

impl ZoneEditor {
    pub fn load(&mut self, zones: &ZoneSet) {
        self.form = ZoneSetForm::from(zones);
    }

    pub fn select_zone(&mut self, index: usize) {
        if (1..=ZONE_COUNT).contains(&index) {
            self.active_zone = index;
        }
    }

    pub fn select_mode(&mut self, mode: ZoneMode) {
        self.form.mode = mode.code();
    }

    pub fn mode(&self) -> Option<ZoneMode> {
        ZoneMode::try_from(self.form.mode).ok()
    }

    pub fn toggle_enabled(&mut self) {
        let zone = &mut self.form.zones[self.active_zone - 1];
        zone.enabled = !zone.enabled;
    }

    pub fn enabled(&self) -> bool {
        self.form.zones[self.active_zone - 1].enabled
    }

    pub fn value(&self, coordinate: Coordinate) -> &str {
        let zone = &self.form.zones[self.active_zone - 1];
        match coordinate {
            Coordinate::X1 => &zone.x1,
            Coordinate::Y1 => &zone.y1,
            Coordinate::X2 => &zone.x2,
            Coordinate::Y2 => &zone.y2,
        }
    }

    pub fn update_field(&mut self, coordinate: Coordinate, value: String) {
        let zone = &mut self.form.zones[self.active_zone - 1];
        match coordinate {
            Coordinate::X1 => zone.x1 = value,
            Coordinate::Y1 => zone.y1 = value,
            Coordinate::X2 => zone.x2 = value,
            Coordinate::Y2 => zone.y2 = value,
        }
    }

    /// Parse errors only; used before a preview.
    pub fn parse_errors(&self) -> Vec<String> {
        match self.form.parse() {
            Ok(_) => Vec::new(),
            Err(errors) => errors.iter().map(ToString::to_string).collect(),
        }
    }

    /// Parse errors, or validation errors prefixed with their zone.
    pub fn apply_errors(&self) -> Vec<String> {
        match self.form.parse() {
            Ok(zones) => validate_zone_set(&zones)
                .into_iter()
                .flat_map(|(zone, report)| {
                    report
                        .errors
                        .into_iter()
                        .map(move |error| format!("Zone {}: {}", zone, error))
                })
                .collect(),
            Err(errors) => errors.iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_apply_to_the_active_zone_only() {
        let mut editor = ZoneEditor::default();
        editor.select_zone(2);
        editor.update_field(Coordinate::X2, "900".into());
        editor.toggle_enabled();
        assert_eq!(editor.form.zones[1].x2, "900");
        assert!(editor.form.zones[1].enabled);
        assert_eq!(editor.form.zones[0].x2, "1500");
        assert!(!editor.form.zones[0].enabled);
    }

    #[test]
    fn out_of_range_zone_index_is_ignored() {
        let mut editor = ZoneEditor::default();
        editor.select_zone(4);
        editor.select_zone(0);
        assert_eq!(editor.active_zone, 1);
    }

    #[test]
    fn apply_errors_report_parse_failures_first() {
        let mut editor = ZoneEditor::default();
        editor.update_field(Coordinate::Y1, "ten".into());
        editor.update_field(Coordinate::X1, "-9000".into());
        let errors = editor.apply_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("zone1.y1"));
    }

    #[test]
    fn apply_errors_label_validation_failures_by_zone() {
        let mut editor = ZoneEditor::default();
        editor.select_zone(3);
        editor.update_field(Coordinate::Y2, "0".into());
        assert!(editor.parse_errors().is_empty());
        assert_eq!(
            editor.apply_errors(),
            vec!["Zone 3: Zone must have non-zero area".to_string()]
        );
    }

    #[test]
    fn mode_selection_round_trips() {
        let mut editor = ZoneEditor::default();
        editor.select_mode(ZoneMode::FilterExclude);
        assert_eq!(editor.mode(), Some(ZoneMode::FilterExclude));
        assert_eq!(editor.form.mode, 2);
    }
}
