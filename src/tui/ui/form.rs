//! Prediction form: 13 rows of sliders and choice selectors.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::domain::{
    Choice, NumericRange, PatientInput, AGE_RANGE, CHOLESTEROL_RANGE, MAX_HEART_RATE_RANGE,
    RESTING_BP_RANGE, ST_DEPRESSION_RANGE,
};
use crate::tui::styles::MedicalTheme;

/// Slider steps moved by PageUp / PageDown.
pub const PAGE_STEPS: i32 = 10;

const BAR_WIDTH: usize = 20;

/// One row of the form, in feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Age,
    Sex,
    ChestPain,
    RestingBp,
    Cholesterol,
    FastingBloodSugar,
    RestingEcg,
    MaxHeartRate,
    ExerciseAngina,
    StDepression,
    StSlope,
    MajorVessels,
    Thalassemia,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Age,
        Field::Sex,
        Field::ChestPain,
        Field::RestingBp,
        Field::Cholesterol,
        Field::FastingBloodSugar,
        Field::RestingEcg,
        Field::MaxHeartRate,
        Field::ExerciseAngina,
        Field::StDepression,
        Field::StSlope,
        Field::MajorVessels,
        Field::Thalassemia,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Sex => "Sex",
            Self::ChestPain => "Chest Pain Type",
            Self::RestingBp => "Resting Blood Pressure (mm Hg)",
            Self::Cholesterol => "Serum Cholesterol (mg/dl)",
            Self::FastingBloodSugar => "Fasting Blood Sugar > 120 mg/dl",
            Self::RestingEcg => "Resting ECG Results",
            Self::MaxHeartRate => "Max Heart Rate Achieved (bpm)",
            Self::ExerciseAngina => "Exercise Induced Angina",
            Self::StDepression => "ST Depression (oldpeak)",
            Self::StSlope => "Slope of ST Segment",
            Self::MajorVessels => "Major Vessels Colored by Fluoroscopy",
            Self::Thalassemia => "Thalassemia Type",
        }
    }

    #[must_use]
    pub fn help(self) -> &'static str {
        match self {
            Self::Age => "Age in years. Risk increases with age.",
            Self::Sex => "Biological sex. Males may have higher early-life risk.",
            Self::ChestPain => "Typical, atypical, non-anginal, or no chest pain.",
            Self::RestingBp => "Blood pressure while resting. High BP is a major risk factor.",
            Self::Cholesterol => "Cholesterol level. High values can indicate heart risk.",
            Self::FastingBloodSugar => "Blood sugar level after fasting. Can indicate diabetes.",
            Self::RestingEcg => {
                "Normal: no abnormalities. ST-T: possible ischemia. LVH: thickened heart muscle."
            }
            Self::MaxHeartRate => {
                "Peak exercise heart rate. Lower values could suggest cardiovascular stress."
            }
            Self::ExerciseAngina => "Chest pain caused by exercise, often a symptom of blocked arteries.",
            Self::StDepression => "ST segment depression during exercise. Higher values mean higher risk.",
            Self::StSlope => "Trend of ST segment on ECG. Flat or downsloping can indicate abnormality.",
            Self::MajorVessels => "Count of major vessels visible under imaging. Higher is worse.",
            Self::Thalassemia => "Blood disorder type affecting oxygen flow.",
        }
    }

    /// Slider bounds, or `None` for a choice field.
    #[must_use]
    pub fn range(self) -> Option<NumericRange> {
        match self {
            Self::Age => Some(AGE_RANGE),
            Self::RestingBp => Some(RESTING_BP_RANGE),
            Self::Cholesterol => Some(CHOLESTEROL_RANGE),
            Self::MaxHeartRate => Some(MAX_HEART_RATE_RANGE),
            Self::StDepression => Some(ST_DEPRESSION_RANGE),
            _ => None,
        }
    }
}

fn cycle<T: Choice>(value: T, steps: i32) -> T {
    match steps.signum() {
        1 => value.next(),
        -1 => value.prev(),
        _ => value,
    }
}

/// Form state: the values being edited and the selected row.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub input: PatientInput,
    pub selected: usize,
}

impl FormState {
    #[must_use]
    pub fn selected_field(&self) -> Field {
        Field::ALL[self.selected]
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % Field::ALL.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected == 0 {
            self.selected = Field::ALL.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    /// Move the selected slider by `steps` increments, or cycle the selected
    /// choice once in the direction of `steps`.
    pub fn adjust(&mut self, steps: i32) {
        let field = self.selected_field();
        let input = &mut self.input;
        match field {
            Field::Age => input.age = AGE_RANGE.adjust(input.age, steps),
            Field::Sex => input.sex = cycle(input.sex, steps),
            Field::ChestPain => input.chest_pain = cycle(input.chest_pain, steps),
            Field::RestingBp => input.resting_bp = RESTING_BP_RANGE.adjust(input.resting_bp, steps),
            Field::Cholesterol => {
                input.cholesterol = CHOLESTEROL_RANGE.adjust(input.cholesterol, steps);
            }
            Field::FastingBloodSugar => {
                input.fasting_blood_sugar = cycle(input.fasting_blood_sugar, steps);
            }
            Field::RestingEcg => input.resting_ecg = cycle(input.resting_ecg, steps),
            Field::MaxHeartRate => {
                input.max_heart_rate = MAX_HEART_RATE_RANGE.adjust(input.max_heart_rate, steps);
            }
            Field::ExerciseAngina => input.exercise_angina = cycle(input.exercise_angina, steps),
            Field::StDepression => {
                input.st_depression = ST_DEPRESSION_RANGE.adjust(input.st_depression, steps);
            }
            Field::StSlope => input.st_slope = cycle(input.st_slope, steps),
            Field::MajorVessels => input.major_vessels = cycle(input.major_vessels, steps),
            Field::Thalassemia => input.thalassemia = cycle(input.thalassemia, steps),
        }
    }

    /// Restore every field to its default, keeping the selected row.
    pub fn reset(&mut self) {
        self.input = PatientInput::default();
    }

    /// Current value of `field` as shown in the form.
    #[must_use]
    pub fn display_value(&self, field: Field) -> String {
        let input = &self.input;
        match field {
            Field::Age => format!("{:.0}", input.age),
            Field::Sex => input.sex.label().to_string(),
            Field::ChestPain => input.chest_pain.label().to_string(),
            Field::RestingBp => format!("{:.0}", input.resting_bp),
            Field::Cholesterol => format!("{:.0}", input.cholesterol),
            Field::FastingBloodSugar => input.fasting_blood_sugar.label().to_string(),
            Field::RestingEcg => input.resting_ecg.label().to_string(),
            Field::MaxHeartRate => format!("{:.0}", input.max_heart_rate),
            Field::ExerciseAngina => input.exercise_angina.label().to_string(),
            Field::StDepression => format!("{:.1}", input.st_depression),
            Field::StSlope => input.st_slope.label().to_string(),
            Field::MajorVessels => input.major_vessels.label().to_string(),
            Field::Thalassemia => input.thalassemia.label().to_string(),
        }
    }

    /// Position of a slider within its range, 0.0 to 1.0.
    #[must_use]
    pub fn slider_fraction(&self, field: Field) -> Option<f64> {
        let range = field.range()?;
        let value = match field {
            Field::Age => self.input.age,
            Field::RestingBp => self.input.resting_bp,
            Field::Cholesterol => self.input.cholesterol,
            Field::MaxHeartRate => self.input.max_heart_rate,
            Field::StDepression => self.input.st_depression,
            _ => return None,
        };
        Some(((range.clamp(value) - range.min) / (range.max - range.min)).clamp(0.0, 1.0))
    }
}

/// Render the prediction form
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Fields
            Constraint::Length(3), // Help
            Constraint::Length(2), // Key hints
        ])
        .split(area);

    render_fields(f, chunks[0], state);
    render_help(f, chunks[1], state);
    render_footer(f, chunks[2]);
}

fn slider_bar(fraction: f64) -> Line<'static> {
    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    Line::from(vec![
        Span::styled("━".repeat(filled), MedicalTheme::border_focused()),
        Span::styled("●", MedicalTheme::subtitle()),
        Span::styled("─".repeat(BAR_WIDTH - filled), MedicalTheme::track()),
    ])
}

fn render_fields(f: &mut Frame, area: Rect, state: &FormState) {
    let rows: Vec<Row> = Field::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let value = if field.range().is_some() {
                state.display_value(*field)
            } else {
                format!("◀ {} ▶", state.display_value(*field))
            };
            let bar = state
                .slider_fraction(*field)
                .map(slider_bar)
                .unwrap_or_default();

            let row = Row::new(vec![
                Cell::from(field.label()),
                Cell::from(value),
                Cell::from(bar),
            ]);
            if i == state.selected {
                row.style(MedicalTheme::selected())
            } else {
                row.style(MedicalTheme::text())
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(38),
            Constraint::Length(30),
            Constraint::Min(BAR_WIDTH as u16 + 1),
        ],
    )
    .block(
        Block::default()
            .title(Span::styled(" Patient Parameters ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border_focused()),
    );

    f.render_widget(table, area);
}

fn render_help(f: &mut Frame, area: Rect, state: &FormState) {
    let help = Paragraph::new(Line::from(Span::styled(
        state.selected_field().help(),
        MedicalTheme::text_secondary(),
    )))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(help, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled("[↑↓] ", MedicalTheme::key_hint()),
        Span::styled("Select ", MedicalTheme::key_desc()),
        Span::styled("[←→] ", MedicalTheme::key_hint()),
        Span::styled("Adjust ", MedicalTheme::key_desc()),
        Span::styled("[PgUp/PgDn] ", MedicalTheme::key_hint()),
        Span::styled("×10 ", MedicalTheme::key_desc()),
        Span::styled("[R] ", MedicalTheme::key_hint()),
        Span::styled("Reset ", MedicalTheme::key_desc()),
        Span::styled("[Enter] ", MedicalTheme::key_hint()),
        Span::styled("Predict ", MedicalTheme::key_desc()),
        Span::styled("[Q] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ]);
    f.render_widget(Paragraph::new(hints), area);
}
