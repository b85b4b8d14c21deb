//! Result view: echo of the submitted values and the risk message.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::domain::{Diagnosis, RiskLevel};
use crate::tui::styles::MedicalTheme;

/// Outcome of the last submission.
#[derive(Debug, Clone)]
pub enum ResultState {
    Complete { diagnosis: Diagnosis },
    Error { message: String },
}

/// Render the result screen
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(area);

    match state {
        ResultState::Complete { diagnosis } => render_diagnosis(f, chunks[0], diagnosis),
        ResultState::Error { message } => render_error(f, chunks[0], message),
    }
    render_footer(f, chunks[1]);
}

fn render_diagnosis(f: &mut Frame, area: Rect, diagnosis: &Diagnosis) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(15), // Echo table
            Constraint::Length(4),  // Message
            Constraint::Length(3),  // Probability gauge
            Constraint::Min(0),
        ])
        .split(area);

    let rows: Vec<Row> = diagnosis
        .input
        .summary()
        .into_iter()
        .map(|(column, value)| {
            Row::new(vec![
                Cell::from(Span::styled(column, MedicalTheme::text_secondary())),
                Cell::from(Span::styled(value, MedicalTheme::text())),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(18), Constraint::Min(10)]).block(
        Block::default()
            .title(Span::styled(" Your Input Summary ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(table, chunks[0]);

    let risk_style = MedicalTheme::risk_level(diagnosis.risk_level);
    let icon = match diagnosis.risk_level {
        RiskLevel::Low => "OK",
        RiskLevel::Moderate | RiskLevel::High => "!",
    };
    let message = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{icon} {}", diagnosis.message()),
            risk_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            diagnosis.risk_level.description(),
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(risk_style),
    );
    f.render_widget(message, chunks[1]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Disease Probability ", MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(risk_style)
        .ratio(diagnosis.result.probability.clamp(0.0, 1.0))
        .label(diagnosis.result.percent());
    f.render_widget(gauge, chunks[2]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Prediction failed", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled("[Enter/Esc] ", MedicalTheme::key_hint()),
        Span::styled("Edit values ", MedicalTheme::key_desc()),
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New form ", MedicalTheme::key_desc()),
        Span::styled("[Q] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ]);
    f.render_widget(Paragraph::new(hints), area);
}
