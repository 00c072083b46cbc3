//! Stateless rendering of [`AnalysisState`]
//!
//! One column (input + progress) until any stage has produced data, then
//! two columns with the results on the right. Only stages whose visibility
//! flag is set are drawn.

use crate::analysis::{AnalysisState, ProgressStep, Stage};
use crate::i18n::{t, Text};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::format::{stage_entries, Entry};
use super::theme::{Icons, Theme};

/// Everything one frame needs
pub struct ViewContext<'a> {
    pub state: &'a AnalysisState,
    pub input: &'a str,
    pub spinner: &'a str,
    pub theme: &'a Theme,
    pub user: Option<&'a str>,
    pub results_scroll: u16,
}

pub fn render(frame: &mut Frame, view: &ViewContext) {
    let area = frame.area();
    frame.render_widget(Block::default().style(view.theme.base_style()), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(6),    // Body
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    render_header(frame, rows[0], view);

    if view.state.visibility().any() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);
        render_left_column(frame, columns[0], view);
        render_results(frame, columns[1], view);
    } else {
        render_left_column(frame, rows[1], view);
    }

    render_hints(frame, rows[2], view);
}

fn render_header(frame: &mut Frame, area: Rect, view: &ViewContext) {
    let mut spans = vec![Span::styled(t(Text::AppTitle), view.theme.title_style())];
    if let Some(user) = view.user {
        spans.push(Span::styled(format!("  [{}]", user), view.theme.muted_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_left_column(frame: &mut Frame, area: Rect, view: &ViewContext) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    render_input(frame, chunks[0], view);
    render_progress(frame, chunks[1], view);
}

fn render_input(frame: &mut Frame, area: Rect, view: &ViewContext) {
    let loading = view.state.is_loading();
    let line = if view.input.is_empty() && !loading {
        Line::from(Span::styled(t(Text::InputPlaceholder), view.theme.muted_style()))
    } else {
        Line::from(vec![
            Span::styled(format!("{} ", Icons::PROMPT), view.theme.accent_style()),
            Span::raw(view.input),
        ])
    };

    let block = Block::default()
        .title(t(Text::InputTitle))
        .borders(Borders::ALL)
        .border_style(view.theme.border_style(!loading));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_progress(frame: &mut Frame, area: Rect, view: &ViewContext) {
    let state = view.state;
    let mut lines = Vec::new();

    if let Some(error) = state.error() {
        lines.push(Line::from(Span::styled(
            format!("{} {}", Icons::ERROR, error),
            view.theme.error_style(),
        )));
    }

    if !state.query().is_empty() {
        lines.push(Line::from(Span::styled(
            state.query().to_string(),
            view.theme.label_style(),
        )));
    }

    lines.extend(state.ledger().steps().iter().map(|step| step_line(step, view)));

    if state.is_loading() {
        lines.push(Line::from(Span::styled(
            format!("{} {}", view.spinner, t(Text::Analyzing)),
            view.theme.warning_style(),
        )));
    } else if state.is_terminal() {
        lines.push(Line::from(Span::styled(
            format!("{} {}", Icons::COMPLETED, t(Text::Completed)),
            view.theme.success_style(),
        )));
    } else if lines.is_empty() {
        lines.push(Line::from(Span::styled(t(Text::Ready), view.theme.muted_style())));
    }

    // Keep the newest steps on screen
    let height = area.height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(height);

    let block = Block::default()
        .title(t(Text::ProgressTitle))
        .borders(Borders::ALL)
        .border_style(view.theme.border_style(false));
    let paragraph = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>())
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn step_line<'a>(step: &'a ProgressStep, view: &ViewContext) -> Line<'a> {
    let (icon, style) = if step.is_completed() {
        (Icons::COMPLETED, view.theme.success_style())
    } else {
        (Icons::PENDING, view.theme.warning_style())
    };

    let mut spans = vec![
        Span::styled(format!("{} ", icon), style),
        Span::styled(step.title.as_str(), view.theme.label_style()),
    ];
    if !step.description.is_empty() && step.description != step.title {
        spans.push(Span::styled(
            format!("  {}", step.description),
            view.theme.muted_style(),
        ));
    }
    Line::from(spans)
}

fn render_results(frame: &mut Frame, area: Rect, view: &ViewContext) {
    let state = view.state;
    let mut lines: Vec<Line> = Vec::new();

    for stage in state.visibility().visible_stages() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.extend(stage_lines(stage, view));
    }

    let block = Block::default()
        .title(t(Text::ResultsTitle))
        .borders(Borders::ALL)
        .border_style(view.theme.border_style(false));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((view.results_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn stage_lines(stage: Stage, view: &ViewContext) -> Vec<Line<'static>> {
    let theme = view.theme;
    let mut lines = vec![Line::from(Span::styled(stage.title(), theme.title_style()))];

    for entry in stage_entries(stage, view.state.result()) {
        let line = match entry {
            Entry::Field { label, value } => Line::from(vec![
                Span::styled(format!("  {}: ", label), theme.label_style()),
                Span::raw(value),
            ]),
            Entry::Heading(heading) => {
                Line::from(Span::styled(format!("  {}", heading), theme.label_style()))
            }
            Entry::Item(item) => Line::from(vec![
                Span::styled(format!("    {} ", Icons::BULLET), theme.accent_style()),
                Span::raw(item),
            ]),
        };
        lines.push(line);
    }

    lines
}

fn render_hints(frame: &mut Frame, area: Rect, view: &ViewContext) {
    let line = Line::from(vec![
        Span::styled(t(Text::PressEnterToSubmit), view.theme.shortcut_key_style()),
        Span::raw("  "),
        Span::styled(t(Text::PressEscToQuit), view.theme.muted_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
