use chrono::{Local, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::error::Result;
use crate::fetch::{self, HttpSource, PendingLoad, StatsSource};
use crate::selection::Selection;
use crate::series::{axis_tick, ChartInput, CHART_TITLE, X_AXIS_TITLE, Y_AXIS_TITLE};
use crate::settings::Settings;
use crate::store::{Action, DashboardState, LoadStatus};
use crate::tui::{
    amount_span, run_screen, wrap_text, Screen, ScreenAction, ERROR_STYLE, FOOTER_STYLE,
    HEADER_STYLE, SELECTED_STYLE, WARN_STYLE,
};
use crate::view::{stat_cards, transaction_list, StatCard, TransactionList, CARD_CAPTION};

/// Interpolated samples drawn between two periods.
const SMOOTH_STEPS: usize = 12;
const Y_TICK_COUNT: usize = 5;

#[derive(Clone, Copy, PartialEq, Debug)]
enum Focus {
    Month,
    Year,
}

pub struct Dashboard {
    state: DashboardState,
    pending: Option<PendingLoad>,
    endpoint: String,
    focus: Focus,
    /// Period under the chart cursor, if any.
    cursor: Option<usize>,
}

impl Dashboard {
    pub fn new(state: DashboardState, endpoint: String) -> Self {
        Self {
            state,
            pending: None,
            endpoint,
            focus: Focus::Month,
            cursor: None,
        }
    }

    /// Start the one load for this mount. Later calls are ignored.
    pub fn mount<S: StatsSource>(&mut self, source: S) {
        if self.pending.is_some() {
            tracing::debug!("dashboard already mounted; not reloading");
            return;
        }
        self.pending = Some(fetch::load(source));
    }

    /// Tear down: a load still in flight will not touch state afterwards.
    pub fn unmount(&mut self) {
        if let Some(pending) = &self.pending {
            pending.unmount();
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn apply(&mut self, action: Action) {
        self.state.apply(action);
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.state.stats().chart_series.len();
        if len == 0 {
            self.cursor = None;
            return;
        }
        let next = match self.cursor {
            None if delta < 0 => len - 1,
            None => 0,
            Some(i) => (i as isize + delta).clamp(0, len as isize - 1) as usize,
        };
        self.cursor = Some(next);
    }

    fn step_selector(&mut self, delta: i32) {
        let mut next = *self.state.selection();
        match self.focus {
            Focus::Month => {
                next.step_month(delta);
                self.apply(Action::SelectMonth(next.month()));
            }
            Focus::Year => {
                next.step_year(delta);
                self.apply(Action::SelectYear(next.year()));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(" Stockboard", HEADER_STYLE),
            Span::styled(format!("  {}", self.endpoint), FOOTER_STYLE),
        ];
        match self.state.status() {
            LoadStatus::Unavailable { reason } => {
                spans.push(Span::styled("  STALE ", WARN_STYLE));
                spans.push(Span::styled(format!("data unavailable: {reason}"), WARN_STYLE));
            }
            LoadStatus::Rejected { reason } => {
                spans.push(Span::styled("  INVALID PAYLOAD ", ERROR_STYLE));
                spans.push(Span::styled(reason.clone(), ERROR_STYLE));
            }
            // No distinct loading indicator: until the first load lands the
            // zero-valued defaults are shown as-is.
            LoadStatus::Pending | LoadStatus::Loaded => {}
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_selectors(&self, frame: &mut Frame, area: Rect) {
        let selection = self.state.selection();
        let style_for = |focus: Focus| {
            if self.focus == focus {
                SELECTED_STYLE
            } else {
                Style::default()
            }
        };
        let label = Style::default().add_modifier(Modifier::BOLD);
        let mut spans = vec![
            Span::styled(" SELECT MONTH ", label),
            Span::styled(
                format!("< {:<9} >", selection.month().name()),
                style_for(Focus::Month),
            ),
            Span::raw("    "),
            Span::styled("SELECT YEAR ", label),
        ];
        for &year in selection.window().years() {
            if year == selection.year() {
                spans.push(Span::styled(format!("[{year}]"), style_for(Focus::Year)));
            } else {
                spans.push(Span::styled(format!(" {year} "), FOOTER_STYLE));
            }
        }
        spans.push(Span::styled(
            "    period is display-only; figures are not filtered by it",
            FOOTER_STYLE,
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_chart(&self, frame: &mut Frame, area: Rect) {
        let input = ChartInput::from_series(&self.state.stats().chart_series);
        let border = if self.state.is_stale() {
            WARN_STYLE
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(CHART_TITLE)
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(border);

        if input.is_empty() {
            let inner_height = area.height.saturating_sub(2);
            let mut lines = vec![Line::from(""); (inner_height / 2) as usize];
            lines.push(Line::from(Span::styled("No chart data", FOOTER_STYLE)));
            frame.render_widget(
                Paragraph::new(lines).block(block).alignment(Alignment::Center),
                area,
            );
            return;
        }

        let [y_lo, y_hi] = input.y_bounds();
        let x_hi = (input.labels.len().saturating_sub(1)).max(1) as f64;

        // Dataset borrows its points, so every path must outlive the chart.
        let paths: Vec<(Vec<(f64, f64)>, Vec<(f64, f64)>)> = input
            .series()
            .iter()
            .map(|s| (s.smoothed_points(SMOOTH_STEPS, [y_lo, y_hi]), s.points()))
            .collect();
        let cursor_line: Vec<(f64, f64)> = self
            .cursor
            .map(|i| vec![(i as f64, y_lo), (i as f64, y_hi)])
            .unwrap_or_default();

        let mut datasets = Vec::new();
        for (series, (path, _)) in input.series().iter().zip(&paths) {
            if series.style.fill {
                datasets.push(
                    Dataset::default()
                        .marker(Marker::Braille)
                        .graph_type(GraphType::Bar)
                        .style(Style::default().fg(series.style.fill_color()))
                        .data(path),
                );
            }
        }
        if !cursor_line.is_empty() {
            datasets.push(
                Dataset::default()
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(FOOTER_STYLE)
                    .data(&cursor_line),
            );
        }
        for (series, (path, points)) in input.series().iter().zip(&paths) {
            let color = series.style.line_color();
            datasets.push(
                Dataset::default()
                    .name(series.label)
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(color))
                    .data(path),
            );
            datasets.push(
                Dataset::default()
                    .marker(Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                    .data(points),
            );
        }

        let x_labels: Vec<Span> = input.labels.iter().map(|l| Span::raw(l.clone())).collect();
        let y_labels: Vec<Span> = input
            .y_ticks(Y_TICK_COUNT)
            .into_iter()
            .map(|v| Span::raw(axis_tick(v)))
            .collect();

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title(Span::styled(X_AXIS_TITLE, FOOTER_STYLE))
                    .bounds([0.0, x_hi])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled(Y_AXIS_TITLE, FOOTER_STYLE))
                    .bounds([y_lo, y_hi])
                    .labels(y_labels),
            );
        frame.render_widget(chart, area);

        if let Some(lines) = self.cursor.and_then(|i| input.tooltip_at(i)) {
            self.draw_tooltip(frame, area, lines);
        }
    }

    fn draw_tooltip(&self, frame: &mut Frame, chart_area: Rect, lines: Vec<String>) {
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = u16::try_from(widest).unwrap_or(u16::MAX).saturating_add(4);
        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
        let area = Rect {
            x: chart_area.x + chart_area.width.saturating_sub(width.saturating_add(2)),
            y: chart_area.y + 1,
            width: width.min(chart_area.width),
            height: height.min(chart_area.height),
        };
        let mut text = Vec::new();
        for (i, l) in lines.into_iter().enumerate() {
            let style = if i == 0 {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            text.push(Line::from(Span::styled(format!(" {l}"), style)));
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black).fg(Color::White));
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn draw_cards(&self, frame: &mut Frame, area: Rect) {
        let cards = stat_cards(self.state.stats());
        let areas = Layout::horizontal([Constraint::Ratio(1, 5); 5]).split(area);
        for (card, card_area) in cards.iter().zip(areas.iter()) {
            draw_card(frame, *card_area, card);
        }
    }

    fn draw_transactions(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Recent Transactions ")
            .title_style(HEADER_STYLE)
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match transaction_list(self.state.stats(), &Local) {
            TransactionList::Empty(empty) => {
                let (hint, _) = wrap_text(empty.hint, inner.width.saturating_sub(2) as usize);
                let mut lines = vec![
                    Line::from(""),
                    Line::from(Span::styled(empty.icon, FOOTER_STYLE)),
                    Line::from(Span::styled(
                        empty.headline,
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                ];
                lines.extend(
                    hint.lines()
                        .map(|l| Line::from(Span::styled(l.to_string(), FOOTER_STYLE))),
                );
                frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
            }
            TransactionList::Rows(rows) => {
                let width = inner.width as usize;
                let mut lines = Vec::new();
                for row in rows {
                    let left = format!(" {}", row.product);
                    let pad = width
                        .saturating_sub(left.chars().count() + row.amount.chars().count() + 1);
                    lines.push(Line::from(vec![
                        Span::styled(left, Style::default().add_modifier(Modifier::BOLD)),
                        Span::raw(" ".repeat(pad)),
                        amount_span(row.kind, row.amount),
                    ]));

                    let left = format!(" {}", row.counterparty);
                    let pad = width
                        .saturating_sub(left.chars().count() + row.date.chars().count() + 1);
                    lines.push(Line::from(vec![
                        Span::styled(left, FOOTER_STYLE),
                        Span::raw(" ".repeat(pad)),
                        Span::styled(row.date, FOOTER_STYLE),
                    ]));
                }
                frame.render_widget(Paragraph::new(lines), inner);
            }
        }
    }
}

fn draw_card(frame: &mut Frame, area: Rect, card: &StatCard) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(card.accent))
        .style(Style::default().bg(card.background).fg(Color::White));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let title_width = inner.width.saturating_sub(card.icon.chars().count() as u16 + 1) as usize;
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{:<title_width$}", card.title),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(card.icon, Style::default().fg(card.accent)),
        ]),
        Line::from(Span::styled(
            card.value.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("▲ ", Style::default().fg(Color::Rgb(80, 220, 100))),
            Span::raw(CARD_CAPTION),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

impl Screen for Dashboard {
    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, sep1, selector_area, sep2, chart_area, cards_area, list_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(3),
                Constraint::Length(5),
                Constraint::Fill(2),
                Constraint::Length(1),
            ])
            .areas(area);

        self.draw_header(frame, header_area);

        let sep_line = "━".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget, sep2);

        self.draw_selectors(frame, selector_area);
        self.draw_chart(frame, chart_area);
        self.draw_cards(frame, cards_area);
        self.draw_transactions(frame, list_area);

        frame.render_widget(
            Paragraph::new(" Tab=switch selector  Left/Right=change  [/]=inspect period  q=quit")
                .style(FOOTER_STYLE),
            hints_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ScreenAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ScreenAction::Close,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Month => Focus::Year,
                    Focus::Year => Focus::Month,
                };
            }
            KeyCode::Left | KeyCode::Char('h') => self.step_selector(-1),
            KeyCode::Right | KeyCode::Char('l') => self.step_selector(1),
            KeyCode::Char('[') => self.move_cursor(-1),
            KeyCode::Char(']') => self.move_cursor(1),
            KeyCode::Char('x') => self.cursor = None,
            _ => {}
        }
        ScreenAction::Continue
    }

    fn tick(&mut self) {
        let action = match self.pending.as_mut() {
            Some(pending) if !pending.is_finished() => pending.poll(),
            _ => None,
        };
        if let Some(action) = action {
            self.apply(action);
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Selection seeded from today, then from `--month` / `--year`. Values the
/// selector cannot show are ignored.
pub fn initial_selection(month: Option<&str>, year: Option<i32>, today: NaiveDate) -> Selection {
    let mut selection = Selection::seeded(today);
    if let Some(name) = month {
        if !selection.set_month_name(name) {
            tracing::warn!(month = name, "unknown month name; keeping the current month");
        }
    }
    if let Some(year) = year {
        if !selection.set_year(year) {
            tracing::warn!(year, "year outside the selectable window; keeping the current year");
        }
    }
    selection
}

/// Interactive dashboard: mount, load once, render until the user quits.
pub fn run(settings: &Settings, month: Option<&str>, year: Option<i32>) -> Result<()> {
    let source = HttpSource::new(&settings.endpoint, settings.timeout())?;
    let selection = initial_selection(month, year, Local::now().date_naive());
    let mut dashboard = Dashboard::new(DashboardState::new(selection), settings.endpoint.clone());
    dashboard.mount(source);
    let result = run_screen(&mut dashboard);
    dashboard.unmount();
    tracing::info!("dashboard closed");
    result
}
