use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::config::{ApiConfig, GlobalAction, KeyResolver, NavAction};
use crate::ui::{Keybinding, truncate};

const LOGO: &[&str] = &[
    r"  ┌─┬─┬─┐      ",
    r"  ├─┼─┼─┤ ▲▼   ",
    r"  └─┴─┴─┘      ",
    r"  lazyflow     ",
];

/// Bottom panel: connection info, running commands, key hints and logo.
pub struct StatusBar {
    endpoint: String,
    tenant: Option<String>,
    resolver: Arc<KeyResolver>,
}

impl StatusBar {
    pub fn new(api: &ApiConfig, resolver: Arc<KeyResolver>) -> Self {
        Self {
            endpoint: api.web_base_url.clone(),
            tenant: api.effective_tenant().map(ToString::to_string),
            resolver,
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
        running: &[String],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface1()));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(42),
                Constraint::Min(20),
                Constraint::Length(16),
            ])
            .split(inner_area);

        self.render_status_info(frame, chunks[0], theme, running);
        self.render_keybindings(frame, chunks[1], theme, local_keybindings);
        Self::render_logo(frame, chunks[2], theme);
    }

    fn render_status_info(&self, frame: &mut Frame, area: Rect, theme: &Theme, running: &[String]) {
        let w = area.width as usize;
        let label_style = Style::default().fg(theme.overlay1());
        let value_style = Style::default().fg(theme.text());

        let mut lines = vec![
            status_line("api", &self.endpoint, w, label_style, value_style),
            status_line(
                "tenant",
                self.tenant.as_deref().unwrap_or("-"),
                w,
                label_style,
                value_style,
            ),
            Line::from(""),
        ];

        let rows_left = (area.height as usize).saturating_sub(lines.len());
        if running.is_empty() {
            lines.push(Line::from(Span::styled("idle", Style::default().fg(theme.overlay0()))));
        } else {
            let busy_style = Style::default().fg(theme.yellow()).add_modifier(Modifier::BOLD);
            lines.extend(running.iter().take(rows_left).map(|name| {
                Line::from(Span::styled(truncate(&format!("⟳ {name}"), w), busy_style))
            }));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_keybindings(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
    ) {
        let global_keybindings = self.global_keybindings();
        let hints: Vec<&Keybinding> = local_keybindings
            .iter()
            .chain(global_keybindings.iter())
            .filter(|kb| kb.hint)
            .collect();

        if hints.is_empty() || area.height == 0 {
            return;
        }

        // Align the separator into a straight column regardless of key length.
        let max_key_w = hints.iter().map(|kb| kb.key.chars().count()).max().unwrap_or(1);
        let max_desc_w = hints.iter().map(|kb| kb.description.chars().count()).max().unwrap_or(1);
        let col_width = u16::try_from(max_key_w + 3 + max_desc_w + 2).unwrap_or(u16::MAX);
        let num_cols = (area.width / col_width).max(1) as usize;
        let num_rows = area.height as usize;

        let mut columns: Vec<Vec<Line>> = vec![Vec::new(); num_cols];
        for (i, kb) in hints.iter().enumerate() {
            let col_idx = i / num_rows;
            if col_idx >= num_cols {
                break;
            }
            columns[col_idx].push(Line::from(vec![
                Span::styled(
                    format!("{:>max_key_w$}", kb.key),
                    Style::default().fg(theme.peach()),
                ),
                Span::styled(" │ ", Style::default().fg(theme.surface2())),
                Span::styled(kb.description.clone(), Style::default().fg(theme.subtext0())),
            ]));
        }

        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(col_width); num_cols])
            .split(area);

        for (col_lines, col_area) in columns.into_iter().zip(col_areas.iter()) {
            frame.render_widget(Paragraph::new(col_lines), *col_area);
        }
    }

    fn render_logo(frame: &mut Frame, area: Rect, theme: &Theme) {
        let style = Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD);
        let lines: Vec<Line> = LOGO.iter().map(|l| Line::from(Span::styled(*l, style))).collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    pub fn global_keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::hint(self.resolver.display_global(GlobalAction::Help), "Help"),
            Keybinding::hint(self.resolver.display_global(GlobalAction::Back), "Back"),
            Keybinding::new(self.resolver.display_global(GlobalAction::Quit), "Quit"),
            Keybinding::new(
                self.resolver.display_global(GlobalAction::CommandsToggle),
                "Running commands",
            ),
            Keybinding::new(self.resolver.display_nav(NavAction::Select), "Select"),
            Keybinding::new(
                format!(
                    "{}/{}",
                    self.resolver.display_nav(NavAction::Up),
                    self.resolver.display_nav(NavAction::Down)
                ),
                "Navigate",
            ),
        ]
    }
}

/// `  label value`, label right-aligned.
fn status_line<'a>(
    label: &'a str,
    value: &str,
    max_width: usize,
    label_style: Style,
    value_style: Style,
) -> Line<'a> {
    const LABEL_W: usize = 7;
    let available = max_width.saturating_sub(LABEL_W + 1);
    Line::from(vec![
        Span::styled(format!("{label:>LABEL_W$}"), label_style),
        Span::raw(" "),
        Span::styled(truncate(value, available), value_style),
    ])
}
