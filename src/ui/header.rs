//! Header, tab bar, status bar and navigation bar

use crate::components::keybindings::NavBarItem;
use crate::session::Session;
use crate::theme::{Styles, Theme};
use crate::types::Tab;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};
use strum::IntoEnumIterator;

/// Renders the fixed chrome around the tab content
pub struct HeaderRenderer {
    header_lines: Vec<Line<'static>>,
}

impl Default for HeaderRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderRenderer {
    pub fn new() -> Self {
        Self {
            header_lines: Self::create_header(),
        }
    }

    pub fn render_header(&self, f: &mut Frame, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let header = Paragraph::new(self.header_lines.clone())
            .block(Block::default().borders(Borders::NONE))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    pub fn render_tabs(&self, f: &mut Frame, area: Rect, current: Tab) {
        let titles: Vec<Line> = Tab::iter()
            .enumerate()
            .map(|(i, tab)| Line::from(format!(" {} {} ", i + 1, tab)))
            .collect();
        let selected = Tab::iter().position(|t| t == current).unwrap_or(0);

        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Styles::border_inactive()),
            )
            .style(Styles::tab_inactive())
            .highlight_style(Styles::tab_active())
            .select(selected)
            .divider("|");
        f.render_widget(tabs, area);
    }

    /// Status message on the left, detected managers in the middle and the
    /// activity indicator on the right
    pub fn render_status_bar(&self, f: &mut Frame, area: Rect, session: &Session) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border_inactive())
            .style(Styles::panel_bg_alt());
        let inner = block.inner(area);
        f.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Percentage(40),
                Constraint::Percentage(15),
            ])
            .split(inner);

        f.render_widget(
            Paragraph::new(session.status().to_string()).style(Styles::text()),
            columns[0],
        );

        let managers = if session.is_rescanning() {
            "Detecting package managers...".to_string()
        } else {
            session.registry().summary()
        };
        f.render_widget(
            Paragraph::new(managers)
                .style(Styles::text_muted())
                .alignment(Alignment::Center),
            columns[1],
        );

        let installing = session.is_installing();
        let indicator = if installing { "● Working" } else { "● Ready" };
        f.render_widget(
            Paragraph::new(indicator)
                .style(Theme::activity_style(installing))
                .alignment(Alignment::Right),
            columns[2],
        );
    }

    fn create_header() -> Vec<Line<'static>> {
        vec![
            Line::from(vec![Span::styled(
                "Development Environment Setup",
                Styles::title(),
            )]),
            Line::from(vec![Span::styled(
                "Pick a package manager and a stack, then start the installation",
                Styles::text_muted(),
            )]),
        ]
    }
}

/// Render the navigation bar: `Key Label  Key Label ...`
pub fn render_nav_bar(f: &mut Frame, area: Rect, items: &[NavBarItem]) {
    let mut spans = Vec::with_capacity(items.len() * 3);
    for item in items {
        spans.push(Span::styled(format!(" {} ", item.key_display), Styles::key_hint()));
        spans.push(Span::styled(item.action_label.clone(), Styles::nav_hint()));
        spans.push(Span::raw("  "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
