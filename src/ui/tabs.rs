//! Tab content rendering

use crate::app::{AppState, SetupRow, setup_rows};
use crate::session::Session;
use crate::theme::{Colors, Styles, Theme};
use crate::types::{ManagerChoice, Setting, TOOL_CATALOG};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use strum::IntoEnumIterator;

fn panel(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .border_style(if focused {
            Styles::border_active()
        } else {
            Styles::border_inactive()
        })
}

fn split_columns(area: Rect, left: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(left), Constraint::Percentage(100 - left)])
        .split(area);
    (chunks[0], chunks[1])
}

fn render_list(f: &mut Frame, area: Rect, block: Block, items: Vec<ListItem>, selected: usize) {
    let mut list_state = ListState::default().with_selected(Some(selected));
    let list = List::new(items)
        .block(block)
        .highlight_style(Styles::selected())
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut list_state);
}

/// Quick Setup: manager choice, stack shortcuts and action buttons
pub fn render_setup_tab(f: &mut Frame, area: Rect, state: &AppState, session: &Session) {
    let (left, right) = split_columns(area, 55);
    let rows = setup_rows(&session.stack_names());

    let mut items = Vec::with_capacity(rows.len());
    let mut selected_item = 0;
    let mut last_kind = None;
    for (i, row) in rows.iter().enumerate() {
        let kind = std::mem::discriminant(row);
        if last_kind != Some(kind) {
            let heading = match row {
                SetupRow::Manager(_) => "Package Manager",
                SetupRow::Stack(_) => "Quick Stacks",
                SetupRow::Action(_) => "Actions",
            };
            if last_kind.is_some() {
                items.push(ListItem::new(""));
            }
            items.push(ListItem::new(Line::from(Span::styled(heading, Styles::category()))));
            last_kind = Some(kind);
        }
        if i == state.setup_selection {
            selected_item = items.len();
        }
        let text = match row {
            SetupRow::Manager(choice) => {
                let available = match choice {
                    ManagerChoice::Manager(pm) => {
                        match session.registry().version(*pm) {
                            Some(v) => format!("  v{}", v),
                            None => "  (not detected)".to_string(),
                        }
                    }
                    ManagerChoice::Auto => String::new(),
                };
                format!(
                    "  {} {}{}",
                    Theme::radio(session.choice == *choice),
                    choice.label(),
                    available
                )
            }
            SetupRow::Stack(name) => format!(
                "  {} Setup {}",
                Theme::checkbox(session.is_stack_selected(name)),
                name
            ),
            SetupRow::Action(action) => format!("  [ {} ]", action.label()),
        };
        items.push(ListItem::new(text).style(Styles::text_secondary()));
    }
    render_list(f, left, panel("Quick Setup", true), items, selected_item);

    let request = session.install_request();
    let mut summary = vec![
        Line::from(vec![
            Span::styled("Package manager: ", Styles::text_muted()),
            Span::styled(request.manager.label(), Styles::text()),
        ]),
        Line::from(vec![
            Span::styled("Selected stacks: ", Styles::text_muted()),
            Span::styled(
                if session.selected_stacks().is_empty() {
                    "none".to_string()
                } else {
                    session.selected_stacks().join(", ")
                },
                Styles::text(),
            ),
        ]),
        Line::from(vec![
            Span::styled("Selected tools:  ", Styles::text_muted()),
            Span::styled(session.selected_tools().len().to_string(), Styles::text()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Command", Styles::category())),
    ];
    summary.push(Line::from(Span::styled(
        session.script().command_line(&request).join(" "),
        Styles::text_secondary(),
    )));
    if let Some(outcome) = session.last_outcome() {
        summary.push(Line::from(""));
        summary.push(Line::from(Span::styled(
            outcome.log_message(),
            Theme::log_line_style(&outcome.log_message()),
        )));
    }
    f.render_widget(
        Paragraph::new(summary)
            .block(panel("Summary", false))
            .wrap(Wrap { trim: false }),
        right,
    );
}

/// Stacks: names on the left, details of the highlighted stack on the right
pub fn render_stacks_tab(f: &mut Frame, area: Rect, state: &AppState, session: &Session) {
    let names = session.stack_names();
    if names.is_empty() {
        f.render_widget(
            Paragraph::new("No stacks available. Add stacks to config.json and restart.")
                .style(Styles::warning())
                .block(panel("Development Stacks", true)),
            area,
        );
        return;
    }

    let (left, right) = split_columns(area, 35);
    let items: Vec<ListItem> = names
        .iter()
        .map(|name| {
            ListItem::new(format!(
                "{} {}",
                Theme::checkbox(session.is_stack_selected(name)),
                name
            ))
            .style(Styles::text_secondary())
        })
        .collect();
    let selected = state.stack_selection.min(names.len() - 1);
    render_list(f, left, panel("Development Stacks", true), items, selected);

    let details = session
        .stack_details(names[selected])
        .unwrap_or_default();
    let lines: Vec<Line> = details
        .lines()
        .map(|line| {
            if line.ends_with(':') || line.starts_with("Stack:") {
                Line::from(Span::styled(line.to_string(), Styles::category()))
            } else {
                Line::from(Span::styled(line.to_string(), Styles::text()))
            }
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines)
            .block(panel("Stack Details", false))
            .wrap(Wrap { trim: false }),
        right,
    );
}

/// Tools: the catalog grouped by category, each tool a checkbox
pub fn render_tools_tab(f: &mut Frame, area: Rect, state: &AppState, session: &Session) {
    let mut items = Vec::new();
    let mut selected_item = 0;
    let mut row = 0;
    for (category, tools) in TOOL_CATALOG {
        items.push(ListItem::new(Line::from(Span::styled(*category, Styles::category()))));
        for tool in *tools {
            if row == state.tool_selection {
                selected_item = items.len();
            }
            let checked = session.is_tool_selected(tool);
            let style = if checked {
                Styles::success()
            } else {
                Styles::text_secondary()
            };
            items.push(ListItem::new(format!("  {} {}", Theme::checkbox(checked), tool)).style(style));
            row += 1;
        }
    }
    render_list(f, area, panel("Individual Tools", true), items, selected_item);
}

/// Settings: one checkbox per option
pub fn render_settings_tab(f: &mut Frame, area: Rect, state: &AppState, session: &Session) {
    let items: Vec<ListItem> = Setting::iter()
        .map(|setting| {
            let checked = session.options.get(setting);
            let flag = match setting {
                Setting::DetailedLogging => "  (-Verbose)",
                Setting::DebugMode => "  (-Debug)",
                _ => "",
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", Theme::checkbox(checked)), Styles::text()),
                Span::styled(setting.to_string(), Styles::text_secondary()),
                Span::styled(flag, Styles::text_muted()),
            ]))
        })
        .collect();
    let selected = state.setting_selection.min(Setting::iter().count() - 1);
    render_list(f, area, panel("Settings", true), items, selected);
}

/// Log: the visible window of the log view, colored by content
pub fn render_log_tab(f: &mut Frame, area: Rect, session: &Session) {
    let view = session.log_view();
    let lines = view.lines();
    let height = area.height.saturating_sub(2) as usize;

    let max_start = lines.len().saturating_sub(height);
    let start = if view.follow {
        max_start
    } else {
        view.scroll_offset.min(max_start)
    };

    let visible: Vec<Line> = lines
        .iter()
        .skip(start)
        .take(height)
        .map(|line| {
            let (stamp, message) = line.split_at(line.find(']').map(|i| i + 1).unwrap_or(0));
            Line::from(vec![
                Span::styled(stamp.to_string(), Styles::text_muted()),
                Span::styled(message.to_string(), Theme::log_line_style(message)),
            ])
        })
        .collect();

    let title = format!(
        "Installation Log ({} lines{})",
        lines.len(),
        if view.follow { ", following" } else { "" }
    );
    let block = panel(&title, true).title_bottom(Line::from(Span::styled(
        " C clear | S save | R refresh ",
        Style::default()
            .fg(Colors::FG_MUTED)
            .add_modifier(Modifier::ITALIC),
    )));
    f.render_widget(Paragraph::new(visible).block(block), area);
}
