use crate::diff::{DiffRow, LineKind};
use crate::state::{App, PanelRow};
use crate::theme::{self, icons, Palette};
use carrot_core::language::detect_language;
use carrot_core::settings::{font_label, MAX_FONT_SIZE, THEME_NAMES};
use carrot_core::{EditorFile, PanelSide};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

const TAB_WIDTH: usize = 4;

pub fn render(f: &mut Frame, app: &mut App) {
    let palette = theme::palette(app.settings.theme_name());
    let area = f.size();
    f.render_widget(Block::default().style(palette.base()), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_tab_bar(f, app, &palette, rows[0]);

    let body = if app.show_help || app.show_settings {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(rows[1]);
        if app.show_help {
            render_help(f, &palette, split[1]);
        } else {
            render_settings(f, app, &palette, split[1]);
        }
        split[0]
    } else {
        rows[1]
    };

    if app.compare_mode() {
        app.update_layout(None, None);
        render_diff(f, app, &palette, body);
    } else {
        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body);
        app.update_layout(Some(panels[0]), Some(panels[1]));
        render_panel(f, app, &palette, PanelSide::Left, panels[0]);
        render_panel(f, app, &palette, PanelSide::Right, panels[1]);
    }

    render_status_bar(f, app, &palette, rows[2]);
}

fn render_tab_bar(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let active = app.session.active_index();
    let mut spans = Vec::new();
    for (index, tab) in app.session.tabs().iter().enumerate() {
        let label = format!(" {}:{} ", index + 1, tab.title);
        if index == active {
            spans.push(Span::styled(label, palette.selected()));
        } else {
            spans.push(Span::styled(label, Style::new().fg(palette.muted)));
        }
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_panel(f: &mut Frame, app: &mut App, palette: &Palette, side: PanelSide, area: Rect) {
    let focused = app.focused == side;
    let tab = app.session.active_tab();
    let panel = tab.panels.get(side);
    let title = if let Some(listing) = &panel.directory {
        format!(" {}: {} ", side_label(side), listing.root_path)
    } else if let Some(file) = &panel.file {
        format!(" {}: {} ", side_label(side), file.path)
    } else {
        format!(" {} ", side_label(side))
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(palette.border(focused));

    if let Some(file) = panel.file.clone() {
        let scroll = app.view_mut(side).file_scroll;
        let p = Paragraph::new(numbered_lines(&file, palette))
            .block(block)
            .scroll((scroll, 0));
        f.render_widget(p, area);
        return;
    }

    if panel.directory.is_none() {
        let text = vec![
            Line::from(Span::styled("Nothing open", palette.header())),
            Line::from(""),
            Line::from(vec![
                Span::styled("o", Style::new().fg(palette.focus)),
                Span::raw("  open a file"),
            ]),
            Line::from(vec![
                Span::styled("O", Style::new().fg(palette.focus)),
                Span::raw("  open a directory"),
            ]),
            Line::from(vec![
                Span::styled("Tab", Style::new().fg(palette.focus)),
                Span::raw("  switch side"),
            ]),
        ];
        let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
        f.render_widget(p, area);
        return;
    }

    let rows = app.panel_rows(side);
    if rows.is_empty() {
        let message = if app.only_different {
            "No differences"
        } else {
            "Empty directory"
        };
        let p = Paragraph::new(Span::styled(message, Style::new().fg(palette.muted))).block(block);
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = rows.iter().map(|row| tree_item(row, palette)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(if focused {
            palette.selected()
        } else {
            Style::new().add_modifier(Modifier::REVERSED)
        });
    app.clamp_selection(side);
    f.render_stateful_widget(list, area, &mut app.view_mut(side).list_state);
}

fn tree_item(row: &PanelRow, palette: &Palette) -> ListItem<'static> {
    let mut spans = vec![Span::raw("  ".repeat(row.depth))];
    if row.entry.is_dir {
        let marker = if row.expanded {
            icons::EXPANDED
        } else {
            icons::COLLAPSED
        };
        spans.push(Span::styled(
            format!("{marker} "),
            Style::new().fg(palette.muted),
        ));
        spans.push(Span::styled(
            format!("{}/", row.entry.name),
            palette.highlight(row.highlight).add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            row.entry.name.clone(),
            palette.highlight(row.highlight),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn numbered_lines(file: &EditorFile, palette: &Palette) -> Vec<Line<'static>> {
    file.contents
        .lines()
        .enumerate()
        .map(|(index, text)| {
            Line::from(vec![
                Span::styled(format!("{:>5} ", index + 1), Style::new().fg(palette.muted)),
                Span::raw(expand_tabs(text)),
            ])
        })
        .collect()
}

fn render_diff(f: &mut Frame, app: &mut App, palette: &Palette, area: Rect) {
    let tab = app.session.active_tab();
    let left_name = tab
        .panels
        .left
        .file
        .as_ref()
        .map(|file| file.name.clone())
        .unwrap_or_default();
    let right_name = tab
        .panels
        .right
        .file
        .as_ref()
        .map(|file| file.name.clone())
        .unwrap_or_default();
    let language = detect_language(&left_name);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {left_name} | {right_name} ({language}) "))
        .border_style(palette.border(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    app.set_diff_viewport(inner.height as usize);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let rows = app.diff_rows();
    let start = app.diff_state.scroll_top.min(rows.len());
    let end = (start + inner.height as usize).min(rows.len());
    let mut left_lines = Vec::with_capacity(end - start);
    let mut right_lines = Vec::with_capacity(end - start);

    for (offset, row) in rows[start..end].iter().enumerate() {
        let at_cursor = start + offset == app.diff_state.cursor_line;
        let (left, right) = match *row {
            DiffRow::Folded { len, .. } => {
                let text = format!("{} {len} unchanged lines", icons::FOLDED);
                let style = Style::new()
                    .fg(palette.muted)
                    .add_modifier(Modifier::ITALIC);
                (
                    Line::from(Span::styled(text.clone(), style)),
                    Line::from(Span::styled(text, style)),
                )
            }
            DiffRow::Line(index) => {
                let line = &app.diff_lines[index];
                let text = expand_tabs(&line.text);
                match line.kind {
                    LineKind::Equal => (
                        diff_cell(line.old_number, &text, Style::new()),
                        diff_cell(line.new_number, &text, Style::new()),
                    ),
                    LineKind::Delete => (
                        diff_cell(line.old_number, &text, Style::new().bg(palette.deleted_bg)),
                        Line::from(""),
                    ),
                    LineKind::Insert => (
                        Line::from(""),
                        diff_cell(line.new_number, &text, Style::new().bg(palette.inserted_bg)),
                    ),
                }
            }
        };
        let (mut left, mut right) = (left, right);
        if at_cursor {
            left.style = palette.selected();
            right.style = palette.selected();
        }
        left_lines.push(left);
        right_lines.push(right);
    }

    f.render_widget(Paragraph::new(left_lines), columns[0]);
    f.render_widget(Paragraph::new(right_lines), columns[1]);
}

fn diff_cell(number: Option<usize>, text: &str, style: Style) -> Line<'static> {
    let number = number.map(|n| format!("{n:>5} ")).unwrap_or_else(|| "      ".to_string());
    let mut line = Line::from(vec![Span::raw(number), Span::raw(text.to_string())]);
    line.style = style;
    line
}

fn render_help(f: &mut Frame, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::new().fg(palette.accent));
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("{k:<10}"), Style::new().fg(palette.focus)),
            Span::raw(what),
        ])
    };
    let text = vec![
        Line::from(Span::styled("Keyboard Shortcuts", palette.header())),
        Line::from(""),
        key("Tab", "Switch side"),
        key("j / Down", "Next row / line"),
        key("k / Up", "Previous row / line"),
        key("PgDn/PgUp", "Page down / up"),
        key("Space", "Expand/collapse directory"),
        key("Enter", "Open file with its counterpart"),
        key("o", "Open file on focused side"),
        key("O", "Open directory on focused side"),
        key("d", "Toggle only different"),
        key("z", "Fold/unfold unchanged lines"),
        key("n", "New tab"),
        key("w", "Close tab"),
        key("] / [", "Next / previous tab"),
        key("r", "Reload"),
        key("s", "Settings"),
        key("?", "Toggle help"),
        key("q", "Quit"),
    ];
    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

fn render_settings(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Settings ")
        .border_style(Style::new().fg(palette.accent));
    let settings = &app.settings;

    let mut text = vec![
        Line::from(Span::styled("Theme (t)", palette.header())),
    ];
    for name in THEME_NAMES {
        let marker = if name == settings.theme_name() { "* " } else { "  " };
        text.push(Line::from(format!("{marker}{name}")));
    }
    text.push(Line::from(""));
    text.push(Line::from(Span::styled("Font family (f)", palette.header())));
    text.push(Line::from(format!("  {}", font_label(settings.font()))));
    text.push(Line::from(""));
    text.push(Line::from(Span::styled("Font size (+/-)", palette.header())));
    text.push(Line::from(format!(
        "  {} (1-{MAX_FONT_SIZE})",
        settings.font_size()
    )));
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        "Changes are saved immediately.",
        Style::new().fg(palette.muted),
    )));

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

fn render_status_bar(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let style = Style::new().bg(palette.status_bg).fg(palette.selected_fg);

    if let Some(prompt) = &app.prompt {
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ({}): ", prompt.kind.label(), side_label(prompt.side)),
                style.add_modifier(Modifier::BOLD),
            ),
            Span::raw(prompt.input.clone()),
            Span::styled("_", Style::new().add_modifier(Modifier::SLOW_BLINK)),
        ]);
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut parts = vec![format!(
        "tab {}/{}",
        app.session.active_index() + 1,
        app.session.len()
    )];
    if let Some(summary) = app.summary() {
        parts.push(format!(
            "{} same, {} different, {} left-only, {} right-only",
            summary.same, summary.different, summary.left_only, summary.right_only
        ));
    }
    if app.compare_mode() {
        let (inserted, deleted) = crate::diff::change_counts(&app.diff_lines);
        parts.push(format!("+{inserted} -{deleted}"));
    }
    parts.push(format!(
        "only different: {}",
        if app.only_different { "on" } else { "off" }
    ));
    if let Some(message) = &app.status_message {
        parts.push(message.clone());
    }
    parts.push("? help".to_string());

    f.render_widget(Paragraph::new(format!(" {}", parts.join(" | "))).style(style), area);
}

fn side_label(side: PanelSide) -> &'static str {
    match side {
        PanelSide::Left => "Left",
        PanelSide::Right => "Right",
    }
}

fn expand_tabs(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
}
