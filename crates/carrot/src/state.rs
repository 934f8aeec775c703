use crate::diff::{self, DiffLine, DiffRow};
use carrot_core::settings::font_label;
use carrot_core::{
    compare, comparison_map, load_editor_file, load_listing, open_entry_from_tree,
    ComparisonMap, ComparisonStatus, ComparisonSummary, DialogOutcome, DiffViewState,
    DirectoryEntry, Highlight, HostBridge, PanelSide, Session, Settings, TabId, TreeView,
};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{layout::Rect, widgets::ListState};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DEFAULT_PAGE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    OpenFile,
    OpenDirectory,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::OpenFile => "Open file",
            PromptKind::OpenDirectory => "Open directory",
        }
    }
}

/// Path prompt standing in for a native open dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub side: PanelSide,
    pub input: String,
}

/// One visible row of a directory panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub entry: DirectoryEntry,
    pub relative_path: String,
    pub depth: usize,
    pub status: Option<ComparisonStatus>,
    pub highlight: Highlight,
    pub expanded: bool,
}

/// UI-only state of one panel of one tab.
#[derive(Debug, Default)]
pub struct PanelView {
    pub expanded: HashSet<String>,
    pub list_state: ListState,
    pub file_scroll: u16,
}

pub struct App {
    host: Box<dyn HostBridge>,
    pub session: Session,
    pub settings: Settings,
    pub focused: PanelSide,
    pub only_different: bool,
    pub prompt: Option<Prompt>,
    pub show_help: bool,
    pub show_settings: bool,
    pub status_message: Option<String>,
    pub diff_lines: Vec<DiffLine>,
    pub diff_state: DiffViewState,
    pub diff_viewport: usize,
    diff_tab: Option<TabId>,
    panel_views: HashMap<(TabId, PanelSide), PanelView>,
    comparisons: ComparisonMap,
    summary: Option<ComparisonSummary>,
    rows: HashMap<PanelSide, Vec<PanelRow>>,
    pub left_area: Option<Rect>,
    pub right_area: Option<Rect>,
    should_quit: bool,
}

impl App {
    pub fn new(host: Box<dyn HostBridge>, settings: Settings) -> Self {
        Self {
            host,
            session: Session::new(),
            settings,
            focused: PanelSide::Left,
            only_different: false,
            prompt: None,
            show_help: false,
            show_settings: false,
            status_message: None,
            diff_lines: Vec::new(),
            diff_state: DiffViewState::default(),
            diff_viewport: DEFAULT_PAGE,
            diff_tab: None,
            panel_views: HashMap::new(),
            comparisons: ComparisonMap::new(),
            summary: None,
            rows: HashMap::new(),
            left_area: None,
            right_area: None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn compare_mode(&self) -> bool {
        self.session.active_tab().compare_mode()
    }

    // ----- opening -----

    /// Open `path` on `side` of the active tab, as a file or a directory.
    pub fn open_path(&mut self, kind: PromptKind, side: PanelSide, path: &Path) {
        self.stash_diff_state();
        let result = match kind {
            PromptKind::OpenFile => load_editor_file(self.host.as_ref(), path).map(|file| {
                let name = file.name.clone();
                self.session.select_file(side, file);
                name
            }),
            PromptKind::OpenDirectory => load_listing(self.host.as_ref(), path).map(|listing| {
                let root = listing.root_path.clone();
                self.session.select_directory(side, listing);
                root
            }),
        };

        match result {
            Ok(label) => {
                info!(side = %side, path = %path.display(), "opened");
                self.recalc_comparisons();
                self.reset_view(side);
                self.set_status(format!("Opened {label} on the {side}"));
            }
            Err(err) => {
                warn!("open_failed: {err}");
                self.set_status(err.to_string());
            }
        }
        self.refresh_diff();
    }

    fn apply_dialog(&mut self, kind: PromptKind, side: PanelSide, outcome: DialogOutcome) {
        match outcome {
            DialogOutcome::Cancelled => self.set_status(format!("{} cancelled", kind.label())),
            DialogOutcome::Selected(path) => self.open_path(kind, side, &path),
        }
    }

    /// Open the selected tree file in a new tab, paired with its
    /// counterpart from the other tree.
    pub fn open_selected_file(&mut self) {
        let side = self.focused;
        let Some(row) = self.selected_row(side) else {
            return;
        };
        if row.entry.is_dir {
            return;
        }
        let record = self.comparisons.get(&row.relative_path).cloned();

        self.stash_diff_state();
        match open_entry_from_tree(
            &mut self.session,
            self.host.as_ref(),
            &row.entry,
            record.as_ref(),
            side,
        ) {
            Ok(_) => {
                self.recalc_comparisons();
                let tab = self.session.active_tab();
                let paired = tab.compare_mode();
                let title = tab.title.clone();
                self.set_status(if paired {
                    format!("Comparing {title}")
                } else {
                    format!("Opened {title}")
                });
            }
            Err(err) => {
                warn!("open_from_tree_failed: {err}");
                self.set_status(err.to_string());
            }
        }
        self.refresh_diff();
    }

    /// Re-read everything open in the active tab. Unchanged content leaves
    /// the tab untouched; failures keep the previous content.
    pub fn reload_active_tab(&mut self) {
        let tab = self.session.active_tab().clone();
        self.stash_diff_state();
        let mut failures = 0;

        for side in [PanelSide::Left, PanelSide::Right] {
            let panel = tab.panels.get(side);
            if let Some(listing) = &panel.directory {
                match load_listing(self.host.as_ref(), Path::new(&listing.root_path)) {
                    Ok(fresh) if fresh != *listing => self.session.select_directory(side, fresh),
                    Ok(_) => {}
                    Err(err) => {
                        warn!("reload_failed: {err}");
                        failures += 1;
                    }
                }
            } else if let Some(file) = &panel.file {
                match load_editor_file(self.host.as_ref(), Path::new(&file.path)) {
                    Ok(fresh) if fresh != *file => self.session.select_file(side, fresh),
                    Ok(_) => {}
                    Err(err) => {
                        warn!("reload_failed: {err}");
                        failures += 1;
                    }
                }
            }
        }

        self.refresh_diff();
        self.recalc_comparisons();
        if failures > 0 {
            self.set_status(format!("Reload failed for {failures} item(s), see log"));
        } else {
            self.set_status("Reloaded".to_string());
        }
    }

    /// Directory roots open in the active tab, for the file watcher.
    pub fn watched_roots(&self) -> Vec<PathBuf> {
        let tab = self.session.active_tab();
        [PanelSide::Left, PanelSide::Right]
            .into_iter()
            .filter_map(|side| tab.directory(side))
            .map(|listing| PathBuf::from(&listing.root_path))
            .collect()
    }

    // ----- tabs -----

    pub fn new_tab(&mut self) {
        self.switch_tab(|session| {
            session.new_tab();
        });
    }

    pub fn close_active_tab(&mut self) {
        let id = self.session.active_tab_id();
        self.diff_tab = None;
        self.session.close_tab(id);
        self.panel_views
            .retain(|(tab_id, _), _| *tab_id != id);
        self.sync_diff();
        self.recalc_comparisons();
    }

    pub fn next_tab(&mut self) {
        self.switch_tab(Session::select_next_tab);
    }

    pub fn previous_tab(&mut self) {
        self.switch_tab(Session::select_previous_tab);
    }

    fn switch_tab(&mut self, change: impl FnOnce(&mut Session)) {
        self.stash_diff_state();
        change(&mut self.session);
        self.sync_diff();
        self.recalc_comparisons();
    }

    // ----- diff view -----

    /// Keep the live diff view state in the active tab so it survives a
    /// tab switch.
    fn stash_diff_state(&mut self) {
        if self.diff_tab == Some(self.session.active_tab_id()) {
            self.session.store_view_state(self.diff_state.clone());
        }
    }

    fn refresh_diff(&mut self) {
        self.diff_tab = None;
        self.sync_diff();
    }

    /// Rebuild the diff for the active tab when it is a compare tab that is
    /// not loaded yet, restoring its saved view state.
    pub fn sync_diff(&mut self) {
        let tab = self.session.active_tab();
        let (Some(left), Some(right)) = (&tab.panels.left.file, &tab.panels.right.file) else {
            self.diff_tab = None;
            self.diff_lines.clear();
            self.diff_state = DiffViewState::default();
            return;
        };
        if self.diff_tab == Some(tab.id) {
            return;
        }
        self.diff_lines = diff::diff_lines(&left.contents, &right.contents);
        self.diff_state = tab.diff_view_state.clone().unwrap_or_default();
        self.diff_tab = Some(tab.id);
        self.clamp_diff_cursor();
    }

    pub fn diff_rows(&self) -> Vec<DiffRow> {
        diff::display_rows(&self.diff_lines, &self.diff_state.folded)
    }

    pub fn set_diff_viewport(&mut self, height: usize) {
        self.diff_viewport = height.max(1);
        self.clamp_diff_cursor();
    }

    fn move_diff_cursor(&mut self, delta: isize) {
        let len = self.diff_rows().len();
        if len == 0 {
            return;
        }
        let current = self.diff_state.cursor_line as isize;
        self.diff_state.cursor_line = (current + delta).clamp(0, len as isize - 1) as usize;
        self.clamp_diff_cursor();
    }

    fn clamp_diff_cursor(&mut self) {
        let len = self.diff_rows().len();
        if len == 0 {
            self.diff_state.cursor_line = 0;
            self.diff_state.scroll_top = 0;
            return;
        }
        let state = &mut self.diff_state;
        state.cursor_line = state.cursor_line.min(len - 1);
        if state.cursor_line < state.scroll_top {
            state.scroll_top = state.cursor_line;
        }
        let viewport = self.diff_viewport.max(1);
        if state.cursor_line >= state.scroll_top + viewport {
            state.scroll_top = state.cursor_line + 1 - viewport;
        }
        state.scroll_top = state.scroll_top.min(len.saturating_sub(1));
    }

    /// Fold the unchanged block under the cursor, or unfold it if folded.
    fn toggle_fold(&mut self) {
        let rows = self.diff_rows();
        match rows.get(self.diff_state.cursor_line).copied() {
            Some(DiffRow::Folded { start, .. }) => {
                self.diff_state.folded.remove(&start);
            }
            Some(DiffRow::Line(index)) => match diff::equal_block_at(&self.diff_lines, index) {
                Some((start, _)) => {
                    self.diff_state.folded.insert(start);
                    if let Some(position) = self
                        .diff_rows()
                        .iter()
                        .position(|row| matches!(row, DiffRow::Folded { start: s, .. } if *s == start))
                    {
                        self.diff_state.cursor_line = position;
                    }
                }
                None => self.set_status("Only unchanged lines can be folded".to_string()),
            },
            None => {}
        }
        self.clamp_diff_cursor();
    }

    // ----- panels -----

    pub fn comparisons(&self) -> &ComparisonMap {
        &self.comparisons
    }

    pub fn summary(&self) -> Option<ComparisonSummary> {
        self.summary
    }

    pub fn panel_rows(&self, side: PanelSide) -> &[PanelRow] {
        self.rows.get(&side).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Recompute the comparison of the active tab's listings, then both
    /// panels' rows. Call after anything that changes which listings are
    /// shown.
    pub fn recalc_comparisons(&mut self) {
        let tab = self.session.active_tab();
        let (left, right) = (tab.directory(PanelSide::Left), tab.directory(PanelSide::Right));
        self.comparisons = comparison_map(compare(left, right));
        self.summary = if left.is_none() && right.is_none() {
            None
        } else {
            Some(ComparisonSummary::from_records(self.comparisons.values()))
        };
        for side in [PanelSide::Left, PanelSide::Right] {
            self.recalc_rows(side);
        }
    }

    /// Rebuild the visible rows of one panel from the cached comparison,
    /// the filter flag and the panel's expanded set.
    pub fn recalc_rows(&mut self, side: PanelSide) {
        let tab = self.session.active_tab();
        let rows = match tab.directory(side) {
            Some(listing) => {
                let no_expanded = HashSet::new();
                let expanded = self
                    .panel_views
                    .get(&(tab.id, side))
                    .map(|view| &view.expanded)
                    .unwrap_or(&no_expanded);
                TreeView::new(listing, &self.comparisons, side, self.only_different)
                    .visible_rows(expanded)
                    .into_iter()
                    .map(|node| PanelRow {
                        entry: node.entry.clone(),
                        relative_path: node.relative_path,
                        depth: node.depth,
                        status: node.status,
                        highlight: node.highlight,
                        expanded: node.expanded,
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        self.rows.insert(side, rows);
        self.clamp_selection(side);
    }

    pub fn view_mut(&mut self, side: PanelSide) -> &mut PanelView {
        let id = self.session.active_tab_id();
        self.panel_views.entry((id, side)).or_default()
    }

    pub fn selected_index(&self, side: PanelSide) -> Option<usize> {
        self.panel_views
            .get(&(self.session.active_tab_id(), side))
            .and_then(|view| view.list_state.selected())
    }

    pub fn selected_row(&self, side: PanelSide) -> Option<PanelRow> {
        self.panel_rows(side)
            .get(self.selected_index(side).unwrap_or(0))
            .cloned()
    }

    fn reset_view(&mut self, side: PanelSide) {
        *self.view_mut(side) = PanelView::default();
        self.recalc_rows(side);
    }

    /// Keep the selection inside the visible rows.
    pub fn clamp_selection(&mut self, side: PanelSide) {
        let len = self.panel_rows(side).len();
        let view = self.view_mut(side);
        if len == 0 {
            view.list_state.select(None);
            return;
        }
        let selected = view.list_state.selected().unwrap_or(0).min(len - 1);
        view.list_state.select(Some(selected));
    }

    fn move_selection(&mut self, delta: isize) {
        let side = self.focused;
        if self.session.active_tab().panels.get(side).file.is_some() {
            let view = self.view_mut(side);
            view.file_scroll = if delta < 0 {
                view.file_scroll.saturating_sub(delta.unsigned_abs() as u16)
            } else {
                view.file_scroll.saturating_add(delta as u16)
            };
            return;
        }

        let len = self.panel_rows(side).len() as isize;
        if len == 0 {
            return;
        }
        let view = self.view_mut(side);
        let current = view.list_state.selected().unwrap_or(0) as isize;
        let mut next = current + delta;
        if next < 0 {
            next = len - 1;
        }
        if next >= len {
            next = 0;
        }
        view.list_state.select(Some(next as usize));
    }

    fn toggle_expand(&mut self) {
        let side = self.focused;
        let Some(row) = self.selected_row(side) else {
            return;
        };
        if !row.entry.is_dir {
            return;
        }
        let view = self.view_mut(side);
        if !view.expanded.remove(&row.relative_path) {
            view.expanded.insert(row.relative_path);
        }
        self.recalc_rows(side);
    }

    fn activate_selected(&mut self) {
        match self.selected_row(self.focused) {
            Some(row) if row.entry.is_dir => self.toggle_expand(),
            Some(_) => self.open_selected_file(),
            None => {}
        }
    }

    fn toggle_only_different(&mut self) {
        self.only_different = !self.only_different;
        for side in [PanelSide::Left, PanelSide::Right] {
            self.recalc_rows(side);
        }
        let state = if self.only_different { "on" } else { "off" };
        self.set_status(format!("Only different: {state}"));
    }

    fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    // ----- input -----

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }
        if self.show_settings && self.handle_settings_key(key) {
            return;
        }

        let compare_mode = self.compare_mode();
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                self.show_help = false;
                self.show_settings = false;
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                self.show_settings = false;
            }
            KeyCode::Char('s') => {
                self.show_settings = !self.show_settings;
                self.show_help = false;
            }
            KeyCode::Tab => {
                self.focused = self.focused.opposite();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if compare_mode {
                    self.move_diff_cursor(1);
                } else {
                    self.move_selection(1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if compare_mode {
                    self.move_diff_cursor(-1);
                } else {
                    self.move_selection(-1);
                }
            }
            KeyCode::PageDown => {
                if compare_mode {
                    self.move_diff_cursor(self.diff_viewport as isize);
                } else {
                    self.move_selection(DEFAULT_PAGE as isize);
                }
            }
            KeyCode::PageUp => {
                if compare_mode {
                    self.move_diff_cursor(-(self.diff_viewport as isize));
                } else {
                    self.move_selection(-(DEFAULT_PAGE as isize));
                }
            }
            KeyCode::Char('z') if compare_mode => {
                self.toggle_fold();
            }
            KeyCode::Char(' ') => {
                self.toggle_expand();
            }
            KeyCode::Enter => {
                self.activate_selected();
            }
            KeyCode::Char('o') => {
                self.start_prompt(PromptKind::OpenFile);
            }
            KeyCode::Char('O') => {
                self.start_prompt(PromptKind::OpenDirectory);
            }
            KeyCode::Char('d') => {
                self.toggle_only_different();
            }
            KeyCode::Char('n') => {
                self.new_tab();
            }
            KeyCode::Char('w') => {
                self.close_active_tab();
            }
            KeyCode::Char(']') => {
                self.next_tab();
            }
            KeyCode::Char('[') => {
                self.previous_tab();
            }
            KeyCode::Char('r') => {
                self.reload_active_tab();
            }
            _ => {}
        }
    }

    fn start_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt {
            kind,
            side: self.focused,
            input: String::new(),
        });
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                let kind = prompt.kind;
                let side = prompt.side;
                self.prompt = None;
                self.apply_dialog(kind, side, DialogOutcome::Cancelled);
            }
            KeyCode::Enter => {
                let outcome = DialogOutcome::from_input(&prompt.input);
                let kind = prompt.kind;
                let side = prompt.side;
                self.prompt = None;
                self.apply_dialog(kind, side, outcome);
            }
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Char(c) => {
                prompt.input.push(c);
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> bool {
        let result = match key.code {
            KeyCode::Char('t') => self.settings.cycle_theme(),
            KeyCode::Char('f') => self.settings.cycle_font(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.settings.step_font_size(1),
            KeyCode::Char('-') => self.settings.step_font_size(-1),
            _ => return false,
        };
        match result {
            Ok(()) => self.set_status(format!(
                "Theme {} | Font {} | Size {}",
                self.settings.theme_name(),
                font_label(self.settings.font()),
                self.settings.font_size()
            )),
            Err(err) => self.set_status(err.to_string()),
        }
        true
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.handle_left_click(event.column, event.row);
            }
            MouseEventKind::ScrollUp => {
                if self.compare_mode() {
                    self.move_diff_cursor(-1);
                } else {
                    self.move_selection(-1);
                }
            }
            MouseEventKind::ScrollDown => {
                if self.compare_mode() {
                    self.move_diff_cursor(1);
                } else {
                    self.move_selection(1);
                }
            }
            _ => {}
        }
    }

    pub fn update_layout(&mut self, left: Option<Rect>, right: Option<Rect>) {
        self.left_area = left;
        self.right_area = right;
    }

    fn handle_left_click(&mut self, column: u16, row: u16) {
        for (side, area) in [
            (PanelSide::Left, self.left_area),
            (PanelSide::Right, self.right_area),
        ] {
            let Some(area) = area else {
                continue;
            };
            if !contains(area, column, row) {
                continue;
            }
            self.focused = side;
            let inner_top = area.y.saturating_add(1);
            let inner_bottom = area.y.saturating_add(area.height.saturating_sub(1));
            if row < inner_top || row >= inner_bottom {
                return;
            }
            let offset = self
                .panel_views
                .get(&(self.session.active_tab_id(), side))
                .map(|view| view.list_state.offset())
                .unwrap_or(0);
            let index = offset + (row - inner_top) as usize;
            if index < self.panel_rows(side).len() {
                if self.selected_index(side) == Some(index) {
                    self.activate_selected();
                } else {
                    self.view_mut(side).list_state.select(Some(index));
                }
            }
            return;
        }
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}
