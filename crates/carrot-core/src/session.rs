use crate::model::{
    DiffViewState, DirectoryListing, EditorFile, PanelSide, UNTITLED_TAB_NAME,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(Uuid);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// One side of a tab: an open file, an open directory, or nothing. Selecting
/// one clears the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelState {
    pub file: Option<EditorFile>,
    pub directory: Option<DirectoryListing>,
}

impl PanelState {
    pub fn with_file(file: EditorFile) -> Self {
        Self {
            file: Some(file),
            directory: None,
        }
    }

    pub fn select_file(&mut self, file: EditorFile) {
        *self = Self::with_file(file);
    }

    pub fn select_directory(&mut self, directory: DirectoryListing) {
        *self = Self {
            file: None,
            directory: Some(directory),
        };
    }

    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.directory.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panels {
    pub left: PanelState,
    pub right: PanelState,
}

impl Panels {
    pub fn get(&self, side: PanelSide) -> &PanelState {
        match side {
            PanelSide::Left => &self.left,
            PanelSide::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: PanelSide) -> &mut PanelState {
        match side {
            PanelSide::Left => &mut self.left,
            PanelSide::Right => &mut self.right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorTab {
    pub id: TabId,
    pub title: String,
    pub panels: Panels,
    pub diff_view_state: Option<DiffViewState>,
}

impl EditorTab {
    pub fn empty() -> Self {
        Self {
            id: TabId::new(),
            title: UNTITLED_TAB_NAME.to_string(),
            panels: Panels::default(),
            diff_view_state: None,
        }
    }

    /// Left file name, else right file name, else the placeholder.
    /// Directories never name a tab.
    pub fn derive_title(&self) -> String {
        self.panels
            .left
            .file
            .as_ref()
            .or(self.panels.right.file.as_ref())
            .map(|file| file.name.clone())
            .unwrap_or_else(|| UNTITLED_TAB_NAME.to_string())
    }

    /// Both panels hold files, so the diff widget replaces the panels.
    pub fn compare_mode(&self) -> bool {
        self.panels.left.file.is_some() && self.panels.right.file.is_some()
    }

    pub fn directory(&self, side: PanelSide) -> Option<&DirectoryListing> {
        self.panels.get(side).directory.as_ref()
    }
}

/// Ordered tabs plus the active pointer. Never empty.
#[derive(Debug, Clone)]
pub struct Session {
    tabs: Vec<EditorTab>,
    active_tab_id: TabId,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let tab = EditorTab::empty();
        Self {
            active_tab_id: tab.id,
            tabs: vec![tab],
        }
    }

    pub fn tabs(&self) -> &[EditorTab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_tab_id(&self) -> TabId {
        self.active_tab_id
    }

    /// Position of the active tab; the first tab when the active id is stale.
    pub fn active_index(&self) -> usize {
        self.tabs
            .iter()
            .position(|tab| tab.id == self.active_tab_id)
            .unwrap_or(0)
    }

    pub fn active_tab(&self) -> &EditorTab {
        &self.tabs[self.active_index()]
    }

    pub fn tab(&self, id: TabId) -> Option<&EditorTab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn new_tab(&mut self) -> TabId {
        self.open_tab(EditorTab::empty())
    }

    /// Append a prepared tab and activate it. Its title is kept as given.
    pub fn open_tab(&mut self, tab: EditorTab) -> TabId {
        let id = tab.id;
        self.tabs.push(tab);
        self.active_tab_id = id;
        id
    }

    pub fn close_tab(&mut self, id: TabId) {
        let Some(closed_index) = self.tabs.iter().position(|tab| tab.id == id) else {
            return;
        };

        if self.tabs.len() == 1 {
            let replacement = EditorTab::empty();
            self.active_tab_id = replacement.id;
            self.tabs = vec![replacement];
            return;
        }

        self.tabs.remove(closed_index);
        if id == self.active_tab_id {
            let fallback = closed_index.saturating_sub(1);
            self.active_tab_id = self.tabs[fallback].id;
        }
    }

    /// Unknown ids are not rejected; [`Session::active_tab`] then falls back
    /// to the first tab.
    pub fn select_tab(&mut self, id: TabId) {
        self.active_tab_id = id;
    }

    pub fn select_next_tab(&mut self) {
        let next = (self.active_index() + 1) % self.tabs.len();
        self.active_tab_id = self.tabs[next].id;
    }

    pub fn select_previous_tab(&mut self) {
        let len = self.tabs.len();
        let previous = (self.active_index() + len - 1) % len;
        self.active_tab_id = self.tabs[previous].id;
    }

    /// Apply `updater` to the active tab, then re-derive its title. The saved
    /// diff view state is dropped when either panel ends up with a different
    /// file.
    pub fn update_active_tab(&mut self, updater: impl FnOnce(&mut EditorTab)) {
        let index = self.active_index();
        let tab = &mut self.tabs[index];
        let before = (tab.panels.left.file.clone(), tab.panels.right.file.clone());
        updater(tab);

        if before.0 != tab.panels.left.file || before.1 != tab.panels.right.file {
            tab.diff_view_state = None;
        }
        tab.title = tab.derive_title();
    }

    pub fn select_file(&mut self, side: PanelSide, file: EditorFile) {
        self.update_active_tab(|tab| tab.panels.get_mut(side).select_file(file));
    }

    pub fn select_directory(&mut self, side: PanelSide, directory: DirectoryListing) {
        self.update_active_tab(|tab| tab.panels.get_mut(side).select_directory(directory));
    }

    /// Capture the diff widget's view state into the active tab, typically
    /// right before another tab is activated.
    pub fn store_view_state(&mut self, state: DiffViewState) {
        let index = self.active_index();
        self.tabs[index].diff_view_state = Some(state);
    }

    pub fn active_view_state(&self) -> Option<&DiffViewState> {
        self.active_tab().diff_view_state.as_ref()
    }
}
