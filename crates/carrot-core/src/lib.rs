pub mod compare;
pub mod coordinator;
pub mod host;
pub mod language;
pub mod model;
pub mod path;
pub mod session;
pub mod settings;
pub mod tree;

pub use compare::{compare, comparison_map, ComparisonMap, ComparisonSummary};
pub use coordinator::{open_entry_from_tree, open_from_tree};
pub use host::{load_editor_file, load_listing, DialogOutcome, FileReader, HostBridge, HostError};
pub use model::{
    ComparisonRecord, ComparisonStatus, DiffViewState, DirectoryEntry, DirectoryListing,
    EditorFile, PanelSide, UNTITLED_TAB_NAME,
};
pub use session::{EditorTab, PanelState, Panels, Session, TabId};
pub use settings::{MemoryStore, PreferenceStore, Settings, SettingsError};
pub use tree::{Highlight, TreeNode, TreeView};
