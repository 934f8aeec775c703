//! File-system backed implementations of the `carrot-core` host seams.

pub mod fs_host;
pub mod store;

pub use fs_host::FsHost;
pub use store::JsonFileStore;
