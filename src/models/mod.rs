pub mod watch_entry;
pub mod session;
pub mod status;

pub use watch_entry::WatchEntry;
pub use session::{MonitorSession, MonitorState};
pub use status::SymbolStatus;
