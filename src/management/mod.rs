mod monitor;
mod session;

pub use monitor::PlaybackMonitor;
pub use monitor::Snapshot;
pub use monitor::reconcile;
pub use session::SessionManager;
