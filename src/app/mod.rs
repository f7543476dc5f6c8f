mod events;
mod init;
mod render;
mod state;
mod step;
mod watchers;

pub use events::EditEvent;
pub use state::{App, DebugStats};
