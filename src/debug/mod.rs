pub mod launch;
pub mod port;

pub use launch::{Configuration, LaunchFile};
pub use port::find_debug_port;
