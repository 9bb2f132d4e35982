//! User interface components
//!
//! Terminal output for the bpmsyncrs binary:
//! - A spinner whose prefix shows the current role and whose message shows the tempo
//! - Role changes printed above the spinner with a local timestamp
//!
//! The UI is built using the indicatif library for progress bars and spinners.

mod console;
mod progress;

pub use console::ConsoleObserver;
pub use progress::{create_bpm_spinner, style_bpm_spinner, MASTER_PREFIX, SLAVE_PREFIX};
