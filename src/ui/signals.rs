/// Termination signals from outside the terminal (kill, closed window).
///
/// Raw mode turns Ctrl+C into a key event, so only signals sent by other
/// processes land here. They set a flag that the game loop polls, which
/// sends them down the same restore path as a Ctrl+C key. A second signal
/// while the flag is already set exits at once with status 130.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};

#[cfg(unix)]
const TERM_SIGNALS: [i32; 3] = [SIGINT, SIGTERM, SIGHUP];

pub struct SignalFlag {
    raised: Arc<AtomicBool>,
}

impl SignalFlag {
    /// Register the handlers. On non-unix targets the flag never rises.
    pub fn install() -> io::Result<Self> {
        let raised = Arc::new(AtomicBool::new(false));

        #[cfg(unix)]
        for sig in TERM_SIGNALS {
            // order matters: the shutdown check must see the flag before this signal sets it
            signal_hook::flag::register_conditional_shutdown(sig, 130, Arc::clone(&raised))?;
            signal_hook::flag::register(sig, Arc::clone(&raised))?;
        }

        Ok(SignalFlag { raised })
    }

    pub fn raised(&self) -> bool {
        self.raised.load(Ordering::Relaxed)
    }
}
