//! Early-stop hooks for [`crate::lp::engine::SimplexEngine::solve`].
//!
//! - [`InterruptTerminator`]: responds to Ctrl-C (SIGINT) or a programmatic
//!   interrupt flag.
//! - [`TimeOutTerminator`]: fires once a wall-clock budget elapses, driving
//!   the §4.7 `Timeout` status independently of the iteration cap.
//! - [`MultipleTerminators`]: combines several terminators, firing on the
//!   first one that does.
//!
//! # Note
//! [`InterruptTerminator`] installs a global signal handler and can only be
//! constructed once per process; a second construction panics.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::Status;

/// Checked once per simplex iteration via [`crate::SolverHooks`]; `terminate`
/// returning `Some` stops the solve with that status before the pivot.
pub trait Terminator {
    fn initialize(&mut self) {}

    fn terminate(&mut self) -> Option<Status>;
}

/// Terminator that responds to Ctrl-C (SIGINT) or programmatic interrupts.
///
/// # Note
/// Only one instance can be constructed per process, since it installs a
/// global signal handler. Creating more than one panics.
pub struct InterruptTerminator {
    interrupted: Arc<AtomicBool>,
}

impl InterruptTerminator {
    pub fn new() -> Self {
        let interrupted = Arc::new(AtomicBool::new(false));
        ctrlc::set_handler({
            let interrupted_clone = interrupted.clone();
            move || {
                interrupted_clone.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        })
        .expect("Error setting Ctrl-C handler");
        Self { interrupted }
    }

    pub fn interrupt(&mut self) {
        self.interrupted.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Terminator for InterruptTerminator {
    fn terminate(&mut self) -> Option<Status> {
        if self.interrupted.load(std::sync::atomic::Ordering::SeqCst) {
            Some(Status::Interrupted)
        } else {
            None
        }
    }
}

/// Terminator that fires once `max_time_secs` have elapsed since
/// `initialize` was called (or since construction, if never initialized).
pub struct TimeOutTerminator {
    max_time_secs: u64,
    start_time: std::time::Instant,
}

impl TimeOutTerminator {
    pub fn new(max_time_secs: u64) -> Self {
        Self {
            max_time_secs,
            start_time: std::time::Instant::now(),
        }
    }
}

impl Terminator for TimeOutTerminator {
    fn initialize(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    fn terminate(&mut self) -> Option<Status> {
        if self.start_time.elapsed().as_secs() >= self.max_time_secs {
            Some(Status::Timeout)
        } else {
            None
        }
    }
}

/// Terminator that combines several terminators, firing on the first one
/// that does. An empty list never fires, which is what
/// [`crate::SolverHooks::default`] relies on to make hooks a true no-op.
pub struct MultipleTerminators {
    terminators: Vec<Box<dyn Terminator>>,
}

impl MultipleTerminators {
    pub fn new(terminators: Vec<Box<dyn Terminator>>) -> Self {
        Self { terminators }
    }
}

impl Terminator for MultipleTerminators {
    fn initialize(&mut self) {
        for terminator in &mut self.terminators {
            terminator.initialize();
        }
    }

    fn terminate(&mut self) -> Option<Status> {
        for terminator in &mut self.terminators {
            if let Some(status) = terminator.as_mut().terminate() {
                return Some(status);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    mod platform {
        pub fn send_sigint() {
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid;

            let pid = std::process::id() as i32;
            signal::kill(Pid::from_raw(pid), Signal::SIGINT).expect("Failed to send SIGINT");
        }
    }

    #[cfg(windows)]
    mod platform {
        pub fn send_sigint() {
            use windows_sys::Win32::System::Console::{CTRL_C_EVENT, GenerateConsoleCtrlEvent};

            unsafe {
                GenerateConsoleCtrlEvent(CTRL_C_EVENT, 0);
            }
        }
    }

    #[test]
    fn time_out_terminator_fires_after_the_budget_elapses() {
        let mut terminator = TimeOutTerminator::new(0);
        terminator.initialize();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(terminator.terminate(), Some(Status::Timeout));
    }

    #[test]
    fn multiple_terminators_fires_on_the_first_hit() {
        let mut combined = MultipleTerminators::new(vec![
            Box::new(TimeOutTerminator::new(60)),
            Box::new(TimeOutTerminator::new(0)),
        ]);
        combined.initialize();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(combined.terminate(), Some(Status::Timeout));
    }

    #[test]
    fn empty_multiple_terminators_never_fires() {
        let mut combined = MultipleTerminators::new(Vec::new());
        combined.initialize();
        assert_eq!(combined.terminate(), None);
    }

    #[test]
    #[ignore = "requires sending a real SIGINT to this process"]
    fn interrupt_terminator_responds_to_ctrlc() {
        let mut terminator = InterruptTerminator::new();

        std::thread::spawn(|| {
            std::thread::sleep(std::time::Duration::from_secs(2));
            platform::send_sigint();
        });

        loop {
            if let Some(status) = terminator.terminate() {
                assert_eq!(status, Status::Interrupted);
                break;
            }
        }
    }
}
