//! Ctrl+C while the inferior runs becomes `-exec-interrupt` on gdb's stdin.
//! gdb lives in its own process group, so the terminal's SIGINT only reaches
//! strongdb; outside a wait the signal is ignored.

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::ffi::c_int;
use std::fs::File;
use std::io::Write;
use std::mem::ManuallyDrop;
use std::os::fd::{FromRawFd, RawFd};
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

const INTERRUPT: &[u8] = b"-exec-interrupt\n";

/// gdb's stdin while a stop is awaited, -1 otherwise.
static ARMED_FD: AtomicI32 = AtomicI32::new(-1);
static SENT: AtomicUsize = AtomicUsize::new(0);

/// Replace the default SIGINT action. Safe to call more than once.
pub fn install() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_sigint),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    unsafe { sigaction(Signal::SIGINT, &action) }.map(|_| ())
}

extern "C" fn on_sigint(_: c_int) {
    let fd = ARMED_FD.load(Ordering::SeqCst);
    if fd < 0 {
        return;
    }
    // Only write(2) happens here; the File is never dropped, so fd stays open.
    let mut pipe = ManuallyDrop::new(unsafe { File::from_raw_fd(fd) });
    if pipe.write_all(INTERRUPT).is_ok() {
        SENT.fetch_add(1, Ordering::SeqCst);
    }
}

/// Interrupt forwarding for the duration of one wait.
#[derive(Debug)]
pub struct Armed {
    base: usize,
}

impl Armed {
    pub fn new(gdb_stdin: RawFd) -> Self {
        let base = SENT.load(Ordering::SeqCst);
        ARMED_FD.store(gdb_stdin, Ordering::SeqCst);
        Self { base }
    }

    /// Stop forwarding; returns how many interrupts went out meanwhile.
    pub fn disarm(&self) -> usize {
        ARMED_FD.store(-1, Ordering::SeqCst);
        self.sent()
    }

    pub fn sent(&self) -> usize {
        SENT.load(Ordering::SeqCst) - self.base
    }
}

impl Drop for Armed {
    fn drop(&mut self) {
        ARMED_FD.store(-1, Ordering::SeqCst);
    }
}
