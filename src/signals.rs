use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal;

// Set from the SIGWINCH handler, consumed by the edit loop between reads.
static GOT_RESIZE: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigwinch(_sig: libc::c_int) {
    GOT_RESIZE.store(true, Ordering::Relaxed);
}

/// Install the SIGWINCH handler. Registered without SA_RESTART so that a
/// pending `read(2)` returns EINTR and the edit loop can pick up the new
/// window size right away.
pub fn install_window_change_handler() -> io::Result<()> {
    let handler = signal::SigHandler::Handler(handle_sigwinch);
    let sa = signal::SigAction::new(handler, signal::SaFlags::empty(), signal::SigSet::empty());
    unsafe {
        match signal::sigaction(signal::Signal::SIGWINCH, &sa) {
            Ok(_) => Ok(()),
            Err(e) => Err(io::Error::from_raw_os_error(e as i32)),
        }
    }
}

pub fn take_resize() -> bool {
    GOT_RESIZE.swap(false, Ordering::Relaxed)
}

pub fn resize_pending() -> bool {
    GOT_RESIZE.load(Ordering::Relaxed)
}

pub fn clear_resize() {
    GOT_RESIZE.store(false, Ordering::Relaxed);
}

/// Stop the whole process, as Ctrl-Z does in a canonical-mode shell.
pub fn stop_self() {
    match signal::raise(signal::Signal::SIGSTOP) {
        Ok(_) => {}
        Err(e) => {
            log!("raise(SIGSTOP) error: {:?}", e);
        }
    }
}
