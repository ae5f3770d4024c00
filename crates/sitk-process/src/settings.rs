//! Process-wide defaults shared by every process object.
//!
//! New process objects copy the default debug flag and thread count when they
//! are constructed; changing a default afterwards does not affect existing
//! objects.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

static GLOBAL_DEFAULT_DEBUG: AtomicBool = AtomicBool::new(false);
static GLOBAL_WARNING_DISPLAY: AtomicBool = AtomicBool::new(true);

// zero means "not set", resolved lazily to the available parallelism
static GLOBAL_DEFAULT_NUMBER_OF_THREADS: AtomicU32 = AtomicU32::new(0);

/// Returns the debug flag new process objects start with.
pub fn global_default_debug() -> bool {
    GLOBAL_DEFAULT_DEBUG.load(Ordering::Relaxed)
}

/// Sets the debug flag new process objects start with.
pub fn set_global_default_debug(flag: bool) {
    GLOBAL_DEFAULT_DEBUG.store(flag, Ordering::Relaxed);
}

/// Shorthand for `set_global_default_debug(true)`.
pub fn global_default_debug_on() {
    set_global_default_debug(true);
}

/// Shorthand for `set_global_default_debug(false)`.
pub fn global_default_debug_off() {
    set_global_default_debug(false);
}

/// Returns whether warnings about unstable state or parameters are reported.
///
/// Enabled by default.
pub fn global_warning_display() -> bool {
    GLOBAL_WARNING_DISPLAY.load(Ordering::Relaxed)
}

/// Enables or disables warning reporting for all process objects.
pub fn set_global_warning_display(flag: bool) {
    GLOBAL_WARNING_DISPLAY.store(flag, Ordering::Relaxed);
}

/// Shorthand for `set_global_warning_display(true)`.
pub fn global_warning_display_on() {
    set_global_warning_display(true);
}

/// Shorthand for `set_global_warning_display(false)`.
pub fn global_warning_display_off() {
    set_global_warning_display(false);
}

/// Returns the number of threads new process objects are initialized with.
///
/// Until set explicitly this is the available parallelism of the host.
pub fn global_default_number_of_threads() -> u32 {
    match GLOBAL_DEFAULT_NUMBER_OF_THREADS.load(Ordering::Relaxed) {
        0 => std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1),
        n => n,
    }
}

/// Sets the number of threads new process objects are initialized with.
///
/// Values below one are clamped to one.
pub fn set_global_default_number_of_threads(n: u32) {
    GLOBAL_DEFAULT_NUMBER_OF_THREADS.store(n.max(1), Ordering::Relaxed);
}
