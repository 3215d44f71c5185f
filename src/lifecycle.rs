use std::backtrace::Backtrace;
use std::ffi::OsString;
use std::ops::{Deref, DerefMut};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use anyhow::Result;

use crate::notifier::{FatalFault, FatalNotifier, PanicOrigin};
use crate::runtime::DesktopRuntime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Built,
    Running,
    Exited,
    Faulted,
    Disposed,
}

/// Owns the runtime for the whole session and releases its instance on drop.
struct Session<R: DesktopRuntime> {
    runtime: R,
    state: LifecycleState,
}

impl<R: DesktopRuntime> Session<R> {
    fn new(runtime: R) -> Self {
        Self {
            runtime,
            state: LifecycleState::Built,
        }
    }

    fn transition(&mut self, next: LifecycleState) {
        log::debug!("lifecycle: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl<R: DesktopRuntime> Deref for Session<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.runtime
    }
}

impl<R: DesktopRuntime> DerefMut for Session<R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.runtime
    }
}

impl<R: DesktopRuntime> Drop for Session<R> {
    fn drop(&mut self) {
        if let Some(instance) = self.runtime.instance() {
            // A failing release must not replace the fault that is already unwinding.
            match panic::catch_unwind(AssertUnwindSafe(|| instance.dispose())) {
                Ok(Ok(())) => log::debug!("runtime instance disposed"),
                Ok(Err(error)) => log::error!("failed to dispose runtime instance: {error:#}"),
                Err(_) => log::error!("runtime instance panicked while disposing"),
            }
        }
        self.transition(LifecycleState::Disposed);
    }
}

/// Runs `runtime` with a classic desktop lifetime and returns its exit code.
///
/// Errors and panics escaping the run call are reported through `notifier` (when the
/// platform has one) and then re-raised unchanged: errors are returned, panics resume
/// unwinding with their original payload. The runtime's instance is released exactly
/// once on every path.
pub fn run<R: DesktopRuntime>(
    runtime: R,
    args: Vec<OsString>,
    notifier: Option<&dyn FatalNotifier>,
) -> Result<i32> {
    let mut session = Session::new(runtime);
    session.transition(LifecycleState::Running);

    let (outcome, origin) = catch_unwind_with_origin(|| {
        session.start_with_classic_desktop_lifetime(args)
    });

    match outcome {
        Ok(Ok(code)) => {
            session.transition(LifecycleState::Exited);
            log::info!("desktop lifetime ended with exit code {code}");
            Ok(code)
        }
        Ok(Err(error)) => {
            session.transition(LifecycleState::Faulted);
            report(&FatalFault::from_error(&error), notifier);
            Err(error)
        }
        Err(payload) => {
            session.transition(LifecycleState::Faulted);
            report(
                &FatalFault::from_panic(payload.as_ref(), origin.as_ref()),
                notifier,
            );
            drop(session);
            panic::resume_unwind(payload)
        }
    }
}

// Panic hooks are process-wide; one capture at a time.
static HOOK_SWAP: Mutex<()> = Mutex::new(());

/// `catch_unwind` that also records where the panic was raised and the stack at that
/// point, which are gone once the payload is caught. The previous hook still runs and
/// is reinstated afterwards.
fn catch_unwind_with_origin<T>(
    body: impl FnOnce() -> T,
) -> (thread::Result<T>, Option<PanicOrigin>) {
    let _serial = HOOK_SWAP.lock().unwrap_or_else(PoisonError::into_inner);

    let previous = Arc::new(panic::take_hook());
    let origin = Arc::new(Mutex::new(None));
    let run_thread = thread::current().id();

    let forward = Arc::clone(&previous);
    let recorder = Arc::clone(&origin);
    panic::set_hook(Box::new(move |info| {
        if thread::current().id() == run_thread {
            let location = info
                .location()
                .map_or_else(|| "unknown location".to_string(), ToString::to_string);
            *recorder.lock().unwrap_or_else(PoisonError::into_inner) = Some(PanicOrigin {
                location,
                backtrace: Backtrace::force_capture().to_string(),
            });
        }
        forward(info);
    }));

    let outcome = panic::catch_unwind(AssertUnwindSafe(body));

    drop(panic::take_hook());
    match Arc::try_unwrap(previous) {
        Ok(hook) => panic::set_hook(hook),
        Err(shared) => panic::set_hook(Box::new(move |info| shared(info))),
    }

    let origin = origin.lock().unwrap_or_else(PoisonError::into_inner).take();
    (outcome, origin)
}

fn report(fault: &FatalFault, notifier: Option<&dyn FatalNotifier>) {
    log::error!("{:?} fault in desktop runtime: {}", fault.severity, fault.detail);
    let Some(notifier) = notifier else {
        return;
    };

    match panic::catch_unwind(AssertUnwindSafe(|| notifier.notify(fault))) {
        Ok(Ok(())) => {}
        Ok(Err(error)) => log::warn!("could not show the fatal error dialog: {error:#}"),
        Err(_) => log::warn!("fatal error dialog panicked"),
    }
}
