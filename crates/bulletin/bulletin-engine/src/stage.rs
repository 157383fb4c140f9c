//! Stage thread plumbing.
//!
//! A stage that dies leaves its neighbours blocked on queues that will never
//! move again, and a scoped join would then wait forever. Failures here are
//! therefore fatal: print which operation failed and abort the process.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, Scope, ScopedJoinHandle};

pub(crate) fn spawn<'scope, 'env, T, F>(
    scope: &'scope Scope<'scope, 'env>,
    name: String,
    f: F,
) -> ScopedJoinHandle<'scope, T>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    let stage = name.clone();
    let spawning = format!("spawning {name}");
    thread::Builder::new()
        .name(name)
        .spawn_scoped(scope, move || match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => value,
            Err(payload) => fatal(&format!("stage {stage}"), &panic_message(payload.as_ref())),
        })
        .unwrap_or_else(|e| fatal(&spawning, &e.to_string()))
}

pub(crate) fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    let name = handle.thread().name().unwrap_or("stage").to_string();
    handle.join().unwrap_or_else(|payload| {
        fatal(&format!("joining {name}"), &panic_message(payload.as_ref()))
    })
}

fn fatal(operation: &str, reason: &str) -> ! {
    eprintln!("bulletin: fatal: {operation} failed: {reason}");
    std::process::abort()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
