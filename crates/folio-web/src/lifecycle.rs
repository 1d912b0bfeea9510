#![forbid(unsafe_code)]

//! Mount-step bookkeeping shared by the browser host.

/// Run a fallible mount step against `state`, undoing everything on failure.
///
/// `rollback` runs exactly once if `attach` fails, after `attach` has
/// released any borrows it held, so partially attached observers, timers, and
/// listeners are torn down before the error reaches the caller.
pub fn rollback_on_err<S, T, E>(
    state: &mut S,
    attach: impl FnOnce(&mut S) -> Result<T, E>,
    rollback: impl FnOnce(&mut S),
) -> Result<T, E> {
    match attach(state) {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::warn!("mount step failed, tearing down");
            rollback(state);
            Err(err)
        }
    }
}
