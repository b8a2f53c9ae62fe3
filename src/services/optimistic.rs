use std::future::Future;

/// Runs a command optimistically: `apply` patches local state right away and
/// returns a snapshot of what it replaced, `request` performs the remote
/// call, and `rollback` receives the snapshot back if the call fails.
///
/// The rollback also runs if the returned future is dropped before `request`
/// resolves, so a cancelled caller never leaves the patch behind. If `apply`
/// fails nothing was patched and neither the request nor the rollback run.
/// The remote error is returned untouched after the rollback has run.
pub async fn run<S, T, E, Fut, R>(
    apply: impl FnOnce() -> Result<S, E>,
    request: Fut,
    rollback: R,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    R: FnOnce(S),
{
    let snapshot = apply()?;
    let mut guard = RollbackGuard {
        armed: Some((snapshot, rollback)),
    };

    match request.await {
        Ok(value) => {
            guard.disarm();
            Ok(value)
        }
        Err(e) => {
            guard.fire();
            Err(e)
        }
    }
}

struct RollbackGuard<S, R: FnOnce(S)> {
    armed: Option<(S, R)>,
}

impl<S, R: FnOnce(S)> RollbackGuard<S, R> {
    fn disarm(&mut self) {
        self.armed = None;
    }

    fn fire(&mut self) {
        if let Some((snapshot, rollback)) = self.armed.take() {
            rollback(snapshot);
        }
    }
}

impl<S, R: FnOnce(S)> Drop for RollbackGuard<S, R> {
    fn drop(&mut self) {
        if self.armed.is_some() {
            tracing::warn!("optimistic request dropped before completion, rolling back");
            self.fire();
        }
    }
}
