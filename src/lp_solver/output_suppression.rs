//! Shared stdout/stderr suppression for solver backends.
//!
//! CBC writes its progress log straight to stdout, which is also where the
//! allocation reports go. Backends take a [`GagHandle`] for the duration of
//! a solve so the two never interleave.
//!
//! The `gag` crate allows a single redirection per stream per process, so
//! the handles share one `Gag` through a weak-reference singleton: while
//! any handle is alive the stream stays gagged, and concurrent solves (the
//! sweep path solves on rayon workers) reuse the same instance instead of
//! failing to create a second one.

use gag::Gag;
use std::sync::{Arc, Mutex, Weak};

/// Shared handle on a gagged stream. The stream stays suppressed until the
/// last handle is dropped.
pub struct GagHandle {
    _gag: Arc<Gag>,
}

impl GagHandle {
    /// Suppress stdout for the lifetime of the handle.
    pub fn stdout() -> Result<Self, std::io::Error> {
        STDOUT_GAG.acquire()
    }

    /// Suppress stderr for the lifetime of the handle.
    pub fn stderr() -> Result<Self, std::io::Error> {
        STDERR_GAG.acquire()
    }
}

/// Hands out `Arc<Gag>` clones, creating the underlying gag on first use
/// and whenever the previous one has fully dropped.
struct SharedGag {
    current: Mutex<Weak<Gag>>,
    create: fn() -> Result<Gag, std::io::Error>,
}

impl SharedGag {
    const fn new(create: fn() -> Result<Gag, std::io::Error>) -> Self {
        Self {
            current: Mutex::new(Weak::new()),
            create,
        }
    }

    fn acquire(&self) -> Result<GagHandle, std::io::Error> {
        let mut current = self.current.lock().unwrap();

        if let Some(gag) = current.upgrade() {
            return Ok(GagHandle { _gag: gag });
        }

        let gag = match (self.create)() {
            Ok(gag) => gag,
            // Lost a race against a thread outside the mutex (gag reports
            // AlreadyExists); retry the upgrade before giving up.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if let Some(gag) = current.upgrade() {
                    return Ok(GagHandle { _gag: gag });
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let gag = Arc::new(gag);
        *current = Arc::downgrade(&gag);

        Ok(GagHandle { _gag: gag })
    }
}

static STDOUT_GAG: SharedGag = SharedGag::new(Gag::stdout);
static STDERR_GAG: SharedGag = SharedGag::new(Gag::stderr);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn handles_share_one_gag() {
        let handle1 = match GagHandle::stdout() {
            Ok(handle) => handle,
            // Another test in the process already consumed the stdout gag
            Err(_) => return,
        };
        let handle2 = GagHandle::stdout().expect("existing gag should be shared");

        assert_eq!(Arc::as_ptr(&handle1._gag), Arc::as_ptr(&handle2._gag));
    }

    #[test]
    fn concurrent_acquisition_does_not_panic() {
        const NUM_THREADS: usize = 4;
        let barrier = Arc::new(Barrier::new(NUM_THREADS));

        let threads: Vec<_> = (0..NUM_THREADS)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let _ = GagHandle::stdout();
                })
            })
            .collect();

        for t in threads {
            t.join().expect("thread should not panic");
        }
    }
}
