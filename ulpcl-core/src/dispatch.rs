//! Dispatchers (`spec.md` §4.7, §5).
//!
//! A dispatcher owns the set of packs being compiled this invocation. The
//! sequential variant runs the pipeline inline; the parallel variant
//! submits one task per pack to a fixed-size `rayon` thread pool and
//! tracks completion with atomic counters and a condition variable
//! standing in for the source design's "waitable event".

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Succeeded/failed pack counts, read after `wait_for_completion` returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchCounters {
    pub succeeded: u64,
    pub failed: u64,
}

/// The capability set both dispatcher variants implement: submit a pack,
/// block until every submitted pack has finished, read the tally.
pub trait PackDispatcher {
    fn dispatch(&self, input: PathBuf);
    fn wait_for_completion(&self);
    fn counters(&self) -> DispatchCounters;
}

type CompileFn = dyn Fn(&Path) -> bool + Send + Sync;

/// Runs each pack inline on the calling thread. `wait_for_completion` is
/// a no-op: there is nothing left running by the time `dispatch` returns.
pub struct SequentialDispatcher {
    compile: Box<CompileFn>,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl SequentialDispatcher {
    pub fn new(compile: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        Self {
            compile: Box::new(compile),
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }
}

impl PackDispatcher for SequentialDispatcher {
    fn dispatch(&self, input: PathBuf) {
        if (self.compile)(&input) {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn wait_for_completion(&self) {}

    fn counters(&self) -> DispatchCounters {
        DispatchCounters {
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

/// Submits one task per `dispatch` call to a fixed-size `rayon::ThreadPool`.
/// Each task compiles its pack end-to-end on a single worker thread, then
/// atomically records success/failure and signals the completion event.
pub struct ParallelDispatcher {
    pool: rayon::ThreadPool,
    compile: Arc<CompileFn>,
    submitted: AtomicU64,
    total: Arc<AtomicU64>,
    succeeded: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
    event: Arc<(Mutex<()>, Condvar)>,
}

impl ParallelDispatcher {
    /// `thread_count` must already be resolved to one of {1, 2, 4, 8} by
    /// [`resolve_thread_count`]; this constructor does not revalidate it.
    pub fn new(thread_count: usize, compile: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .expect("fixed-size rayon pool");
        Self {
            pool,
            compile: Arc::new(compile),
            submitted: AtomicU64::new(0),
            total: Arc::new(AtomicU64::new(0)),
            succeeded: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicU64::new(0)),
            event: Arc::new((Mutex::new(()), Condvar::new())),
        }
    }
}

impl PackDispatcher for ParallelDispatcher {
    fn dispatch(&self, input: PathBuf) {
        self.submitted.fetch_add(1, Ordering::SeqCst);

        let compile = self.compile.clone();
        let total = self.total.clone();
        let succeeded = self.succeeded.clone();
        let failed = self.failed.clone();
        let event = self.event.clone();

        self.pool.spawn(move || {
            if compile(&input) {
                succeeded.fetch_add(1, Ordering::SeqCst);
            } else {
                failed.fetch_add(1, Ordering::SeqCst);
            }
            total.fetch_add(1, Ordering::SeqCst);

            let (lock, cvar) = &*event;
            let _guard = lock.lock();
            cvar.notify_all();
        });
    }

    fn wait_for_completion(&self) {
        let (lock, cvar) = &*self.event;
        let mut guard = lock.lock();
        while self.total.load(Ordering::SeqCst) < self.submitted.load(Ordering::SeqCst) {
            cvar.wait(&mut guard);
        }
    }

    fn counters(&self) -> DispatchCounters {
        DispatchCounters {
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

/// The `--threads` CLI surface (`spec.md` §6): a fixed pool size, `auto`
/// selection based on input count, or `disable` for the sequential
/// dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadSetting {
    Disabled,
    Auto,
    Fixed(u8),
}

/// Resolves a [`ThreadSetting`] to a concrete pool size, or `None` when
/// the sequential dispatcher should be used instead (`spec.md` §4.7).
///
/// `auto` picks 1/2/4/8 from the input count (≤4, ≤8, ≤16, else), then
/// every path is clamped down to a power of two not exceeding
/// `hardware_concurrency` by repeated halving.
pub fn resolve_thread_count(
    setting: ThreadSetting,
    input_count: usize,
    hardware_concurrency: usize,
) -> Option<usize> {
    let requested = match setting {
        ThreadSetting::Disabled => return None,
        ThreadSetting::Fixed(n) => n as usize,
        ThreadSetting::Auto => {
            if input_count <= 4 {
                1
            } else if input_count <= 8 {
                2
            } else if input_count <= 16 {
                4
            } else {
                8
            }
        }
    };

    Some(clamp_to_power_of_two(requested, hardware_concurrency.max(1)))
}

fn clamp_to_power_of_two(mut n: usize, ceiling: usize) -> usize {
    while n > ceiling && n > 1 {
        n /= 2;
    }
    n.max(1)
}
