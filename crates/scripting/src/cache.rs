//! Bytecode cache (C3): a content-addressed map from script source text to a
//! compiled artifact, single-flight across concurrent requests for the same
//! source, with an optional worker-pool path whose results are drained back
//! onto the main loop.
//!
//! Compilation itself is an external collaborator (§3.3): the cache never
//! inspects source text beyond using it as a key, and treats whatever the
//! [`Compiler`] produces as an opaque blob.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use parking_lot::Mutex;

/// The opaque output of compiling a script source, or the sentinel recorded
/// when compilation fails. A `Failed` artifact is cached just like a
/// successful one, so a repeated request for the same broken source doesn't
/// retry the compile — only editing the source (which changes the key)
/// does.
#[derive(Debug, Clone)]
pub enum Artifact {
    Compiled(Arc<[u8]>),
    Failed(Arc<str>),
}

impl Artifact {
    pub fn is_failed(&self) -> bool {
        matches!(self, Artifact::Failed(_))
    }
}

/// The compiler is an external collaborator: the cache only needs something
/// that turns source text into an [`Artifact`].
pub trait Compiler: Send + Sync {
    fn compile(&self, source: &str) -> Artifact;
}

/// A compiler that wraps the source text as its own artifact, byte-identical.
/// Exercises the cache and worker pool without depending on the scripting
/// language's real semantics, which are out of scope for this crate.
pub struct PassthroughCompiler;

impl Compiler for PassthroughCompiler {
    fn compile(&self, source: &str) -> Artifact {
        Artifact::Compiled(Arc::from(source.as_bytes()))
    }
}

type Completion = Box<dyn FnOnce(Artifact) + Send>;

enum Entry {
    Ready(Artifact),
    /// A compile is in flight (or queued); every `compile_script` call that
    /// arrives while pending is coalesced into this list instead of
    /// triggering another compile.
    Pending(Vec<Completion>),
}

struct CompletedJob {
    source: String,
    artifact: Artifact,
}

struct Job {
    source: String,
}

struct WorkerPool {
    sender: mpsc::Sender<Job>,
    _handles: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    fn new(size: usize, compiler: Arc<dyn Compiler>, drain_queue: Arc<Mutex<Vec<CompletedJob>>>) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..size.max(1))
            .map(|i| {
                let receiver = receiver.clone();
                let compiler = compiler.clone();
                let drain_queue = drain_queue.clone();
                thread::Builder::new()
                    .name(format!("gs2-compile-{i}"))
                    .spawn(move || loop {
                        let job = receiver.lock().recv();
                        match job {
                            Ok(job) => {
                                let artifact = compiler.compile(&job.source);
                                drain_queue.lock().push(CompletedJob {
                                    source: job.source,
                                    artifact,
                                });
                            }
                            Err(_) => break,
                        }
                    })
                    .expect("failed to spawn bytecode compile worker")
            })
            .collect();

        Self {
            sender,
            _handles: handles,
        }
    }

    fn submit(&self, source: String) {
        // The channel only closes when every worker has panicked; dropping the
        // job silently in that case matches "background failure never aborts
        // the process" (spec §7) since the source simply never completes.
        let _ = self.sender.send(Job { source });
    }
}

/// Content-addressed cache from source text to compiled artifact.
///
/// In synchronous mode (the default) `compile_script` invokes the compiler
/// inline on the calling thread. In worker-pool mode the compile happens on a
/// background thread and the result is picked up by the next [`run_queue`]
/// call, which must be driven from the main loop (§4.3, §5).
pub struct BytecodeCache {
    compiler: Arc<dyn Compiler>,
    entries: Mutex<HashMap<String, Entry>>,
    worker_pool: Option<WorkerPool>,
    drain_queue: Arc<Mutex<Vec<CompletedJob>>>,
    compiles_invoked: AtomicUsize,
}

impl BytecodeCache {
    /// Synchronous cache: every `compile_script` call compiles inline if the
    /// source isn't already cached. This is the default per §9's Open
    /// Questions resolution.
    pub fn new(compiler: Arc<dyn Compiler>) -> Self {
        Self {
            compiler,
            entries: Mutex::new(HashMap::new()),
            worker_pool: None,
            drain_queue: Arc::new(Mutex::new(Vec::new())),
            compiles_invoked: AtomicUsize::new(0),
        }
    }

    /// Asynchronous cache backed by a fixed-size worker pool (default 4 per
    /// §6). Completions only fire when [`run_queue`](Self::run_queue) is
    /// called from the main loop.
    pub fn with_worker_pool(compiler: Arc<dyn Compiler>, pool_size: usize) -> Self {
        let drain_queue = Arc::new(Mutex::new(Vec::new()));
        let worker_pool = WorkerPool::new(pool_size, compiler.clone(), drain_queue.clone());
        Self {
            compiler,
            entries: Mutex::new(HashMap::new()),
            worker_pool: Some(worker_pool),
            drain_queue,
            compiles_invoked: AtomicUsize::new(0),
        }
    }

    /// Request compilation of `source`. If already cached, `on_complete`
    /// fires synchronously before this call returns. Otherwise, in
    /// synchronous mode it fires synchronously after compiling inline; in
    /// worker-pool mode it fires from the next [`run_queue`](Self::run_queue)
    /// call. Concurrent requests for an identical `source` before the first
    /// completes are coalesced: the compiler runs exactly once and every
    /// caller's completion fires, in submission order.
    pub fn compile_script(&self, source: &str, on_complete: impl FnOnce(Artifact) + Send + 'static) {
        let on_complete: Completion = Box::new(on_complete);
        let mut entries = self.entries.lock();

        match entries.get_mut(source) {
            Some(Entry::Ready(artifact)) => {
                let artifact = artifact.clone();
                drop(entries);
                on_complete(artifact);
            }
            Some(Entry::Pending(waiters)) => {
                waiters.push(on_complete);
            }
            None => match &self.worker_pool {
                None => {
                    self.compiles_invoked.fetch_add(1, Ordering::Relaxed);
                    let artifact = self.compiler.compile(source);
                    entries.insert(source.to_string(), Entry::Ready(artifact.clone()));
                    drop(entries);
                    on_complete(artifact);
                }
                Some(pool) => {
                    self.compiles_invoked.fetch_add(1, Ordering::Relaxed);
                    entries.insert(source.to_string(), Entry::Pending(vec![on_complete]));
                    drop(entries);
                    pool.submit(source.to_string());
                }
            },
        }
    }

    /// Drain the completion queue populated by the worker pool, inserting
    /// each finished compile into the cache and firing every coalesced
    /// completion in submission order. A no-op in synchronous mode. Must be
    /// called only from the main loop (§5).
    pub fn run_queue(&self) {
        let jobs = {
            let mut queue = self.drain_queue.lock();
            std::mem::take(&mut *queue)
        };

        for job in jobs {
            let waiters = {
                let mut entries = self.entries.lock();
                match entries.insert(job.source.clone(), Entry::Ready(job.artifact.clone())) {
                    Some(Entry::Pending(waiters)) => waiters,
                    _ => Vec::new(),
                }
            };
            for waiter in waiters {
                waiter(job.artifact.clone());
            }
        }
    }

    /// Whether `source` has a cached (ready) artifact.
    pub fn is_cached(&self, source: &str) -> bool {
        matches!(self.entries.lock().get(source), Some(Entry::Ready(_)))
    }

    /// Number of distinct sources with a cached entry, ready or pending.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of times the underlying compiler has actually been
    /// invoked. Used to assert single-flight coalescing in tests.
    pub fn compiles_invoked(&self) -> usize {
        self.compiles_invoked.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    struct CountingCompiler {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingCompiler {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl Compiler for CountingCompiler {
        fn compile(&self, source: &str) -> Artifact {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Artifact::Failed(Arc::from("boom"))
            } else {
                Artifact::Compiled(Arc::from(source.as_bytes()))
            }
        }
    }

    #[test]
    fn synchronous_compile_fires_immediately_and_caches() {
        let compiler = Arc::new(CountingCompiler::new(false));
        let cache = BytecodeCache::new(compiler.clone());

        let (tx, rx) = mpsc::channel();
        cache.compile_script("script a", move |artifact| tx.send(artifact).unwrap());
        let artifact = rx.recv().unwrap();
        assert!(matches!(artifact, Artifact::Compiled(_)));
        assert_eq!(compiler.calls.load(Ordering::SeqCst), 1);

        // second request for the same source must not recompile
        let (tx2, rx2) = mpsc::channel();
        cache.compile_script("script a", move |artifact| tx2.send(artifact).unwrap());
        rx2.recv().unwrap();
        assert_eq!(compiler.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.compiles_invoked(), 1);
    }

    #[test]
    fn failed_compile_is_cached_as_sentinel() {
        let compiler = Arc::new(CountingCompiler::new(true));
        let cache = BytecodeCache::new(compiler.clone());

        let (tx, rx) = mpsc::channel();
        cache.compile_script("broken", move |artifact| tx.send(artifact).unwrap());
        assert!(rx.recv().unwrap().is_failed());

        let (tx2, rx2) = mpsc::channel();
        cache.compile_script("broken", move |artifact| tx2.send(artifact).unwrap());
        assert!(rx2.recv().unwrap().is_failed());
        // no retry storm: compiler invoked exactly once despite two requests
        assert_eq!(compiler.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn worker_pool_coalesces_concurrent_requests_and_preserves_order() {
        let compiler = Arc::new(CountingCompiler::new(false));
        let cache = BytecodeCache::with_worker_pool(compiler.clone(), 4);

        let (tx, rx) = mpsc::channel();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            let tx = tx.clone();
            cache.compile_script("shared source", move |artifact| {
                order.lock().push(i);
                let _ = tx.send(artifact);
            });
        }
        drop(tx);

        // Give the worker thread time to finish the compile, then drain.
        std::thread::sleep(Duration::from_millis(50));
        cache.run_queue();

        let mut received = 0;
        while rx.recv_timeout(Duration::from_millis(100)).is_ok() {
            received += 1;
        }
        assert_eq!(received, 3);
        assert_eq!(compiler.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn run_queue_is_noop_in_synchronous_mode() {
        let compiler = Arc::new(CountingCompiler::new(false));
        let cache = BytecodeCache::new(compiler);
        cache.run_queue();
        assert!(cache.is_empty());
    }
}
