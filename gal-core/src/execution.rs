use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use eyre::{Result, WrapErr};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, trace};

type Work = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone)]
pub struct Execution {
    shared: Arc<ExecutionShared>,
}

struct ExecutionShared {
    sender: UnboundedSender<Task>,
    max_threads: usize,
}

struct Task {
    work: Work,
    delay: Option<Duration>,
}

impl Execution {
    pub fn new(max_threads: usize) -> Result<Execution> {
        let max_threads = max_threads.max(1);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(max_threads)
            .enable_time()
            .thread_name_fn(|| {
                static ATOMIC_ID: AtomicUsize = AtomicUsize::new(0);
                let id = ATOMIC_ID.fetch_add(1, Ordering::SeqCst);
                format!("execution-{}", id)
            })
            .build()
            .wrap_err("failed to create tokio runtime")?;

        let (sender, receiver) = unbounded_channel();

        thread::Builder::new()
            .name("execution".into())
            .spawn(move || {
                runtime.block_on(run_dispatcher(receiver));
                debug!("execution dispatcher stopped");
            })
            .wrap_err("failed to spawn execution thread")?;

        Ok(Execution {
            shared: Arc::new(ExecutionShared {
                sender,
                max_threads,
            }),
        })
    }

    pub fn max_threads(&self) -> usize {
        self.shared.max_threads
    }

    pub fn dispatch<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.send(Task {
            work: Box::new(work),
            delay: None,
        });
    }

    pub fn dispatch_after<F>(&self, delay: Duration, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.send(Task {
            work: Box::new(work),
            delay: Some(delay),
        });
    }

    fn send(&self, task: Task) {
        if self.shared.sender.send(task).is_err() {
            error!("execution dispatcher is gone, task dropped");
        }
    }
}

impl Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Execution")
            .field("max_threads", &self.shared.max_threads)
            .finish_non_exhaustive()
    }
}

async fn run_dispatcher(mut receiver: UnboundedReceiver<Task>) {
    while let Some(task) = receiver.recv().await {
        tokio::spawn(run_task(task));
    }
}

async fn run_task(task: Task) {
    if let Some(delay) = task.delay {
        trace!(?delay, "delayed task");
        tokio::time::sleep(delay).await;
    }

    if let Err(error) = tokio::task::spawn_blocking(task.work).await {
        error!(?error, "execution task failed");
    }
}
