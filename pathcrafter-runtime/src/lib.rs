//! Tokio runtime wrapper owning the process-wide cancellation token.
//!
//! Long-running work (a guide job) gets a child token from
//! [`PathcrafterHandle::job_token`]; cancelling the root, either through
//! Ctrl-C or [`PathcrafterRuntime::shutdown`], cancels every job.
use anyhow::Result;
use std::future::Future;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct PathcrafterHandle {
    inner: Handle,
    cancel: CancellationToken,
}

pub struct PathcrafterRuntime {
    runtime: Runtime,
    cancel: CancellationToken,
}

impl PathcrafterRuntime {
    /// Build a multi-threaded runtime.
    ///
    /// ```
    /// use pathcrafter_runtime::PathcrafterRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = PathcrafterRuntime::build("doctest-runtime", Some(1))
    ///     .expect("runtime builds");
    /// let value = runtime.block_on(async { 2 + 2 });
    /// assert_eq!(value, 4);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn build(thread_name: &str, worker_threads: Option<usize>) -> Result<Self> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name(thread_name);

        if let Some(workers) = worker_threads {
            builder.worker_threads(workers.max(1));
        }

        let runtime = builder.build()?;
        Ok(Self {
            runtime,
            cancel: CancellationToken::new(),
        })
    }

    pub fn handle(&self) -> PathcrafterHandle {
        PathcrafterHandle {
            inner: self.runtime.handle().clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Run a future to completion on the runtime.
    pub fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Cancel the root token when the process receives Ctrl-C.
    pub fn cancel_on_ctrl_c(&self) {
        let cancel = self.cancel.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        tracing::warn!(error = %e, "runtime.ctrl_c.unavailable");
                        return;
                    }
                    tracing::info!("runtime.ctrl_c");
                    cancel.cancel();
                }
                _ = cancel.cancelled() => {}
            }
        });
    }

    /// Cancel outstanding work and shut the runtime down gracefully.
    ///
    /// ```
    /// use pathcrafter_runtime::PathcrafterRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = PathcrafterRuntime::build("shutdown-example", Some(1)).unwrap();
    /// let job = runtime.handle().job_token();
    /// runtime.shutdown(Duration::from_millis(5));
    /// assert!(job.is_cancelled());
    /// ```
    pub fn shutdown(self, graceful: std::time::Duration) {
        self.cancel.cancel();
        self.runtime.shutdown_timeout(graceful);
    }
}

impl PathcrafterHandle {
    /// Spawn a future onto the shared runtime handle.
    ///
    /// ```
    /// use pathcrafter_runtime::PathcrafterRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = PathcrafterRuntime::build("handle-doctest", Some(1)).unwrap();
    /// let handle = runtime.handle();
    /// let task = handle.spawn(async { 21 * 2 });
    /// let result = runtime.block_on(async move { task.await.unwrap() });
    /// assert_eq!(result, 42);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn spawn<F, T>(&self, fut: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.spawn(fut)
    }

    /// Token for one job. Cancelling it leaves the root and other jobs alone.
    ///
    /// ```
    /// use pathcrafter_runtime::PathcrafterRuntime;
    ///
    /// let runtime = PathcrafterRuntime::build("token-example", Some(1)).unwrap();
    /// let handle = runtime.handle();
    /// let first = handle.job_token();
    /// let second = handle.job_token();
    /// first.cancel();
    /// assert!(!second.is_cancelled());
    /// assert!(!handle.is_shutting_down());
    /// ```
    pub fn job_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
