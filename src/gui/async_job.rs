//! One-shot background jobs polled from the GUI thread.
//!
//! The future runs on the shared tokio runtime; the frame loop calls
//! [`AsyncJob::poll`] until the result arrives.

use crate::error::TipJarError;
use std::future::Future;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use tokio::runtime::Handle;

pub struct AsyncJob<T> {
    receiver: Option<Receiver<Result<T, TipJarError>>>,
}

impl<T: Send + 'static> AsyncJob<T> {
    pub fn new(receiver: Receiver<Result<T, TipJarError>>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Run `fut` on `runtime` and return a handle to its eventual result.
    pub fn spawn<F>(runtime: &Handle, fut: F) -> Self
    where
        F: Future<Output = Result<T, TipJarError>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        runtime.spawn(async move {
            let _ = tx.send(fut.await);
        });
        Self::new(rx)
    }

    /// Returns Some(result) once, when the job has finished
    pub fn poll(&mut self) -> Option<Result<T, TipJarError>> {
        let rx = self.receiver.as_ref()?;
        match rx.try_recv() {
            Ok(res) => {
                self.receiver = None;
                Some(res)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                Some(Err(TipJarError::SubmissionFailed(Some(
                    "Worker task disconnected".to_string(),
                ))))
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }
}
