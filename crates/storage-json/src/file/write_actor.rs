use cointrail_core::errors::Result;
use cointrail_core::prices::{DocumentJob, PriceDocument, UpdateOutcome};
use tokio::sync::{mpsc, oneshot};

use super::PriceFile;
use crate::errors::StorageError;

enum WriteJob {
    Update {
        job: DocumentJob,
        reply: oneshot::Sender<Result<UpdateOutcome>>,
    },
    Replace {
        document: PriceDocument,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Handle for sending jobs to the writer task.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<WriteJob>,
}

impl WriteHandle {
    /// Runs `job` against the freshest document on disk and writes the
    /// result back if the job applied a change.
    pub async fn update(&self, job: DocumentJob) -> Result<UpdateOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(WriteJob::Update { job, reply }).await?;
        rx.await.map_err(|_| dropped_reply())?
    }

    /// Overwrites the whole document.
    pub async fn replace(&self, document: PriceDocument) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(WriteJob::Replace { document, reply }).await?;
        rx.await.map_err(|_| dropped_reply())?
    }

    async fn send(&self, job: WriteJob) -> Result<()> {
        self.tx
            .send(job)
            .await
            .map_err(|_| StorageError::WriterClosed("writer channel closed".to_string()).into())
    }
}

fn dropped_reply() -> cointrail_core::Error {
    StorageError::WriterClosed("writer dropped the reply".to_string()).into()
}

fn run_update(file: &PriceFile, job: DocumentJob) -> Result<UpdateOutcome> {
    let mut document = file.read_or_default()?;
    let outcome = job(&mut document)?;
    if outcome.is_applied() {
        file.write(&document)?;
    }
    Ok(outcome)
}

/// Spawns the single task that owns writes to `file`.
///
/// Jobs are processed one at a time in arrival order; each runs its blocking
/// file I/O on the blocking pool and is awaited before the next is taken.
pub fn spawn_writer(file: PriceFile) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<WriteJob>(1024);

    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            let file = file.clone();
            match job {
                WriteJob::Update { job, reply } => {
                    let result: Result<UpdateOutcome> =
                        tokio::task::spawn_blocking(move || run_update(&file, job))
                            .await
                            .unwrap_or_else(|e| {
                                Err(StorageError::WriterClosed(format!(
                                    "update job panicked: {}",
                                    e
                                ))
                                .into())
                            });
                    // Receiver may have gone away (request cancelled).
                    let _ = reply.send(result);
                }
                WriteJob::Replace { document, reply } => {
                    let result: Result<()> = tokio::task::spawn_blocking(move || {
                        file.write(&document).map_err(cointrail_core::Error::from)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        Err(StorageError::WriterClosed(format!("write job panicked: {}", e)).into())
                    });
                    let _ = reply.send(result);
                }
            }
        }
        log::debug!("Price writer stopped");
    });

    WriteHandle { tx }
}
