//! Background execution context for extraction and archive building.
//!
//! The engine owns a single request queue drained by one task. Each request
//! runs to completion on the blocking pool before the next one is taken, so
//! requests never overlap and no state is shared between them. Callers keep
//! their own ordering by tagging extraction requests with an id.
//!
//! ## Example
//!
//! ```no_run
//! use mhtzip::Engine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (engine, worker) = Engine::spawn();
//!
//!     let bytes = tokio::fs::read("Series Chapter 1.mhtml").await?;
//!     let response = engine.extract(1, "Series Chapter 1.mhtml", bytes).await?;
//!     let groups: Vec<_> = response.outcome?.into_iter().map(Into::into).collect();
//!
//!     let archive = engine.build_archive(groups, None).await?;
//!     tokio::fs::write("out.zip", archive).await?;
//!
//!     drop(engine);
//!     worker.await?;
//!     Ok(())
//! }
//! ```

use log::debug;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{Error, ErrorKind, Result};
use crate::mhtml::{ExtractOptions, Group, extract_one};
use crate::progress::{NoProgress, Progress};
use crate::zip::{ArchiveGroup, ArchiveOptions, build_archive};

/// Pending requests the queue holds before `send` waits.
const QUEUE_DEPTH: usize = 16;

/// Caller-supplied tag matching a response to its request.
pub type RequestId = u64;

/// Answer to one extraction request.
#[derive(Debug)]
pub struct ExtractResponse {
    pub request_id: RequestId,
    /// `Ok(None)` means the file held no images; that is not an error.
    pub outcome: std::result::Result<Option<Group>, ErrorKind>,
}

enum Request {
    Extract {
        request_id: RequestId,
        file_name: String,
        buffer: Vec<u8>,
        reply: oneshot::Sender<ExtractResponse>,
    },
    Build {
        groups: Vec<ArchiveGroup>,
        progress: Option<mpsc::UnboundedSender<Progress>>,
        reply: oneshot::Sender<Result<Vec<u8>>>,
    },
}

/// Handle to a running engine. Cloning shares the same queue; the engine
/// stops once every handle is dropped and the queue is drained.
#[derive(Clone)]
pub struct Engine {
    tx: mpsc::Sender<Request>,
}

impl Engine {
    /// Start an engine with default options.
    pub fn spawn() -> (Self, JoinHandle<()>) {
        Self::spawn_with(ExtractOptions::default(), ArchiveOptions::default())
    }

    pub fn spawn_with(
        extract_options: ExtractOptions,
        archive_options: ArchiveOptions,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let worker = tokio::spawn(run(rx, extract_options, archive_options));
        (Self { tx }, worker)
    }

    /// Extract the images of one file.
    pub async fn extract(
        &self,
        request_id: RequestId,
        file_name: impl Into<String>,
        buffer: Vec<u8>,
    ) -> Result<ExtractResponse> {
        let (reply, response) = oneshot::channel();
        let request = Request::Extract {
            request_id,
            file_name: file_name.into(),
            buffer,
            reply,
        };
        self.tx.send(request).await.map_err(|_| Error::EngineClosed)?;
        response.await.map_err(|_| Error::EngineClosed)
    }

    /// Build one archive. Progress, if wanted, arrives on `progress` while
    /// the build runs.
    pub async fn build_archive(
        &self,
        groups: Vec<ArchiveGroup>,
        progress: Option<mpsc::UnboundedSender<Progress>>,
    ) -> Result<Vec<u8>> {
        let (reply, response) = oneshot::channel();
        let request = Request::Build {
            groups,
            progress,
            reply,
        };
        self.tx.send(request).await.map_err(|_| Error::EngineClosed)?;
        response.await.map_err(|_| Error::EngineClosed)?
    }
}

async fn run(
    mut rx: mpsc::Receiver<Request>,
    extract_options: ExtractOptions,
    archive_options: ArchiveOptions,
) {
    while let Some(request) = rx.recv().await {
        match request {
            Request::Extract {
                request_id,
                file_name,
                buffer,
                reply,
            } => {
                let options = extract_options.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    extract_one(&buffer, &file_name, &options).map_err(|e| e.kind())
                })
                .await
                .unwrap_or(Err(ErrorKind::Internal));

                // The caller may have stopped waiting.
                let _ = reply.send(ExtractResponse {
                    request_id,
                    outcome,
                });
            }
            Request::Build {
                groups,
                progress,
                reply,
            } => {
                let options = archive_options.clone();
                let result = tokio::task::spawn_blocking(move || match progress {
                    Some(mut tx) => build_archive(&groups, &options, &mut tx),
                    None => build_archive(&groups, &options, &mut NoProgress),
                })
                .await
                .unwrap_or_else(|e| Err(Error::archive_build(format!("build task failed: {}", e))));

                let _ = reply.send(result);
            }
        }
    }

    debug!("Engine queue closed, worker exiting");
}
