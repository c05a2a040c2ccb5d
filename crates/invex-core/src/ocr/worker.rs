//! A dedicated OCR thread.
//!
//! `pure-onnx-ocr` sessions keep plan caches in `RefCell`s, so an engine must
//! stay on the thread that built it. The worker owns it there and serves
//! requests over a channel; the handle is `Send + Sync`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;

use image::DynamicImage;
use tracing::{debug, error};

use crate::error::{OcrError, panic_message};

use super::OcrLine;

type Reply = Result<Vec<OcrLine>, OcrError>;

struct Job {
    image: DynamicImage,
    reply: mpsc::SyncSender<Reply>,
}

/// Handle to a thread that owns one recognizer.
pub struct OcrWorker {
    jobs: mpsc::Sender<Job>,
}

impl OcrWorker {
    /// Spawn the thread and build the recognizer on it with `build`.
    ///
    /// Returns once the recognizer is ready, or with the error `build` gave.
    pub fn spawn<B, F>(name: &str, build: B) -> Result<Self, OcrError>
    where
        B: FnOnce() -> Result<F, OcrError> + Send + 'static,
        F: FnMut(&DynamicImage) -> Reply + 'static,
    {
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), OcrError>>(1);

        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let recognize = match build() {
                    Ok(recognize) => {
                        let _ = ready_tx.send(Ok(()));
                        recognize
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                serve(recognize, jobs_rx);
            })
            .map_err(|e| OcrError::ModelLoad(format!("failed to spawn OCR thread: {}", e)))?;

        ready_rx
            .recv()
            .map_err(|_| OcrError::ModelLoad("OCR thread exited during startup".to_string()))??;

        Ok(Self { jobs: jobs_tx })
    }

    /// Recognize `image` on the worker thread, blocking until it answers.
    pub fn recognize(&self, image: DynamicImage) -> Reply {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.jobs
            .send(Job {
                image,
                reply: reply_tx,
            })
            .map_err(|_| OcrError::Recognition("OCR thread is not running".to_string()))?;

        reply_rx
            .recv()
            .map_err(|_| OcrError::Recognition("OCR thread dropped the request".to_string()))?
    }
}

/// Answer jobs until every handle is dropped.
fn serve<F>(mut recognize: F, jobs: mpsc::Receiver<Job>)
where
    F: FnMut(&DynamicImage) -> Reply,
{
    debug!("OCR thread ready");

    for job in jobs {
        // A panic inside the engine fails this request only
        let reply = match panic::catch_unwind(AssertUnwindSafe(|| recognize(&job.image))) {
            Ok(reply) => reply,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("OCR engine panicked: {}", message);
                Err(OcrError::Recognition(format!("OCR engine panicked: {}", message)))
            }
        };
        let _ = job.reply.send(reply);
    }

    debug!("OCR thread stopped");
}
