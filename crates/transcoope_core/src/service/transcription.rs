//! Simulated transcription pipeline.
//!
//! # Responsibility
//! - Walk a fixed sequence of processing steps with an artificial delay.
//! - Report progress after each step and produce a fabricated result.
//!
//! # Invariants
//! - A job can be cancelled at any time; cancellation is observed during the
//!   step delay, so no further progress is reported after it.
//! - Progress is always delivered before the job's outcome.
//! - Nothing is computed from audio. The result depends only on the file name.

use crate::model::transcription::{
    TranscriptionJobId, TranscriptionProgress, TranscriptionResult,
};
use crate::model::upload::AudioFile;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Processing steps as `(percent, message)`.
pub const TRANSCRIPTION_STEPS: [(u8, &str); 5] = [
    (20, "Analyzing audio file..."),
    (40, "Separating instruments..."),
    (60, "Detecting melodies..."),
    (80, "Generating scores..."),
    (100, "Transcription complete!"),
];

pub type TranscriptionOutcome = Result<TranscriptionResult, TranscriptionError>;
type OutcomeFuture = Pin<Box<dyn Future<Output = TranscriptionOutcome>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionError {
    Cancelled {
        job_id: TranscriptionJobId,
        completed_percent: u8,
    },
}

impl Display for TranscriptionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled {
                job_id,
                completed_percent,
            } => write!(
                f,
                "transcription {job_id} cancelled at {completed_percent}%"
            ),
        }
    }
}

impl Error for TranscriptionError {}

/// Next thing a running job has to report.
#[derive(Debug)]
pub enum JobEvent {
    Progress(TranscriptionProgress),
    Finished(TranscriptionOutcome),
}

/// Handle to one running transcription.
///
/// The job makes progress only while it is polled through `next_event`.
pub struct TranscriptionJob {
    id: TranscriptionJobId,
    file_name: String,
    cancel: CancellationToken,
    progress: mpsc::UnboundedReceiver<TranscriptionProgress>,
    running: Option<OutcomeFuture>,
    finished: Option<TranscriptionOutcome>,
}

impl TranscriptionJob {
    pub fn id(&self) -> TranscriptionJobId {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this job, for wiring into signal handlers.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drives the job until it has something to report.
    ///
    /// Buffered progress is drained before the outcome is returned. Once
    /// `JobEvent::Finished` has been returned, further calls never resolve.
    pub async fn next_event(&mut self) -> JobEvent {
        loop {
            if let Ok(progress) = self.progress.try_recv() {
                return JobEvent::Progress(progress);
            }
            if let Some(outcome) = self.finished.take() {
                return JobEvent::Finished(outcome);
            }
            let Some(running) = self.running.as_mut() else {
                return std::future::pending().await;
            };
            tokio::select! {
                biased;
                Some(progress) = self.progress.recv() => return JobEvent::Progress(progress),
                outcome = running => {
                    self.running = None;
                    self.finished = Some(outcome);
                }
            }
        }
    }

    /// Runs the job to its end, handing every progress notice to `on_progress`.
    pub async fn run_to_end(
        mut self,
        mut on_progress: impl FnMut(&TranscriptionProgress),
    ) -> TranscriptionOutcome {
        loop {
            match self.next_event().await {
                JobEvent::Progress(progress) => on_progress(&progress),
                JobEvent::Finished(outcome) => return outcome,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptionPipeline {
    step_delay: Duration,
}

impl TranscriptionPipeline {
    pub fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }

    pub fn start(&self, file: AudioFile) -> TranscriptionJob {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let file_name = file.name.clone();
        let running: OutcomeFuture = Box::pin(run_steps(
            id,
            file,
            self.step_delay,
            cancel.clone(),
            progress_tx,
        ));
        info!("event=transcription_start module=transcription status=start job_id={id}");

        TranscriptionJob {
            id,
            file_name,
            cancel,
            progress: progress_rx,
            running: Some(running),
            finished: None,
        }
    }
}

async fn run_steps(
    job_id: TranscriptionJobId,
    file: AudioFile,
    step_delay: Duration,
    cancel: CancellationToken,
    progress: mpsc::UnboundedSender<TranscriptionProgress>,
) -> TranscriptionOutcome {
    let mut completed_percent = 0;
    for (percent, message) in TRANSCRIPTION_STEPS {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(
                    "event=transcription_finish module=transcription status=cancelled job_id={job_id} completed_percent={completed_percent}"
                );
                return Err(TranscriptionError::Cancelled { job_id, completed_percent });
            }
            _ = tokio::time::sleep(step_delay) => {}
        }
        completed_percent = percent;
        // A dropped receiver only means nobody watches progress.
        let _ = progress.send(TranscriptionProgress {
            job_id,
            percent,
            message,
        });
    }

    info!("event=transcription_finish module=transcription status=ok job_id={job_id}");
    Ok(fabricated_result(&file))
}

fn fabricated_result(file: &AudioFile) -> TranscriptionResult {
    TranscriptionResult {
        success: true,
        file: file.name.clone(),
        instruments: ["Guitar", "Bass", "Drums", "Piano"]
            .into_iter()
            .map(str::to_string)
            .collect(),
        duration: "3:45".to_string(),
        key: "C Major".to_string(),
        bpm: 120,
    }
}

#[cfg(test)]
mod tests {
    use super::{JobEvent, TranscriptionError, TranscriptionPipeline, TRANSCRIPTION_STEPS};
    use crate::model::upload::AudioFile;
    use std::time::Duration;

    fn file() -> AudioFile {
        AudioFile::new("song.mp3", "audio/mpeg", 4_096)
    }

    #[tokio::test(start_paused = true)]
    async fn completes_all_steps_in_order() {
        let pipeline = TranscriptionPipeline::new(Duration::from_millis(1_500));
        let started = tokio::time::Instant::now();
        let mut seen = Vec::new();

        let result = pipeline
            .start(file())
            .run_to_end(|progress| seen.push(progress.percent))
            .await
            .expect("uncancelled job succeeds");

        assert_eq!(seen, vec![20, 40, 60, 80, 100]);
        assert!(started.elapsed() >= Duration::from_millis(1_500) * TRANSCRIPTION_STEPS.len() as u32);
        assert!(result.success);
        assert_eq!(result.file, "song.mp3");
        assert_eq!(result.instruments, vec!["Guitar", "Bass", "Drums", "Piano"]);
        assert_eq!(result.duration, "3:45");
        assert_eq!(result.key, "C Major");
        assert_eq!(result.bpm, 120);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_between_steps() {
        let pipeline = TranscriptionPipeline::new(Duration::from_millis(100));
        let mut job = pipeline.start(file());
        let job_id = job.id();

        let first = job.next_event().await;
        assert!(matches!(first, JobEvent::Progress(ref progress) if progress.percent == 20));
        let second = job.next_event().await;
        assert!(matches!(second, JobEvent::Progress(ref progress) if progress.percent == 40));

        job.cancel();
        match job.next_event().await {
            JobEvent::Finished(Err(err)) => assert_eq!(
                err,
                TranscriptionError::Cancelled {
                    job_id,
                    completed_percent: 40,
                }
            ),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_first_step_reports_zero_progress() {
        let pipeline = TranscriptionPipeline::new(Duration::from_millis(100));
        let job = pipeline.start(file());
        job.cancel_token().cancel();

        let mut progress_count = 0;
        let outcome = job.run_to_end(|_| progress_count += 1).await;
        assert_eq!(progress_count, 0);
        assert!(matches!(
            outcome,
            Err(TranscriptionError::Cancelled {
                completed_percent: 0,
                ..
            })
        ));
    }
}
