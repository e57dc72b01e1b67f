pub mod recorder;

use std::time::SystemTime;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::analysis::EmotionAnalyzer;
use crate::config::{AnalysisMode, AppConfig, HistoryCapacity, SampleInterval};
use crate::emotion::{FacialReading, VoiceReading};
use crate::observe::ObservationSource;

pub use recorder::{SessionRecorder, SessionSummary, VoiceSummary};

#[derive(Clone, Copy, Debug, Default)]
pub struct SamplerConfig {
    pub interval: SampleInterval,
    pub mode: AnalysisMode,
    pub history: HistoryCapacity,
}

impl SamplerConfig {
    pub fn from_app(app: &AppConfig) -> Self {
        Self {
            interval: app.interval,
            mode: app.mode,
            history: app.history,
        }
    }
}

/// One reading produced by the sampler. `synthetic` marks readings that were
/// substituted locally after the analyzer failed.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    Facial {
        reading: FacialReading,
        synthetic: bool,
    },
    Voice {
        reading: VoiceReading,
        synthetic: bool,
    },
}

/// Counters describing how a sampling run went.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplerReport {
    pub ticks: u64,
    pub fallbacks: u64,
    pub skipped_ticks: u64,
}

/// Drives periodic observation and analysis for one session.
///
/// Each tick observes a scene description, runs it through the analyzer and
/// emits the resulting reading. A tick that overruns the interval delays the
/// next one rather than stacking analyses; the overrun is counted in
/// `skipped_ticks`.
pub struct Sampler<O, A> {
    observer: O,
    analyzer: A,
    config: SamplerConfig,
}

impl<O, A> Sampler<O, A>
where
    O: ObservationSource,
    A: EmotionAnalyzer,
{
    pub fn new(observer: O, analyzer: A, config: SamplerConfig) -> Self {
        Self {
            observer,
            analyzer,
            config,
        }
    }

    /// Run until the shutdown flag turns true, either end of the shutdown
    /// channel goes away, or the event receiver is dropped. The first tick
    /// fires one full interval after start.
    pub async fn run(
        mut self,
        events: mpsc::Sender<SessionEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> SamplerReport {
        let period = self.config.interval.duration();
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut report = SamplerReport::default();

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    report.ticks += 1;
                    let started = Instant::now();
                    if !self.sample_once(&events, &mut report).await {
                        break;
                    }
                    let busy = started.elapsed();
                    if busy > period {
                        report.skipped_ticks += (busy.as_millis() / period.as_millis()) as u64;
                    }
                }
            }
        }

        report
    }

    /// Returns false once the event receiver is gone.
    async fn sample_once(
        &mut self,
        events: &mpsc::Sender<SessionEvent>,
        report: &mut SamplerReport,
    ) -> bool {
        if self.config.mode.facial_enabled() {
            let description = self.observer.facial_description();
            let event = match self.analyzer.analyze_facial(description).await {
                Ok(analysis) => SessionEvent::Facial {
                    reading: analysis.into_reading(SystemTime::now()),
                    synthetic: false,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "facial analysis failed, substituting reading");
                    report.fallbacks += 1;
                    SessionEvent::Facial {
                        reading: self.observer.fallback_facial(SystemTime::now()),
                        synthetic: true,
                    }
                }
            };
            if events.send(event).await.is_err() {
                tracing::debug!("event receiver dropped, ending session");
                return false;
            }
        }

        if self.config.mode.voice_enabled() {
            let description = self.observer.voice_description();
            let event = match self.analyzer.analyze_voice(description).await {
                Ok(analysis) => SessionEvent::Voice {
                    reading: analysis.into_reading(SystemTime::now()),
                    synthetic: false,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "voice analysis failed, substituting reading");
                    report.fallbacks += 1;
                    SessionEvent::Voice {
                        reading: self.observer.fallback_voice(SystemTime::now()),
                        synthetic: true,
                    }
                }
            };
            if events.send(event).await.is_err() {
                tracing::debug!("event receiver dropped, ending session");
                return false;
            }
        }

        true
    }
}
