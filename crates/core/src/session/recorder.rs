use std::time::SystemTime;

use crate::analysis::SessionStats;
use crate::config::HistoryCapacity;
use crate::emotion::{Emotion, FacialReading, Sentiment, VoiceReading};
use crate::history::HistoryBuffer;
use crate::session::SessionEvent;

/// Collects sampler events on the consumer side and aggregates them into a
/// session summary.
pub struct SessionRecorder {
    started_at: SystemTime,
    current_facial: Option<FacialReading>,
    current_voice: Option<VoiceReading>,
    facial_history: HistoryBuffer<FacialReading>,
    voice_history: HistoryBuffer<VoiceReading>,
    fallback_count: usize,
}

/// Aggregate view over one session. Only produced once at least one facial
/// reading exists.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub dominant_emotion: Emotion,
    pub avg_confidence: u8,
    pub duration_minutes: f64,
    pub total_detections: usize,
    pub emotion_changes: usize,
    pub emotion_distribution: Vec<(Emotion, usize)>,
    pub voice: Option<VoiceSummary>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoiceSummary {
    pub avg_stress: f64,
    pub avg_engagement: f64,
    pub dominant_sentiment: Sentiment,
}

impl SessionRecorder {
    pub fn new(started_at: SystemTime, capacity: HistoryCapacity) -> Self {
        Self {
            started_at,
            current_facial: None,
            current_voice: None,
            facial_history: HistoryBuffer::new(capacity.get()),
            voice_history: HistoryBuffer::new(capacity.get()),
            fallback_count: 0,
        }
    }

    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Facial { reading, synthetic } => {
                if *synthetic {
                    self.fallback_count += 1;
                }
                self.current_facial = Some(reading.clone());
                self.facial_history.push(reading.clone());
            }
            SessionEvent::Voice { reading, synthetic } => {
                if *synthetic {
                    self.fallback_count += 1;
                }
                self.current_voice = Some(reading.clone());
                self.voice_history.push(reading.clone());
            }
        }
    }

    /// Drop the live readings while keeping history, as when a session stops.
    pub fn clear_current(&mut self) {
        self.current_facial = None;
        self.current_voice = None;
    }

    pub fn current_facial(&self) -> Option<&FacialReading> {
        self.current_facial.as_ref()
    }

    pub fn current_voice(&self) -> Option<&VoiceReading> {
        self.current_voice.as_ref()
    }

    pub fn facial_history(&self) -> &HistoryBuffer<FacialReading> {
        &self.facial_history
    }

    pub fn voice_history(&self) -> &HistoryBuffer<VoiceReading> {
        &self.voice_history
    }

    pub fn fallback_count(&self) -> usize {
        self.fallback_count
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    pub fn summary(&self, now: SystemTime) -> Option<SessionSummary> {
        if self.facial_history.is_empty() {
            return None;
        }

        let total = self.facial_history.len();
        let confidence_sum: u32 = self
            .facial_history
            .iter()
            .map(|r| u32::from(r.confidence.get()))
            .sum();
        let avg_confidence = (f64::from(confidence_sum) / total as f64).round() as u8;

        let emotions: Vec<Emotion> = self.facial_history.iter().map(|r| r.emotion).collect();
        let emotion_changes = emotions.windows(2).filter(|w| w[0] != w[1]).count();
        let emotion_distribution = counts_in_order(emotions.iter().copied());
        let dominant_emotion = stable_max(&emotion_distribution).unwrap_or(Emotion::Neutral);

        let voice = if self.voice_history.is_empty() {
            None
        } else {
            let n = self.voice_history.len() as f64;
            let stress_sum: u32 = self
                .voice_history
                .iter()
                .map(|r| u32::from(r.stress.get()))
                .sum();
            let engagement_sum: u32 = self
                .voice_history
                .iter()
                .map(|r| u32::from(r.engagement.get()))
                .sum();
            let sentiments = counts_in_order(self.voice_history.iter().map(|r| r.sentiment));
            Some(VoiceSummary {
                avg_stress: f64::from(stress_sum) / n,
                avg_engagement: f64::from(engagement_sum) / n,
                dominant_sentiment: stable_max(&sentiments).unwrap_or(Sentiment::Neutral),
            })
        };

        Some(SessionSummary {
            dominant_emotion,
            avg_confidence,
            duration_minutes: round_tenth(minutes_between(self.started_at, now)),
            total_detections: total,
            emotion_changes,
            emotion_distribution,
            voice,
        })
    }

    /// The numbers handed to an analyzer for a narrative session report.
    pub fn stats(&self, now: SystemTime) -> Option<SessionStats> {
        let summary = self.summary(now)?;
        Some(SessionStats {
            emotions: self.facial_history.iter().map(|r| r.emotion).collect(),
            duration_minutes: summary.duration_minutes,
            avg_confidence: summary.avg_confidence,
            dominant_emotion: summary.dominant_emotion,
            emotion_changes: summary.emotion_changes,
        })
    }
}

fn minutes_between(start: SystemTime, end: SystemTime) -> f64 {
    end.duration_since(start).unwrap_or_default().as_secs_f64() / 60.0
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Count occurrences, keeping first-appearance order.
pub(crate) fn counts_in_order<T: Copy + PartialEq>(items: impl Iterator<Item = T>) -> Vec<(T, usize)> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(value, _)| *value == item) {
            Some((_, n)) => *n += 1,
            None => counts.push((item, 1)),
        }
    }
    counts
}

/// Highest count wins; ties go to the earliest entry.
pub(crate) fn stable_max<T: Copy>(counts: &[(T, usize)]) -> Option<T> {
    let mut best: Option<(T, usize)> = None;
    for &(value, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{Confidence, EngagementLevel, StressLevel};
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn facial_event(emotion: Emotion, confidence: u8, synthetic: bool) -> SessionEvent {
        SessionEvent::Facial {
            reading: FacialReading {
                emotion,
                confidence: Confidence::percent(confidence),
                analysis: "steady state".to_owned(),
                micro_expressions: vec![],
                body_language: vec![],
                observed_at: at(0),
            },
            synthetic,
        }
    }

    fn voice_event(sentiment: Sentiment, stress: u8, engagement: u8) -> SessionEvent {
        SessionEvent::Voice {
            reading: VoiceReading {
                sentiment,
                confidence: Confidence::percent(80),
                indicators: vec![],
                stress: StressLevel::new(stress),
                engagement: EngagementLevel::new(engagement),
                observed_at: at(0),
            },
            synthetic: false,
        }
    }

    fn recorder_with(events: &[SessionEvent]) -> SessionRecorder {
        let mut recorder = SessionRecorder::new(at(0), HistoryCapacity::default());
        for event in events {
            recorder.apply(event);
        }
        recorder
    }

    #[test]
    fn summary_requires_a_facial_reading() {
        let recorder = recorder_with(&[voice_event(Sentiment::Calm, 3, 6)]);
        assert!(recorder.summary(at(60)).is_none());
    }

    #[test]
    fn summary_aggregates_readings() {
        let recorder = recorder_with(&[
            facial_event(Emotion::Engaged, 80, false),
            facial_event(Emotion::Engaged, 90, false),
            facial_event(Emotion::Focused, 70, false),
            facial_event(Emotion::Engaged, 80, false),
        ]);
        let summary = recorder.summary(at(150)).expect("has readings");
        assert_eq!(summary.dominant_emotion, Emotion::Engaged);
        assert_eq!(summary.avg_confidence, 80);
        assert_eq!(summary.duration_minutes, 2.5);
        assert_eq!(summary.total_detections, 4);
        assert_eq!(summary.emotion_changes, 2);
        assert_eq!(
            summary.emotion_distribution,
            vec![(Emotion::Engaged, 3), (Emotion::Focused, 1)]
        );
        assert!(summary.voice.is_none());
    }

    #[test]
    fn avg_confidence_rounds_half_up() {
        let recorder = recorder_with(&[
            facial_event(Emotion::Neutral, 84, false),
            facial_event(Emotion::Neutral, 85, false),
        ]);
        let summary = recorder.summary(at(60)).expect("has readings");
        assert_eq!(summary.avg_confidence, 85);
    }

    #[test]
    fn duration_rounds_to_one_decimal() {
        let recorder = recorder_with(&[facial_event(Emotion::Neutral, 80, false)]);
        let summary = recorder.summary(at(100)).expect("has readings");
        assert_eq!(summary.duration_minutes, 1.7);
    }

    #[test]
    fn dominant_ties_resolve_to_first_seen() {
        let recorder = recorder_with(&[
            facial_event(Emotion::Focused, 80, false),
            facial_event(Emotion::Engaged, 80, false),
            facial_event(Emotion::Engaged, 80, false),
            facial_event(Emotion::Focused, 80, false),
        ]);
        let summary = recorder.summary(at(60)).expect("has readings");
        assert_eq!(summary.dominant_emotion, Emotion::Focused);
    }

    #[test]
    fn history_capacity_bounds_detections() {
        let mut recorder = SessionRecorder::new(at(0), HistoryCapacity::new(3).expect("nonzero"));
        for emotion in [
            Emotion::Bored,
            Emotion::Engaged,
            Emotion::Engaged,
            Emotion::Focused,
            Emotion::Focused,
        ] {
            recorder.apply(&facial_event(emotion, 80, false));
        }
        let summary = recorder.summary(at(60)).expect("has readings");
        // Only the most recent three readings count.
        assert_eq!(summary.total_detections, 3);
        assert_eq!(
            summary.emotion_distribution,
            vec![(Emotion::Engaged, 1), (Emotion::Focused, 2)]
        );
        assert_eq!(summary.dominant_emotion, Emotion::Focused);
    }

    #[test]
    fn voice_summary_averages_levels() {
        let recorder = recorder_with(&[
            facial_event(Emotion::Neutral, 80, false),
            voice_event(Sentiment::Calm, 3, 5),
            voice_event(Sentiment::Positive, 4, 6),
            voice_event(Sentiment::Calm, 5, 7),
        ]);
        let summary = recorder.summary(at(60)).expect("has readings");
        let voice = summary.voice.expect("has voice readings");
        assert_eq!(voice.avg_stress, 4.0);
        assert_eq!(voice.avg_engagement, 6.0);
        assert_eq!(voice.dominant_sentiment, Sentiment::Calm);
    }

    #[test]
    fn synthetic_events_bump_fallback_count() {
        let recorder = recorder_with(&[
            facial_event(Emotion::Neutral, 80, true),
            facial_event(Emotion::Neutral, 80, false),
            facial_event(Emotion::Neutral, 80, true),
        ]);
        assert_eq!(recorder.fallback_count(), 2);
    }

    #[test]
    fn clear_current_keeps_history() {
        let mut recorder = recorder_with(&[facial_event(Emotion::Engaged, 80, false)]);
        assert!(recorder.current_facial().is_some());
        recorder.clear_current();
        assert!(recorder.current_facial().is_none());
        assert_eq!(recorder.facial_history().len(), 1);
    }

    #[test]
    fn stats_mirror_summary() {
        let recorder = recorder_with(&[
            facial_event(Emotion::Engaged, 80, false),
            facial_event(Emotion::Focused, 90, false),
        ]);
        let stats = recorder.stats(at(150)).expect("has readings");
        assert_eq!(stats.emotions, vec![Emotion::Engaged, Emotion::Focused]);
        assert_eq!(stats.duration_minutes, 2.5);
        assert_eq!(stats.avg_confidence, 85);
        assert_eq!(stats.dominant_emotion, Emotion::Engaged);
        assert_eq!(stats.emotion_changes, 1);
    }

    #[test]
    fn counts_keep_first_appearance_order() {
        let counts = counts_in_order([3, 1, 3, 2, 1, 3].into_iter());
        assert_eq!(counts, vec![(3, 3), (1, 2), (2, 1)]);
    }

    #[test]
    fn stable_max_prefers_earliest_on_tie() {
        assert_eq!(stable_max::<u8>(&[]), None);
        assert_eq!(stable_max(&[(5, 2), (7, 2), (9, 1)]), Some(5));
        assert_eq!(stable_max(&[(5, 1), (7, 2)]), Some(7));
    }
}
