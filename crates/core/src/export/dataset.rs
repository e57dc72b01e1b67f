use chrono::{DateTime, Local};
use rand::Rng;
use std::collections::BTreeMap;

use crate::analysis::{canned, EmotionAnalyzer, ProgressOverview};
use crate::config::ExportIdentity;
use crate::emotion::{Confidence, Emotion, EngagementLevel, Rating, Sentiment, StressLevel};
use crate::export::{
    whole_hours, Analytics, EmotionSample, ExportArchive, ExportUser, SessionDigest, SessionRecord,
    TrendPoint, Trends, VoiceSample,
};
use crate::session::recorder::{counts_in_order, stable_max};

const SESSION_COUNT: usize = 15;

const DEMO_EMOTIONS: [Emotion; 6] = [
    Emotion::Engaged,
    Emotion::Focused,
    Emotion::Confident,
    Emotion::Neutral,
    Emotion::Nervous,
    Emotion::Distracted,
];

const DEMO_SENTIMENTS: [Sentiment; 5] = [
    Sentiment::Positive,
    Sentiment::Neutral,
    Sentiment::Calm,
    Sentiment::Excited,
    Sentiment::Stressed,
];

/// Generate fifteen plausible sessions spread over the past month, newest
/// first, one every other day.
pub fn demo_sessions<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Local>) -> Vec<SessionRecord> {
    let mut sessions = Vec::with_capacity(SESSION_COUNT);

    for i in 0..SESSION_COUNT {
        let date = now - chrono::Duration::days(2 * i as i64);
        let duration = rng.random_range(5..=24);

        let emotion_count = rng.random_range(3..=10usize);
        let mut emotions = Vec::with_capacity(emotion_count);
        for j in 0..emotion_count {
            emotions.push(EmotionSample {
                emotion: DEMO_EMOTIONS[rng.random_range(0..DEMO_EMOTIONS.len())],
                confidence: Confidence::percent(rng.random_range(70..=99)),
                timestamp: date.timestamp_millis() + (j as i64) * 30_000,
                analysis:
                    "Detailed emotional state analysis based on facial expressions and body language"
                        .to_owned(),
                micro_expressions: vec![
                    "Subtle eye movement".to_owned(),
                    "Lip tension variation".to_owned(),
                ],
                body_language: vec!["Forward lean".to_owned(), "Open posture".to_owned()],
            });
        }

        // A little fewer voice readings than facial ones.
        let voice_count = emotion_count * 7 / 10;
        let mut voice_analysis = Vec::with_capacity(voice_count);
        for k in 0..voice_count {
            voice_analysis.push(VoiceSample {
                sentiment: DEMO_SENTIMENTS[rng.random_range(0..DEMO_SENTIMENTS.len())],
                confidence: Confidence::percent(rng.random_range(75..=99)),
                indicators: vec![
                    "Clear articulation".to_owned(),
                    "Steady pace".to_owned(),
                    "Appropriate volume".to_owned(),
                ],
                stress_level: StressLevel::new(rng.random_range(2..=7)),
                engagement: EngagementLevel::new(rng.random_range(5..=9)),
                timestamp: date.timestamp_millis() + (k as i64) * 45_000,
            });
        }

        let counts = counts_in_order(emotions.iter().map(|s| s.emotion));
        let dominant_emotion = stable_max(&counts).unwrap_or(Emotion::Neutral);
        let confidence_sum: u32 = emotions.iter().map(|s| u32::from(s.confidence.get())).sum();
        let avg_confidence = Confidence::percent((confidence_sum / emotions.len() as u32) as u8);

        sessions.push(SessionRecord {
            id: format!("session_{}", i + 1),
            date,
            duration,
            emotions,
            voice_analysis,
            summary: SessionDigest {
                dominant_emotion,
                avg_confidence,
                emotion_changes: rng.random_range(1..=5),
                social_effectiveness: Rating::new(rng.random_range(7..=9)),
                emotional_stability: Rating::new(rng.random_range(6..=8)),
            },
            insights: vec![
                "Maintained consistent engagement throughout the session".to_owned(),
                "Showed strong emotional awareness and regulation".to_owned(),
                "Demonstrated effective non-verbal communication".to_owned(),
            ],
            recommendations: vec![
                "Continue practicing active listening techniques".to_owned(),
                "Focus on maintaining eye contact during conversations".to_owned(),
                "Work on stress management in high-pressure situations".to_owned(),
            ],
        });
    }

    sessions
}

/// Roll sessions up into totals, a distribution and oldest-to-newest trends.
pub fn analytics_for(sessions: &[SessionRecord]) -> Analytics {
    let total_sessions = sessions.len();
    let total_duration: u32 = sessions.iter().map(|s| s.duration).sum();
    let avg_session_duration = if total_sessions == 0 {
        0.0
    } else {
        let avg = f64::from(total_duration) / total_sessions as f64;
        (avg * 10.0).round() / 10.0
    };

    let mut emotion_distribution: BTreeMap<Emotion, usize> = BTreeMap::new();
    for session in sessions {
        for sample in &session.emotions {
            *emotion_distribution.entry(sample.emotion).or_insert(0) += 1;
        }
    }

    let confidence_over_time: Vec<TrendPoint> = sessions
        .iter()
        .rev()
        .map(|s| TrendPoint {
            date: s.date.format("%Y-%m-%d").to_string(),
            confidence: s.summary.avg_confidence,
        })
        .collect();

    let improvement_trends = Trends {
        social_effectiveness: sessions
            .iter()
            .rev()
            .map(|s| s.summary.social_effectiveness)
            .collect(),
        emotional_stability: sessions
            .iter()
            .rev()
            .map(|s| s.summary.emotional_stability)
            .collect(),
        dates: sessions
            .iter()
            .rev()
            .map(|s| s.date.format("%Y-%m-%d").to_string())
            .collect(),
    };

    Analytics {
        total_sessions,
        total_duration,
        avg_session_duration,
        emotion_distribution,
        confidence_over_time,
        improvement_trends,
    }
}

/// The numbers fed to the personal-development operation: five most recent
/// sessions' emotions, rating averages and the top three emotions overall.
pub fn progress_overview(sessions: &[SessionRecord], analytics: &Analytics) -> ProgressOverview {
    let recent_emotions: Vec<Emotion> = sessions
        .iter()
        .take(5)
        .flat_map(|s| s.emotions.iter().map(|e| e.emotion))
        .collect();

    let (avg_effectiveness, avg_stability) = if sessions.is_empty() {
        (0.0, 0.0)
    } else {
        let n = sessions.len() as f64;
        let eff: u32 = sessions
            .iter()
            .map(|s| u32::from(s.summary.social_effectiveness.get()))
            .sum();
        let stab: u32 = sessions
            .iter()
            .map(|s| u32::from(s.summary.emotional_stability.get()))
            .sum();
        (f64::from(eff) / n, f64::from(stab) / n)
    };

    let mut ranked: Vec<(Emotion, usize)> = analytics
        .emotion_distribution
        .iter()
        .map(|(e, n)| (*e, *n))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ProgressOverview {
        total_sessions: analytics.total_sessions,
        total_hours: u64::from(whole_hours(analytics.total_duration)),
        recent_emotions,
        avg_effectiveness,
        avg_stability,
        top_emotions: ranked.into_iter().take(3).map(|(e, _)| e).collect(),
    }
}

/// Build a complete demo archive. The analyzer writes the personal summary;
/// if it fails, the canned payload stands in.
pub async fn demo_archive<R, A>(
    rng: &mut R,
    now: DateTime<Local>,
    identity: &ExportIdentity,
    analyzer: &A,
) -> ExportArchive
where
    R: Rng + ?Sized,
    A: EmotionAnalyzer + ?Sized,
{
    let sessions = demo_sessions(rng, now);
    let analytics = analytics_for(&sessions);
    let overview = progress_overview(&sessions, &analytics);

    let summary = match analyzer.progress_summary(overview).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(error = %e, "progress summary failed, using canned payload");
            canned::mock_progress()
        }
    };

    ExportArchive {
        user: ExportUser {
            name: identity.name.clone(),
            email: identity.email.clone(),
            export_date: now,
        },
        sessions,
        analytics,
        summary,
    }
}
