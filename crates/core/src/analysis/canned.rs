use futures::future::BoxFuture;
use futures::FutureExt;
use rand::Rng;

use crate::analysis::{
    AnalyzerError, EmotionAnalyzer, FacialAnalysis, ProgressOverview, ProgressSummary,
    SessionInsights, SessionStats, VoiceAnalysis,
};
use crate::emotion::{Confidence, Emotion, EngagementLevel, Rating, Sentiment, StressLevel};

/// Analyzer used when no API key is configured. Serves the same canned
/// payloads the generative client degrades to on bad replies.
#[derive(Clone, Debug)]
pub struct CannedAnalyzer;

impl CannedAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CannedAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionAnalyzer for CannedAnalyzer {
    fn analyze_facial(
        &self,
        _description: String,
    ) -> BoxFuture<'_, Result<FacialAnalysis, AnalyzerError>> {
        let analysis = mock_facial(&mut rand::rng());
        async move { Ok(analysis) }.boxed()
    }

    fn analyze_voice(
        &self,
        _description: String,
    ) -> BoxFuture<'_, Result<VoiceAnalysis, AnalyzerError>> {
        async move { Ok(mock_voice()) }.boxed()
    }

    fn session_insights(
        &self,
        _stats: SessionStats,
    ) -> BoxFuture<'_, Result<SessionInsights, AnalyzerError>> {
        async move { Ok(mock_insights()) }.boxed()
    }

    fn progress_summary(
        &self,
        _overview: ProgressOverview,
    ) -> BoxFuture<'_, Result<ProgressSummary, AnalyzerError>> {
        async move { Ok(mock_progress()) }.boxed()
    }
}

pub(crate) fn mock_facial<R: Rng + ?Sized>(rng: &mut R) -> FacialAnalysis {
    const POOL: [Emotion; 6] = [
        Emotion::Engaged,
        Emotion::Focused,
        Emotion::Confident,
        Emotion::Neutral,
        Emotion::Nervous,
        Emotion::Distracted,
    ];
    FacialAnalysis {
        emotion: POOL[rng.random_range(0..POOL.len())],
        confidence: Confidence::percent(rng.random_range(70..=94)),
        analysis: "AI analysis temporarily using fallback data".to_owned(),
        micro_expressions: vec!["Baseline expression".to_owned(), "Neutral gaze".to_owned()],
        body_language: vec![
            "Standard posture".to_owned(),
            "Relaxed positioning".to_owned(),
        ],
    }
}

pub(crate) fn mock_voice() -> VoiceAnalysis {
    VoiceAnalysis {
        sentiment: Sentiment::Neutral,
        confidence: Confidence::percent(75),
        indicators: vec![
            "Normal pace".to_owned(),
            "Stable tone".to_owned(),
            "Clear articulation".to_owned(),
        ],
        stress: StressLevel::new(4),
        engagement: EngagementLevel::new(6),
    }
}

pub(crate) fn mock_insights() -> SessionInsights {
    SessionInsights {
        summary: "Session completed with consistent emotional patterns observed throughout the interaction.".to_owned(),
        insights: vec![
            "Maintained steady engagement".to_owned(),
            "Showed emotional awareness".to_owned(),
            "Demonstrated good self-regulation".to_owned(),
        ],
        recommendations: vec![
            "Continue current approach".to_owned(),
            "Practice stress management".to_owned(),
            "Focus on active listening".to_owned(),
        ],
        social_effectiveness: Rating::new(7),
        emotional_stability: Rating::new(8),
    }
}

pub(crate) fn mock_progress() -> ProgressSummary {
    ProgressSummary {
        overall_progress: "Your emotional intelligence journey shows consistent growth and self-awareness development. Continue building on these strong foundations.".to_owned(),
        key_insights: vec![
            "Demonstrates strong emotional awareness in social situations".to_owned(),
            "Shows consistent engagement patterns across different contexts".to_owned(),
            "Maintains good emotional regulation under various conditions".to_owned(),
            "Exhibits positive social interaction patterns".to_owned(),
        ],
        recommendations: vec![
            "Continue practicing mindful awareness in daily interactions".to_owned(),
            "Focus on stress management techniques during challenging conversations".to_owned(),
            "Develop active listening skills for deeper connections".to_owned(),
            "Practice emotional regulation in high-pressure situations".to_owned(),
        ],
        strengths_identified: vec![
            "High emotional awareness and recognition".to_owned(),
            "Strong social engagement capabilities".to_owned(),
            "Good emotional stability and regulation".to_owned(),
        ],
        areas_for_improvement: vec![
            "Stress response management".to_owned(),
            "Consistency across different social contexts".to_owned(),
            "Advanced micro-expression reading skills".to_owned(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn mock_facial_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let analysis = mock_facial(&mut rng);
            assert!((70..=94).contains(&analysis.confidence.get()));
            assert_eq!(analysis.analysis, "AI analysis temporarily using fallback data");
        }
    }

    #[test]
    fn mock_voice_is_fixed() {
        let voice = mock_voice();
        assert_eq!(voice.sentiment, Sentiment::Neutral);
        assert_eq!(voice.confidence.get(), 75);
        assert_eq!(voice.stress.get(), 4);
        assert_eq!(voice.engagement.get(), 6);
    }

    #[tokio::test]
    async fn canned_analyzer_always_succeeds() {
        let analyzer = CannedAnalyzer::new();
        let facial = analyzer
            .analyze_facial("ignored".to_owned())
            .await
            .expect("canned facial");
        assert!(!facial.micro_expressions.is_empty());

        let insights = analyzer
            .session_insights(SessionStats {
                emotions: vec![Emotion::Neutral],
                duration_minutes: 1.0,
                avg_confidence: 80,
                dominant_emotion: Emotion::Neutral,
                emotion_changes: 0,
            })
            .await
            .expect("canned insights");
        assert_eq!(insights.social_effectiveness.get(), 7);
        assert_eq!(insights.emotional_stability.get(), 8);
    }
}
