pub(crate) mod canned;
mod gemini;

use futures::future::BoxFuture;
use serde::Serialize;
use std::time::SystemTime;

use crate::emotion::{
    Confidence, Emotion, EngagementLevel, FacialReading, Rating, Sentiment, StressLevel,
    VoiceReading,
};

pub use canned::CannedAnalyzer;
pub use gemini::GenerativeAnalyzer;

/// Facial analysis result before it is stamped into a reading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacialAnalysis {
    pub emotion: Emotion,
    pub confidence: Confidence,
    pub analysis: String,
    pub micro_expressions: Vec<String>,
    pub body_language: Vec<String>,
}

impl FacialAnalysis {
    pub fn into_reading(self, observed_at: SystemTime) -> FacialReading {
        FacialReading {
            emotion: self.emotion,
            confidence: self.confidence,
            analysis: self.analysis,
            micro_expressions: self.micro_expressions,
            body_language: self.body_language,
            observed_at,
        }
    }
}

/// Voice-tone analysis result before it is stamped into a reading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceAnalysis {
    pub sentiment: Sentiment,
    pub confidence: Confidence,
    pub indicators: Vec<String>,
    pub stress: StressLevel,
    pub engagement: EngagementLevel,
}

impl VoiceAnalysis {
    pub fn into_reading(self, observed_at: SystemTime) -> VoiceReading {
        VoiceReading {
            sentiment: self.sentiment,
            confidence: self.confidence,
            indicators: self.indicators,
            stress: self.stress,
            engagement: self.engagement,
            observed_at,
        }
    }
}

/// Aggregate numbers describing one finished session, fed to the
/// session-report operation.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionStats {
    pub emotions: Vec<Emotion>,
    pub duration_minutes: f64,
    pub avg_confidence: u8,
    pub dominant_emotion: Emotion,
    pub emotion_changes: usize,
}

/// Narrative report for a single session.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionInsights {
    pub summary: String,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub social_effectiveness: Rating,
    pub emotional_stability: Rating,
}

/// Cross-session numbers fed to the personal-development operation.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressOverview {
    pub total_sessions: usize,
    pub total_hours: u64,
    pub recent_emotions: Vec<Emotion>,
    pub avg_effectiveness: f64,
    pub avg_stability: f64,
    pub top_emotions: Vec<Emotion>,
}

/// Long-range personal development summary included in exports.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub overall_progress: String,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub strengths_identified: Vec<String>,
    pub areas_for_improvement: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum AnalyzerError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("model returned no text")]
    EmptyResponse,
}

/// Turns scene descriptions and session numbers into structured analysis.
pub trait EmotionAnalyzer: Send + Sync {
    fn analyze_facial(
        &self,
        description: String,
    ) -> BoxFuture<'_, Result<FacialAnalysis, AnalyzerError>>;

    fn analyze_voice(
        &self,
        description: String,
    ) -> BoxFuture<'_, Result<VoiceAnalysis, AnalyzerError>>;

    fn session_insights(
        &self,
        stats: SessionStats,
    ) -> BoxFuture<'_, Result<SessionInsights, AnalyzerError>>;

    fn progress_summary(
        &self,
        overview: ProgressOverview,
    ) -> BoxFuture<'_, Result<ProgressSummary, AnalyzerError>>;
}
