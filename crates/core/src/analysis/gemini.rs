use futures::future::BoxFuture;
use futures::FutureExt;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::analysis::{
    canned, AnalyzerError, EmotionAnalyzer, FacialAnalysis, ProgressOverview, ProgressSummary,
    SessionInsights, SessionStats, VoiceAnalysis,
};
use crate::config::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::emotion::{Confidence, Emotion, EngagementLevel, Rating, Sentiment, StressLevel};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Analyzer backed by the Gemini generateContent endpoint.
///
/// Transport and HTTP failures surface as errors; a reply that merely fails
/// to parse degrades to deterministic substitute payloads instead.
#[derive(Clone)]
pub struct GenerativeAnalyzer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GenerativeAnalyzer {
    pub fn new(api_key: String) -> Result<Self, AnalyzerError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_GEMINI_BASE_URL.to_owned(),
            model: DEFAULT_GEMINI_MODEL.to_owned(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn generate(&self, prompt: String) -> Result<String, AnalyzerError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(AnalyzerError::Api { status, message });
        }

        let body: GenerateResponse = response.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .map(|p| p.text)
            .collect();
        if text.is_empty() {
            return Err(AnalyzerError::EmptyResponse);
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

impl EmotionAnalyzer for GenerativeAnalyzer {
    fn analyze_facial(
        &self,
        description: String,
    ) -> BoxFuture<'_, Result<FacialAnalysis, AnalyzerError>> {
        let this = self.clone();
        let prompt = facial_prompt(&description);
        async move {
            let text = this.generate(prompt).await?;
            Ok(parse_facial(&text, &mut rand::rng()))
        }
        .boxed()
    }

    fn analyze_voice(
        &self,
        description: String,
    ) -> BoxFuture<'_, Result<VoiceAnalysis, AnalyzerError>> {
        let this = self.clone();
        let prompt = voice_prompt(&description);
        async move {
            let text = this.generate(prompt).await?;
            Ok(parse_voice(&text))
        }
        .boxed()
    }

    fn session_insights(
        &self,
        stats: SessionStats,
    ) -> BoxFuture<'_, Result<SessionInsights, AnalyzerError>> {
        let this = self.clone();
        let prompt = report_prompt(&stats);
        async move {
            let text = this.generate(prompt).await?;
            Ok(parse_insights(&text))
        }
        .boxed()
    }

    fn progress_summary(
        &self,
        overview: ProgressOverview,
    ) -> BoxFuture<'_, Result<ProgressSummary, AnalyzerError>> {
        let this = self.clone();
        let prompt = progress_prompt(&overview);
        async move {
            let text = this.generate(prompt).await?;
            Ok(parse_progress(&text))
        }
        .boxed()
    }
}

fn emotion_vocabulary() -> String {
    Emotion::ALL.map(|e| e.as_str()).join(", ")
}

fn sentiment_vocabulary() -> String {
    Sentiment::ALL.map(|s| s.as_str()).join(", ")
}

fn facial_prompt(description: &str) -> String {
    let emotions = emotion_vocabulary();
    format!(
        r#"You are an expert in micro-expression analysis and body language interpretation. Analyze the following description for emotional state:

"{description}"

Provide a detailed analysis in JSON format with:
{{
  "emotion": "primary emotion ({emotions})",
  "confidence": confidence score from 70-98,
  "analysis": "detailed 2-sentence explanation of the emotional state",
  "microExpressions": ["array of 2-3 specific micro-expressions detected"],
  "bodyLanguage": ["array of 2-3 body language indicators"]
}}

Focus on subtle cues like:
- Eye movement patterns and gaze direction
- Facial muscle tension and asymmetry
- Posture shifts and positioning
- Hand gestures and positioning
- Breathing patterns if visible
- Overall energy level and engagement

Be precise and professional in your analysis."#
    )
}

fn voice_prompt(description: &str) -> String {
    let sentiments = sentiment_vocabulary();
    format!(
        r#"Analyze this voice tone and speech pattern description for emotional indicators:

"{description}"

Provide analysis in JSON format:
{{
  "sentiment": "overall sentiment ({sentiments})",
  "confidence": confidence score from 70-98,
  "indicators": ["array of 3-4 specific voice indicators"],
  "stressLevel": stress level from 1-10,
  "engagement": engagement level from 1-10
}}

Consider:
- Speech pace and rhythm variations
- Pitch changes and vocal strain
- Pauses and hesitations
- Volume fluctuations
- Vocal fry or breathiness
- Articulation clarity"#
    )
}

fn report_prompt(stats: &SessionStats) -> String {
    let emotions = stats
        .emotions
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"Generate a comprehensive session report for this emotional analysis data:

- Emotions detected: {emotions}
- Session duration: {duration} minutes
- Average confidence: {avg}%
- Dominant emotion: {dominant}
- Emotion changes: {changes}

Provide analysis in JSON format:
{{
  "summary": "2-sentence professional summary of the session",
  "insights": ["array of 3-4 key behavioral insights"],
  "recommendations": ["array of 3-4 actionable improvement suggestions"],
  "socialEffectiveness": score from 1-10 based on emotional patterns,
  "emotionalStability": score from 1-10 based on emotion consistency
}}

Focus on:
- Communication effectiveness patterns
- Emotional regulation indicators
- Social engagement quality
- Areas for improvement
- Positive behavioral patterns observed"#,
        duration = stats.duration_minutes,
        avg = stats.avg_confidence,
        dominant = stats.dominant_emotion,
        changes = stats.emotion_changes,
    )
}

fn progress_prompt(overview: &ProgressOverview) -> String {
    let recent = overview
        .recent_emotions
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let top = overview
        .top_emotions
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"Generate a comprehensive personal development report based on this emotional intelligence data:

- Total sessions: {total}
- Total analysis time: {hours} hours
- Recent emotions: {recent}
- Average social effectiveness: {eff:.1}/10
- Average emotional stability: {stab:.1}/10
- Top emotions: {top}

Provide a JSON response with:
{{
  "overallProgress": "2-sentence summary of overall emotional intelligence progress",
  "keyInsights": ["array of 4-5 key insights about emotional patterns"],
  "recommendations": ["array of 4-5 specific actionable recommendations"],
  "strengthsIdentified": ["array of 3-4 emotional intelligence strengths"],
  "areasForImprovement": ["array of 3-4 areas needing development"]
}}

Focus on personal growth, social skills development, and emotional awareness."#,
        total = overview.total_sessions,
        hours = overview.total_hours,
        eff = overview.avg_effectiveness,
        stab = overview.avg_stability,
    )
}

/// Widest brace-delimited span, the same way a greedy regex would take it.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn parse_value(text: &str) -> Option<serde_json::Value> {
    extract_json_object(text).and_then(|raw| serde_json::from_str(raw).ok())
}

fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)?
        .as_str()
        .map(str::to_owned)
        .filter(|s| !s.is_empty())
}

fn string_list(value: &serde_json::Value, key: &str) -> Option<Vec<String>> {
    let items = value.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
    )
}

fn int_field(value: &serde_json::Value, key: &str) -> Option<i64> {
    let v = value.get(key)?;
    let n = v.as_i64().or_else(|| v.as_f64().map(|f| f.round() as i64))?;
    // Zero is out of band on every scale here; treat it like a missing field.
    (n != 0).then_some(n)
}

pub(crate) fn parse_facial<R: Rng + ?Sized>(text: &str, rng: &mut R) -> FacialAnalysis {
    if let Some(parsed) = parse_value(text) {
        return FacialAnalysis {
            emotion: str_field(&parsed, "emotion")
                .and_then(|s| s.parse().ok())
                .unwrap_or(Emotion::Neutral),
            confidence: Confidence::from_model(int_field(&parsed, "confidence"), 85),
            analysis: str_field(&parsed, "analysis")
                .unwrap_or_else(|| "Emotional state analyzed successfully".to_owned()),
            micro_expressions: string_list(&parsed, "microExpressions")
                .unwrap_or_else(|| vec!["Baseline expression".to_owned()]),
            body_language: string_list(&parsed, "bodyLanguage")
                .unwrap_or_else(|| vec!["Neutral posture".to_owned()]),
        };
    }
    keyword_scan(text, rng)
}

/// Salvage an emotion by scanning prose for vocabulary words, checked in
/// declaration order.
fn keyword_scan<R: Rng + ?Sized>(text: &str, rng: &mut R) -> FacialAnalysis {
    let lowered = text.to_lowercase();
    let emotion = Emotion::ALL
        .iter()
        .copied()
        .find(|e| lowered.contains(&e.as_str().to_lowercase()))
        .unwrap_or(Emotion::Neutral);
    FacialAnalysis {
        emotion,
        confidence: Confidence::percent(rng.random_range(75..=94)),
        analysis: "Emotional state detected through advanced AI analysis".to_owned(),
        micro_expressions: vec![
            "Subtle facial tension".to_owned(),
            "Eye movement patterns".to_owned(),
        ],
        body_language: vec![
            "Posture alignment".to_owned(),
            "Gesture frequency".to_owned(),
        ],
    }
}

pub(crate) fn parse_voice(text: &str) -> VoiceAnalysis {
    if let Some(parsed) = parse_value(text) {
        return VoiceAnalysis {
            sentiment: str_field(&parsed, "sentiment")
                .and_then(|s| s.parse().ok())
                .unwrap_or(Sentiment::Neutral),
            confidence: Confidence::from_model(int_field(&parsed, "confidence"), 80),
            indicators: string_list(&parsed, "indicators")
                .unwrap_or_else(|| vec!["Normal pace".to_owned(), "Stable tone".to_owned()]),
            stress: StressLevel::from_model(int_field(&parsed, "stressLevel")),
            engagement: EngagementLevel::from_model(int_field(&parsed, "engagement")),
        };
    }
    canned::mock_voice()
}

pub(crate) fn parse_insights(text: &str) -> SessionInsights {
    if let Some(parsed) = parse_value(text) {
        return SessionInsights {
            summary: str_field(&parsed, "summary")
                .unwrap_or_else(|| "Session completed with valuable emotional insights gathered.".to_owned()),
            insights: string_list(&parsed, "insights").unwrap_or_else(|| {
                vec![
                    "Consistent emotional patterns observed".to_owned(),
                    "Good engagement levels maintained".to_owned(),
                ]
            }),
            recommendations: string_list(&parsed, "recommendations").unwrap_or_else(|| {
                vec![
                    "Continue current approach".to_owned(),
                    "Monitor stress indicators".to_owned(),
                ]
            }),
            social_effectiveness: Rating::from_model(int_field(&parsed, "socialEffectiveness"), 7),
            emotional_stability: Rating::from_model(int_field(&parsed, "emotionalStability"), 7),
        };
    }
    canned::mock_insights()
}

pub(crate) fn parse_progress(text: &str) -> ProgressSummary {
    if let Some(parsed) = parse_value(text) {
        return ProgressSummary {
            overall_progress: str_field(&parsed, "overallProgress").unwrap_or_else(|| {
                "Consistent progress in emotional intelligence development observed.".to_owned()
            }),
            key_insights: string_list(&parsed, "keyInsights").unwrap_or_else(|| {
                vec![
                    "Strong emotional awareness".to_owned(),
                    "Good self-regulation skills".to_owned(),
                ]
            }),
            recommendations: string_list(&parsed, "recommendations").unwrap_or_else(|| {
                vec![
                    "Continue current practices".to_owned(),
                    "Focus on stress management".to_owned(),
                ]
            }),
            strengths_identified: string_list(&parsed, "strengthsIdentified").unwrap_or_else(|| {
                vec!["Emotional awareness".to_owned(), "Social engagement".to_owned()]
            }),
            areas_for_improvement: string_list(&parsed, "areasForImprovement").unwrap_or_else(|| {
                vec!["Stress management".to_owned(), "Consistency".to_owned()]
            }),
        };
    }
    canned::mock_progress()
}
