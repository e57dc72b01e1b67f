mod dataset;

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::analysis::ProgressSummary;
use crate::emotion::{Confidence, Emotion, EngagementLevel, Rating, Sentiment, StressLevel};

pub use dataset::{analytics_for, demo_archive, demo_sessions, progress_overview};

/// Output flavors an archive can be rendered to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Report,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "vibe-ai-data.json",
            ExportFormat::Csv => "vibe-ai-sessions.csv",
            ExportFormat::Report => "vibe-ai-report.md",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Report => "text/markdown",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Report => "report",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "report" | "md" | "markdown" => Ok(ExportFormat::Report),
            _ => Err(ExportError::UnknownFormat(s.to_owned())),
        }
    }
}

/// Everything one export carries.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportArchive {
    pub user: ExportUser,
    pub sessions: Vec<SessionRecord>,
    pub analytics: Analytics,
    pub summary: ProgressSummary,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportUser {
    pub name: String,
    pub email: String,
    pub export_date: DateTime<Local>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub date: DateTime<Local>,
    /// Minutes.
    pub duration: u32,
    pub emotions: Vec<EmotionSample>,
    pub voice_analysis: Vec<VoiceSample>,
    pub summary: SessionDigest,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSample {
    pub emotion: Emotion,
    pub confidence: Confidence,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub analysis: String,
    pub micro_expressions: Vec<String>,
    pub body_language: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSample {
    pub sentiment: Sentiment,
    pub confidence: Confidence,
    pub indicators: Vec<String>,
    pub stress_level: StressLevel,
    pub engagement: EngagementLevel,
    pub timestamp: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDigest {
    pub dominant_emotion: Emotion,
    pub avg_confidence: Confidence,
    pub emotion_changes: u32,
    pub social_effectiveness: Rating,
    pub emotional_stability: Rating,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_sessions: usize,
    /// Minutes across all sessions.
    pub total_duration: u32,
    pub avg_session_duration: f64,
    pub emotion_distribution: BTreeMap<Emotion, usize>,
    pub confidence_over_time: Vec<TrendPoint>,
    pub improvement_trends: Trends,
}

/// One point on the oldest-to-newest confidence curve.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    pub confidence: Confidence,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub social_effectiveness: Vec<Rating>,
    pub emotional_stability: Vec<Rating>,
    pub dates: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("could not encode archive: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown export format: {0}")]
    UnknownFormat(String),
}

pub fn render(archive: &ExportArchive, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => render_json(archive),
        ExportFormat::Csv => Ok(render_csv(archive)),
        ExportFormat::Report => Ok(render_report(archive)),
    }
}

pub fn render_json(archive: &ExportArchive) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(archive)?)
}

/// One row per session under a fixed header.
pub fn render_csv(archive: &ExportArchive) -> String {
    let mut csv = String::from(
        "Date,Duration (min),Dominant Emotion,Avg Confidence,Social Effectiveness,Emotional Stability,Emotion Changes\n",
    );
    for session in &archive.sessions {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            session.date.format("%Y-%m-%d"),
            session.duration,
            session.summary.dominant_emotion,
            session.summary.avg_confidence.get(),
            session.summary.social_effectiveness.get(),
            session.summary.emotional_stability.get(),
            session.summary.emotion_changes,
        ));
    }
    csv
}

/// Render the archive as a Markdown report.
pub fn render_report(archive: &ExportArchive) -> String {
    let mut output = String::new();

    output.push_str("# vibe AI - Personal Emotional Intelligence Report\n");
    output.push_str(&format!(
        "**Generated on:** {}\n",
        archive.user.export_date.format("%Y-%m-%d")
    ));
    output.push_str(&format!("**User:** {}\n\n", archive.user.name));

    output.push_str("## Executive Summary\n");
    output.push_str(&archive.summary.overall_progress);
    output.push_str("\n\n");

    output.push_str(&analytics_section(&archive.analytics));
    output.push_str(&bullet_section("Key Insights", &archive.summary.key_insights));
    output.push_str(&bullet_section(
        "Identified Strengths",
        &archive.summary.strengths_identified,
    ));
    output.push_str(&bullet_section(
        "Areas for Improvement",
        &archive.summary.areas_for_improvement,
    ));
    output.push_str(&bullet_section(
        "Recommendations",
        &archive.summary.recommendations,
    ));
    output.push_str(&history_section(&archive.sessions));

    output.push_str("---\n");
    output.push_str(
        "*This report was generated by vibe AI - Your Personal Emotional Intelligence Assistant*\n",
    );

    output
}

fn analytics_section(analytics: &Analytics) -> String {
    let mut section = String::new();
    section.push_str("## Analytics Overview\n");
    section.push_str(&format!(
        "- **Total Sessions:** {}\n",
        analytics.total_sessions
    ));
    section.push_str(&format!(
        "- **Total Analysis Time:** {} hours\n",
        whole_hours(analytics.total_duration)
    ));
    section.push_str(&format!(
        "- **Average Session Duration:** {} minutes\n\n",
        analytics.avg_session_duration
    ));
    section
}

fn bullet_section(title: &str, items: &[String]) -> String {
    let mut section = String::new();
    section.push_str(&format!("## {title}\n"));
    for item in items {
        section.push_str(&format!("• {item}\n"));
    }
    section.push('\n');
    section
}

/// Most recent ten sessions.
fn history_section(sessions: &[SessionRecord]) -> String {
    let mut section = String::new();
    section.push_str("## Session History\n");
    for session in sessions.iter().take(10) {
        section.push_str(&format!(
            "\n**{}** - {} minutes\n",
            session.date.format("%Y-%m-%d"),
            session.duration
        ));
        section.push_str(&format!(
            "- Dominant Emotion: {}\n",
            session.summary.dominant_emotion
        ));
        section.push_str(&format!(
            "- Average Confidence: {}%\n",
            session.summary.avg_confidence.get()
        ));
        section.push_str(&format!(
            "- Social Effectiveness: {}/10\n",
            session.summary.social_effectiveness.get()
        ));
    }
    section.push('\n');
    section
}

pub(crate) fn whole_hours(minutes: u32) -> u32 {
    (f64::from(minutes) / 60.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, d, 12, 0, 0)
            .single()
            .expect("valid local time")
    }

    fn sample_session(d: u32, emotion: Emotion) -> SessionRecord {
        SessionRecord {
            id: format!("session_{d}"),
            date: day(d),
            duration: 12,
            emotions: vec![EmotionSample {
                emotion,
                confidence: Confidence::percent(82),
                timestamp: day(d).timestamp_millis(),
                analysis: "steady".to_owned(),
                micro_expressions: vec!["Relaxed brow".to_owned()],
                body_language: vec!["Open posture".to_owned()],
            }],
            voice_analysis: vec![VoiceSample {
                sentiment: Sentiment::Calm,
                confidence: Confidence::percent(80),
                indicators: vec!["Steady pace".to_owned()],
                stress_level: StressLevel::new(3),
                engagement: EngagementLevel::new(6),
                timestamp: day(d).timestamp_millis(),
            }],
            summary: SessionDigest {
                dominant_emotion: emotion,
                avg_confidence: Confidence::percent(82),
                emotion_changes: 2,
                social_effectiveness: Rating::new(8),
                emotional_stability: Rating::new(7),
            },
            insights: vec!["Maintained focus".to_owned()],
            recommendations: vec!["Keep practicing".to_owned()],
        }
    }

    fn sample_archive() -> ExportArchive {
        let sessions = vec![
            sample_session(8, Emotion::Engaged),
            sample_session(6, Emotion::Focused),
        ];
        let analytics = Analytics {
            total_sessions: 2,
            total_duration: 24,
            avg_session_duration: 12.0,
            emotion_distribution: [(Emotion::Engaged, 1), (Emotion::Focused, 1)]
                .into_iter()
                .collect(),
            confidence_over_time: vec![
                TrendPoint {
                    date: "2024-03-06".to_owned(),
                    confidence: Confidence::percent(82),
                },
                TrendPoint {
                    date: "2024-03-08".to_owned(),
                    confidence: Confidence::percent(82),
                },
            ],
            improvement_trends: Trends {
                social_effectiveness: vec![Rating::new(8), Rating::new(8)],
                emotional_stability: vec![Rating::new(7), Rating::new(7)],
                dates: vec!["2024-03-06".to_owned(), "2024-03-08".to_owned()],
            },
        };
        ExportArchive {
            user: ExportUser {
                name: "John Doe".to_owned(),
                email: "john.doe@example.com".to_owned(),
                export_date: day(9),
            },
            sessions,
            analytics,
            summary: crate::analysis::ProgressSummary {
                overall_progress: "Steady growth across sessions.".to_owned(),
                key_insights: vec!["Consistent engagement".to_owned()],
                recommendations: vec!["Keep a regular schedule".to_owned()],
                strengths_identified: vec!["Awareness".to_owned()],
                areas_for_improvement: vec!["Stress handling".to_owned()],
            },
        }
    }

    #[test]
    fn format_names_and_mime_types() {
        assert_eq!(ExportFormat::Json.file_name(), "vibe-ai-data.json");
        assert_eq!(ExportFormat::Csv.file_name(), "vibe-ai-sessions.csv");
        assert_eq!(ExportFormat::Report.file_name(), "vibe-ai-report.md");
        assert_eq!(ExportFormat::Json.mime_type(), "application/json");
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
        assert_eq!(ExportFormat::Report.mime_type(), "text/markdown");
    }

    #[test]
    fn format_parses_common_spellings() {
        assert_eq!("json".parse::<ExportFormat>().expect("valid"), ExportFormat::Json);
        assert_eq!("CSV".parse::<ExportFormat>().expect("valid"), ExportFormat::Csv);
        assert_eq!("markdown".parse::<ExportFormat>().expect("valid"), ExportFormat::Report);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn csv_keeps_fixed_header_and_one_row_per_session() {
        let csv = render_csv(&sample_archive());
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Date,Duration (min),Dominant Emotion,Avg Confidence,Social Effectiveness,Emotional Stability,Emotion Changes")
        );
        assert_eq!(lines.next(), Some("2024-03-08,12,Engaged,82,8,7,2"));
        assert_eq!(lines.next(), Some("2024-03-06,12,Focused,82,8,7,2"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json = render_json(&sample_archive()).expect("encodes");
        assert!(json.contains("\"exportDate\""));
        assert!(json.contains("\"voiceAnalysis\""));
        assert!(json.contains("\"stressLevel\""));
        assert!(json.contains("\"microExpressions\""));
        assert!(json.contains("\"emotionDistribution\""));
        assert!(json.contains("\"overallProgress\""));
        assert!(json.contains("\"strengthsIdentified\""));
        assert!(json.contains("\"areasForImprovement\""));
    }

    #[test]
    fn report_contains_every_section() {
        let report = render_report(&sample_archive());
        assert!(report.starts_with("# vibe AI - Personal Emotional Intelligence Report\n"));
        assert!(report.contains("**Generated on:** 2024-03-09"));
        assert!(report.contains("**User:** John Doe"));
        assert!(report.contains("## Executive Summary\nSteady growth across sessions."));
        assert!(report.contains("## Analytics Overview"));
        assert!(report.contains("- **Total Sessions:** 2"));
        assert!(report.contains("- **Total Analysis Time:** 0 hours"));
        assert!(report.contains("## Key Insights\n• Consistent engagement"));
        assert!(report.contains("## Identified Strengths\n• Awareness"));
        assert!(report.contains("## Areas for Improvement\n• Stress handling"));
        assert!(report.contains("## Recommendations\n• Keep a regular schedule"));
        assert!(report.contains("## Session History"));
        assert!(report.contains("**2024-03-08** - 12 minutes"));
        assert!(report.contains("- Average Confidence: 82%"));
        assert!(report.ends_with(
            "*This report was generated by vibe AI - Your Personal Emotional Intelligence Assistant*\n"
        ));
    }

    #[test]
    fn report_caps_history_at_ten_sessions() {
        let mut archive = sample_archive();
        archive.sessions = (1..=12).map(|d| sample_session(d, Emotion::Neutral)).collect();
        let report = render_report(&archive);
        assert!(report.contains("**2024-03-10**"));
        assert!(!report.contains("**2024-03-11**"));
    }

    #[test]
    fn whole_hours_rounds_to_nearest() {
        assert_eq!(whole_hours(910), 15);
        assert_eq!(whole_hours(89), 1);
        assert_eq!(whole_hours(91), 2);
    }
}
