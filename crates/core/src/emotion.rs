use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::SystemTime};

/// Primary emotional state categories recognised by facial analysis.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Emotion {
    Engaged,
    Focused,
    Confident,
    Neutral,
    Nervous,
    Distracted,
    Bored,
    Angry,
    Excited,
    Stressed,
}

impl Emotion {
    pub const ALL: [Emotion; 10] = [
        Emotion::Engaged,
        Emotion::Focused,
        Emotion::Confident,
        Emotion::Neutral,
        Emotion::Nervous,
        Emotion::Distracted,
        Emotion::Bored,
        Emotion::Angry,
        Emotion::Excited,
        Emotion::Stressed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Engaged => "Engaged",
            Emotion::Focused => "Focused",
            Emotion::Confident => "Confident",
            Emotion::Neutral => "Neutral",
            Emotion::Nervous => "Nervous",
            Emotion::Distracted => "Distracted",
            Emotion::Bored => "Bored",
            Emotion::Angry => "Angry",
            Emotion::Excited => "Excited",
            Emotion::Stressed => "Stressed",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown emotion: {0}")]
pub struct ParseEmotionError(pub String);

impl FromStr for Emotion {
    type Err = ParseEmotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEmotionError(s.to_owned()))
    }
}

/// Overall sentiment categories recognised by voice-tone analysis.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Stressed,
    Excited,
    Calm,
    Anxious,
}

impl Sentiment {
    pub const ALL: [Sentiment; 7] = [
        Sentiment::Positive,
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::Stressed,
        Sentiment::Excited,
        Sentiment::Calm,
        Sentiment::Anxious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Stressed => "Stressed",
            Sentiment::Excited => "Excited",
            Sentiment::Calm => "Calm",
            Sentiment::Anxious => "Anxious",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sentiment: {0}")]
pub struct ParseSentimentError(pub String);

impl FromStr for Sentiment {
    type Err = ParseSentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sentiment::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSentimentError(s.to_owned()))
    }
}

/// Confidence percentage attached to a reading.
///
/// Model-reported scores are clamped into the 70..=98 band the prompts ask
/// for; synthetic readings may carry anything up to 99.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Confidence(u8);

impl Confidence {
    pub const MODEL_MIN: u8 = 70;
    pub const MODEL_MAX: u8 = 98;

    pub fn percent(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Clamp a model-reported score into the prompt range, taking `default`
    /// when the field was absent from the reply.
    pub fn from_model(value: Option<i64>, default: u8) -> Self {
        let v = value.unwrap_or(i64::from(default));
        Self(v.clamp(i64::from(Self::MODEL_MIN), i64::from(Self::MODEL_MAX)) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Vocal stress on a 1..=10 scale.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct StressLevel(u8);

impl StressLevel {
    const DEFAULT: u8 = 5;

    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 10))
    }

    pub fn from_model(value: Option<i64>) -> Self {
        Self(value.unwrap_or(i64::from(Self::DEFAULT)).clamp(1, 10) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Engagement on a 1..=10 scale.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EngagementLevel(u8);

impl EngagementLevel {
    const DEFAULT: u8 = 6;

    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 10))
    }

    pub fn from_model(value: Option<i64>) -> Self {
        Self(value.unwrap_or(i64::from(Self::DEFAULT)).clamp(1, 10) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Generic 1..=10 score used for session-level ratings such as social
/// effectiveness and emotional stability.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 10))
    }

    pub fn from_model(value: Option<i64>, default: u8) -> Self {
        Self(value.unwrap_or(i64::from(default)).clamp(1, 10) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// One facial analysis result, stamped with the moment it was observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacialReading {
    pub emotion: Emotion,
    pub confidence: Confidence,
    pub analysis: String,
    pub micro_expressions: Vec<String>,
    pub body_language: Vec<String>,
    pub observed_at: SystemTime,
}

/// One voice-tone analysis result, stamped with the moment it was observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceReading {
    pub sentiment: Sentiment,
    pub confidence: Confidence,
    pub indicators: Vec<String>,
    pub stress: StressLevel,
    pub engagement: EngagementLevel,
    pub observed_at: SystemTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_parses_case_insensitively() {
        assert_eq!("engaged".parse::<Emotion>().expect("valid"), Emotion::Engaged);
        assert_eq!("STRESSED".parse::<Emotion>().expect("valid"), Emotion::Stressed);
        assert_eq!(" Neutral ".parse::<Emotion>().expect("valid"), Emotion::Neutral);
    }

    #[test]
    fn emotion_rejects_unknown_names() {
        let err = "Happy".parse::<Emotion>().unwrap_err();
        assert_eq!(err, ParseEmotionError("Happy".to_owned()));
    }

    #[test]
    fn emotion_display_round_trips() {
        for emotion in Emotion::ALL {
            let parsed = emotion.to_string().parse::<Emotion>().expect("round trip");
            assert_eq!(parsed, emotion);
        }
    }

    #[test]
    fn sentiment_parses_case_insensitively() {
        assert_eq!("calm".parse::<Sentiment>().expect("valid"), Sentiment::Calm);
        assert!("Cheerful".parse::<Sentiment>().is_err());
    }

    #[test]
    fn confidence_clamps_model_scores() {
        assert_eq!(Confidence::from_model(Some(120), 85).get(), 98);
        assert_eq!(Confidence::from_model(Some(12), 85).get(), 70);
        assert_eq!(Confidence::from_model(Some(87), 85).get(), 87);
        assert_eq!(Confidence::from_model(None, 85).get(), 85);
        assert_eq!(Confidence::from_model(None, 80).get(), 80);
    }

    #[test]
    fn confidence_percent_caps_at_one_hundred() {
        assert_eq!(Confidence::percent(250).get(), 100);
        assert_eq!(Confidence::percent(99).get(), 99);
    }

    #[test]
    fn levels_clamp_into_scale() {
        assert_eq!(StressLevel::from_model(Some(0)).get(), 1);
        assert_eq!(StressLevel::from_model(Some(15)).get(), 10);
        assert_eq!(StressLevel::from_model(None).get(), 5);
        assert_eq!(EngagementLevel::from_model(None).get(), 6);
        assert_eq!(Rating::from_model(None, 7).get(), 7);
        assert_eq!(Rating::new(12).get(), 10);
    }
}
