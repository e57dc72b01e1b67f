use chrono::{DateTime, Datelike, Local, Timelike, Weekday};
use rand::Rng;
use std::time::SystemTime;

use crate::emotion::{
    Confidence, Emotion, EngagementLevel, FacialReading, Sentiment, StressLevel, VoiceReading,
};

/// Produces the scene descriptions fed to an analyzer, plus the synthetic
/// readings substituted when analysis fails.
pub trait ObservationSource: Send {
    fn facial_description(&mut self) -> String;
    fn voice_description(&mut self) -> String;
    fn fallback_facial(&mut self, observed_at: SystemTime) -> FacialReading;
    fn fallback_voice(&mut self, observed_at: SystemTime) -> VoiceReading;
}

/// Default source backed by the wall clock and thread-local randomness.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntheticObserver;

impl ObservationSource for SyntheticObserver {
    fn facial_description(&mut self) -> String {
        facial_description(Local::now(), &mut rand::rng())
    }

    fn voice_description(&mut self) -> String {
        voice_description(&mut rand::rng())
    }

    fn fallback_facial(&mut self, observed_at: SystemTime) -> FacialReading {
        fallback_facial(Local::now(), &mut rand::rng(), observed_at)
    }

    fn fallback_voice(&mut self, observed_at: SystemTime) -> VoiceReading {
        fallback_voice(&mut rand::rng(), observed_at)
    }
}

const BASE_FACIAL_DESCRIPTIONS: [&str; 6] = [
    "Person maintaining steady eye contact with slight forward lean, eyebrows relaxed, subtle smile indicating genuine engagement and active listening",
    "Individual showing micro-expressions of concentration - slight furrow between brows, focused gaze, minimal blinking, suggesting deep cognitive processing",
    "Subject displaying confident posture with shoulders back, direct gaze, relaxed facial muscles, and open hand gestures indicating self-assurance",
    "Person exhibiting neutral baseline expression with occasional eye movements, standard breathing pattern, and balanced facial symmetry",
    "Individual showing subtle stress indicators - slight jaw tension, increased blink rate, fidgeting hands, suggesting mild anxiety or nervousness",
    "Subject appearing distracted with wandering gaze, reduced facial animation, slumped posture, indicating decreased attention or boredom",
];

const EVENING_FACIAL_DESCRIPTIONS: [&str; 2] = [
    "Person showing signs of fatigue with heavy eyelids, slower facial responses, and reduced energy in expressions",
    "Individual displaying end-of-day tiredness with subtle yawning, relaxed posture, and decreased alertness",
];

const MORNING_FACIAL_DESCRIPTIONS: [&str; 2] = [
    "Subject showing morning alertness with bright eyes, animated expressions, and energetic body language",
    "Person displaying fresh engagement with quick responses, attentive posture, and active facial expressions",
];

const VOICE_DESCRIPTIONS: [&str; 6] = [
    "Speaker using moderate pace with clear articulation, stable pitch range, and confident tone suggesting engagement and comfort",
    "Voice showing slight tension with faster speech rate, higher pitch variations, and occasional hesitations indicating mild stress",
    "Individual speaking with slow, measured pace, lower pitch, and calm tone suggesting relaxation or contemplation",
    "Speaker exhibiting animated vocal patterns with varied pitch, energetic pace, and expressive intonation indicating excitement",
    "Voice displaying monotone quality with reduced inflection, slower pace, and flat delivery suggesting disengagement or fatigue",
    "Individual using precise articulation with controlled pace, steady volume, and professional tone indicating focus and preparation",
];

/// Pick a plausible facial-scene description. Early and late hours widen the
/// pool with alertness or fatigue variants.
pub fn facial_description<R: Rng + ?Sized>(now: DateTime<Local>, rng: &mut R) -> String {
    let mut pool: Vec<&str> = BASE_FACIAL_DESCRIPTIONS.to_vec();
    if now.hour() > 17 {
        pool.extend(EVENING_FACIAL_DESCRIPTIONS);
    }
    if now.hour() < 10 {
        pool.extend(MORNING_FACIAL_DESCRIPTIONS);
    }
    pool[rng.random_range(0..pool.len())].to_owned()
}

pub fn voice_description<R: Rng + ?Sized>(rng: &mut R) -> String {
    VOICE_DESCRIPTIONS[rng.random_range(0..VOICE_DESCRIPTIONS.len())].to_owned()
}

/// Weight the substitute emotion by time of day, then day of week.
pub fn contextual_emotion<R: Rng + ?Sized>(now: DateTime<Local>, rng: &mut R) -> Emotion {
    let pool: &[Emotion] = if now.hour() < 10 {
        &[
            Emotion::Focused,
            Emotion::Engaged,
            Emotion::Neutral,
            Emotion::Confident,
        ]
    } else if now.hour() > 17 {
        &[
            Emotion::Neutral,
            Emotion::Distracted,
            Emotion::Bored,
            Emotion::Stressed,
        ]
    } else if now.weekday() == Weekday::Mon {
        &[Emotion::Focused, Emotion::Stressed, Emotion::Neutral]
    } else if now.weekday() == Weekday::Fri {
        &[Emotion::Engaged, Emotion::Excited, Emotion::Confident]
    } else {
        &[
            Emotion::Engaged,
            Emotion::Focused,
            Emotion::Confident,
            Emotion::Neutral,
            Emotion::Nervous,
            Emotion::Distracted,
        ]
    };
    pool[rng.random_range(0..pool.len())]
}

pub fn fallback_facial<R: Rng + ?Sized>(
    now: DateTime<Local>,
    rng: &mut R,
    observed_at: SystemTime,
) -> FacialReading {
    FacialReading {
        emotion: contextual_emotion(now, rng),
        confidence: Confidence::percent(rng.random_range(70..=94)),
        analysis: "Analyzing facial expressions and micro-movements".to_owned(),
        micro_expressions: vec!["Subtle eye tension".to_owned(), "Lip compression".to_owned()],
        body_language: vec!["Forward lean".to_owned(), "Open posture".to_owned()],
        observed_at,
    }
}

pub fn fallback_voice<R: Rng + ?Sized>(rng: &mut R, observed_at: SystemTime) -> VoiceReading {
    VoiceReading {
        sentiment: Sentiment::Neutral,
        confidence: Confidence::percent(rng.random_range(75..=94)),
        indicators: vec!["Steady pace".to_owned(), "Clear tone".to_owned()],
        stress: StressLevel::new(rng.random_range(3..=6)),
        engagement: EngagementLevel::new(rng.random_range(5..=8)),
        observed_at,
    }
}
