//! Sound cues and celebrations shown when a session completes.
//!
//! The core only describes them. Rendering (audio synthesis, confetti, a
//! terminal bell) is done by a [`Presenter`] supplied by the front end.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
}

/// One synthesized note. Times in seconds from the start of the cue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: f32,
    pub start_s: f32,
    pub duration_s: f32,
    pub peak_gain: f32,
    pub waveform: Waveform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCue {
    Chime,
    Bell,
    Digital,
}

impl SoundCue {
    pub const ALL: [SoundCue; 3] = [SoundCue::Chime, SoundCue::Bell, SoundCue::Digital];

    /// Unknown identifiers fall back to the chime.
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "bell" => SoundCue::Bell,
            "digital" => SoundCue::Digital,
            _ => SoundCue::Chime,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            SoundCue::Chime => "chime",
            SoundCue::Bell => "bell",
            SoundCue::Digital => "digital",
        }
    }

    /// The notes making up the cue.
    pub fn tones(self) -> Vec<Tone> {
        match self {
            // C5-E5-G5, staggered by 100ms
            SoundCue::Chime => [523.25_f32, 659.25, 783.99]
                .iter()
                .enumerate()
                .map(|(i, &frequency_hz)| Tone {
                    frequency_hz,
                    start_s: i as f32 * 0.1,
                    duration_s: 2.0 - i as f32 * 0.1,
                    peak_gain: 0.15,
                    waveform: Waveform::Sine,
                })
                .collect(),
            // A3 with its octave as a quieter, shorter harmonic
            SoundCue::Bell => vec![
                Tone {
                    frequency_hz: 220.0,
                    start_s: 0.0,
                    duration_s: 3.0,
                    peak_gain: 0.3,
                    waveform: Waveform::Sine,
                },
                Tone {
                    frequency_hz: 440.0,
                    start_s: 0.0,
                    duration_s: 2.0,
                    peak_gain: 0.1,
                    waveform: Waveform::Sine,
                },
            ],
            SoundCue::Digital => [(880.0_f32, 0.0_f32, 0.1_f32), (880.0, 0.15, 0.1), (1100.0, 0.3, 0.2)]
                .iter()
                .map(|&(frequency_hz, start_s, duration_s)| Tone {
                    frequency_hz,
                    start_s,
                    duration_s,
                    peak_gain: 0.08,
                    waveform: Waveform::Square,
                })
                .collect(),
        }
    }

    /// Seconds until the last note ends.
    pub fn length_s(self) -> f32 {
        self.tones()
            .iter()
            .map(|t| t.start_s + t.duration_s)
            .fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Celebration {
    Classic,
    Fireworks,
    Stars,
    Snow,
    Cannon,
    Pride,
    Explosion,
    Shower,
}

impl Celebration {
    pub const ALL: [Celebration; 8] = [
        Celebration::Classic,
        Celebration::Fireworks,
        Celebration::Stars,
        Celebration::Snow,
        Celebration::Cannon,
        Celebration::Pride,
        Celebration::Explosion,
        Celebration::Shower,
    ];

    /// Uniform pick over [`Celebration::ALL`].
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL
            .choose(rng)
            .copied()
            .unwrap_or(Celebration::Classic)
    }

    pub fn describe(self) -> &'static str {
        match self {
            Celebration::Classic => "confetti burst",
            Celebration::Fireworks => "fireworks",
            Celebration::Stars => "shooting stars",
            Celebration::Snow => "gentle snowfall",
            Celebration::Cannon => "confetti cannons",
            Celebration::Pride => "rainbow confetti",
            Celebration::Explosion => "big explosion",
            Celebration::Shower => "confetti shower",
        }
    }
}

/// Front-end hook for completion effects. Fire-and-forget: implementations
/// must not block and must swallow their own failures.
pub trait Presenter: Send + Sync {
    fn play_sound(&self, cue: SoundCue);
    fn celebrate(&self, celebration: Celebration);
}

/// Presenter that does nothing (headless use, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    fn play_sound(&self, _cue: SoundCue) {}
    fn celebrate(&self, _celebration: Celebration) {}
}
