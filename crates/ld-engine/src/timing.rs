//! Timing profiles for the draw timeline

use serde::{Deserialize, Serialize};

/// Timing profile for the draw timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Stage presentation: one full card flight per winner
    #[default]
    Standard,
    /// Short, back-loaded reveals (later cards take longer)
    Classic,
    /// Standard at quarter length, for rehearsing a show
    Rehearsal,
    /// Loaded from a file or scaled
    Custom,
}

/// The three legs of a winner card's flight: sphere → centre → result grid.
///
/// `total_ms` is derived once on construction:
/// `total_ms = fly_to_center_ms + show_in_center_ms + fly_to_grid_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "CardPhases", into = "CardPhases")]
pub struct CardAnimation {
    pub fly_to_center_ms: f64,
    pub show_in_center_ms: f64,
    pub fly_to_grid_ms: f64,
    total_ms: f64,
}

/// Serialized form of [`CardAnimation`] (the derived total is never stored)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct CardPhases {
    fly_to_center_ms: f64,
    show_in_center_ms: f64,
    fly_to_grid_ms: f64,
}

impl From<CardPhases> for CardAnimation {
    fn from(p: CardPhases) -> Self {
        Self::new(p.fly_to_center_ms, p.show_in_center_ms, p.fly_to_grid_ms)
    }
}

impl From<CardAnimation> for CardPhases {
    fn from(c: CardAnimation) -> Self {
        Self {
            fly_to_center_ms: c.fly_to_center_ms,
            show_in_center_ms: c.show_in_center_ms,
            fly_to_grid_ms: c.fly_to_grid_ms,
        }
    }
}

/// Keyframe offsets of the card flight, as percentages of the total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardKeyframes {
    pub fly_to_center_end: f64,
    pub show_in_center_end: f64,
    pub total: f64,
}

impl CardAnimation {
    pub fn new(fly_to_center_ms: f64, show_in_center_ms: f64, fly_to_grid_ms: f64) -> Self {
        Self {
            fly_to_center_ms,
            show_in_center_ms,
            fly_to_grid_ms,
            total_ms: fly_to_center_ms + show_in_center_ms + fly_to_grid_ms,
        }
    }

    /// 500 + 1000 + 1000 ms
    pub fn standard() -> Self {
        Self::new(500.0, 1000.0, 1000.0)
    }

    /// 150 + 200 + 150 ms
    pub fn brief() -> Self {
        Self::new(150.0, 200.0, 150.0)
    }

    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.fly_to_center_ms * factor,
            self.show_in_center_ms * factor,
            self.fly_to_grid_ms * factor,
        )
    }

    /// Keyframe percentages, rounded to one decimal like CSS keyframe selectors
    pub fn keyframes(&self) -> CardKeyframes {
        let pct = |ms: f64| {
            if self.total_ms <= 0.0 {
                100.0
            } else {
                (ms / self.total_ms * 1000.0).round() / 10.0
            }
        };
        CardKeyframes {
            fly_to_center_end: pct(self.fly_to_center_ms),
            show_in_center_end: pct(self.fly_to_center_ms + self.show_in_center_ms),
            total: 100.0,
        }
    }
}

impl Default for CardAnimation {
    fn default() -> Self {
        Self::standard()
    }
}

/// Result-modal pacing once a draw has completed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealFlow {
    /// Delay after the modal opens before the first card flips (ms)
    pub flip_delay_ms: f64,
    /// Gap between consecutive card flips in the modal (ms)
    pub flip_interval_ms: f64,
}

impl RevealFlow {
    /// When card `index` flips, relative to the modal opening
    pub fn flip_at(&self, index: usize) -> f64 {
        self.flip_delay_ms + index as f64 * self.flip_interval_ms
    }

    /// When the last of `count` cards has flipped
    pub fn flips_done_at(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        self.flip_at(count - 1)
    }
}

impl Default for RevealFlow {
    fn default() -> Self {
        Self {
            flip_delay_ms: 300.0,
            flip_interval_ms: 120.0,
        }
    }
}

/// Detailed timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Rolling time before the first reveal, independent of winner count (ms)
    pub pre_roll_ms: f64,

    /// Gap after each reveal before the next one starts (ms).
    /// Never shorter than one card flight, so flights never overlap.
    pub reveal_base_delay_ms: f64,

    /// Extra gap spread across the reveal order (ms); winner `i` of `n` waits
    /// `base + (i / n) * span`
    pub reveal_span_ms: f64,

    /// Pause between the last reveal and the result (ms)
    pub reveal_buffer_ms: f64,

    /// Card flight legs
    pub card: CardAnimation,
}

impl TimingConfig {
    /// Stage presentation timing.
    /// `reveal_base_delay_ms = card.total_ms()` (strictly serial flights).
    pub fn standard() -> Self {
        let card = CardAnimation::standard();
        Self {
            profile: TimingProfile::Standard,
            pre_roll_ms: 5000.0,
            reveal_base_delay_ms: card.total_ms(),
            reveal_span_ms: 0.0,
            reveal_buffer_ms: 500.0,
            card,
        }
    }

    /// Short reveals that stretch toward the end of the order
    pub fn classic() -> Self {
        let card = CardAnimation::brief();
        Self {
            profile: TimingProfile::Classic,
            pre_roll_ms: 1500.0,
            reveal_base_delay_ms: card.total_ms(),
            reveal_span_ms: 800.0,
            reveal_buffer_ms: 1000.0,
            card,
        }
    }

    /// Standard timing at quarter length
    pub fn rehearsal() -> Self {
        Self {
            profile: TimingProfile::Rehearsal,
            ..Self::standard().scaled(0.25)
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Standard => Self::standard(),
            TimingProfile::Classic => Self::classic(),
            TimingProfile::Rehearsal => Self::rehearsal(),
            TimingProfile::Custom => Self::standard(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            profile: TimingProfile::Custom,
            pre_roll_ms: self.pre_roll_ms * factor,
            reveal_base_delay_ms: self.reveal_base_delay_ms * factor,
            reveal_span_ms: self.reveal_span_ms * factor,
            reveal_buffer_ms: self.reveal_buffer_ms * factor,
            card: self.card.scaled(factor),
        }
    }

    /// Wait after revealing winner `index` of `count`
    pub fn reveal_delay_ms(&self, index: usize, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let progress = index as f64 / count as f64;
        self.reveal_base_delay_ms + progress * self.reveal_span_ms
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::standard()
    }
}
