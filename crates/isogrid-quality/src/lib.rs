//! Adaptive render-quality controller: samples frame times into a sliding
//! window and maps the moving average onto a discrete quality level with
//! hysteresis and a cooldown, so bursty load cannot make the level
//! oscillate.
#![forbid(unsafe_code)]

/// Sliding window length (frames).
const WINDOW_LEN: usize = 30;
/// A level change requires crossing its threshold by more than this (ms).
const HYSTERESIS_MS: f32 = 2.0;
/// Minimum interval between automatic level changes (ms).
const COOLDOWN_MS: f64 = 600.0;
/// Upper average-frame-time bound of each level, Ultra..Low. Anything past
/// the last bound is Potato territory.
const LEVEL_BOUNDS_MS: [f32; 4] = [14.0, 22.0, 30.0, 45.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum QualityLevel {
    Ultra,
    High,
    Medium,
    Low,
    Potato,
}

impl QualityLevel {
    pub const ALL: [QualityLevel; 5] = [
        QualityLevel::Ultra,
        QualityLevel::High,
        QualityLevel::Medium,
        QualityLevel::Low,
        QualityLevel::Potato,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            QualityLevel::Ultra => 0,
            QualityLevel::High => 1,
            QualityLevel::Medium => 2,
            QualityLevel::Low => 3,
            QualityLevel::Potato => 4,
        }
    }

    /// Precomputed settings record for this level. Window-creation knobs
    /// (`msaa_samples`) only take effect at startup; raylib cannot change
    /// the multisample count of a live window.
    #[inline]
    pub fn settings(self) -> &'static QualitySettings {
        &SETTINGS[self.index()]
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityLevel::Ultra => "ultra",
            QualityLevel::High => "high",
            QualityLevel::Medium => "medium",
            QualityLevel::Low => "low",
            QualityLevel::Potato => "potato",
        }
    }
}

/// Per-level rendering knobs consumed by the tile renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualitySettings {
    /// Tiles within this world distance of the camera target draw at
    /// high detail.
    pub lod_near: f32,
    /// Tiles beyond this distance draw at low detail.
    pub lod_far: f32,
    /// Cap on instances per frame; nearest-to-target win.
    pub max_visible_nodes: usize,
    /// Multisample count requested at window creation; 1 means off.
    pub msaa_samples: u32,
    pub textures_enabled: bool,
    /// No shadow pass exists in the raylib backend yet; the overlay
    /// reports the flag so a pinned level shows its full record.
    pub shadows_enabled: bool,
}

const SETTINGS: [QualitySettings; 5] = [
    QualitySettings {
        lod_near: 90.0,
        lod_far: 260.0,
        max_visible_nodes: 12_000,
        msaa_samples: 4,
        textures_enabled: true,
        shadows_enabled: true,
    },
    QualitySettings {
        lod_near: 80.0,
        lod_far: 220.0,
        max_visible_nodes: 8_000,
        msaa_samples: 4,
        textures_enabled: true,
        shadows_enabled: true,
    },
    QualitySettings {
        lod_near: 65.0,
        lod_far: 180.0,
        max_visible_nodes: 5_000,
        msaa_samples: 2,
        textures_enabled: true,
        shadows_enabled: false,
    },
    QualitySettings {
        lod_near: 50.0,
        lod_far: 140.0,
        max_visible_nodes: 2_500,
        msaa_samples: 1,
        textures_enabled: false,
        shadows_enabled: false,
    },
    QualitySettings {
        lod_near: 35.0,
        lod_far: 100.0,
        max_visible_nodes: 1_000,
        msaa_samples: 1,
        textures_enabled: false,
        shadows_enabled: false,
    },
];

pub struct QualityController {
    samples: [f32; WINDOW_LEN],
    sample_count: usize,
    cursor: usize,
    avg_ms: f32,
    level: QualityLevel,
    forced: Option<QualityLevel>,
    last_timestamp_ms: Option<f64>,
    last_change_ms: f64,
}

impl QualityController {
    pub fn new() -> Self {
        Self {
            samples: [0.0; WINDOW_LEN],
            sample_count: 0,
            cursor: 0,
            avg_ms: 0.0,
            level: QualityLevel::High,
            forced: None,
            last_timestamp_ms: None,
            last_change_ms: f64::MIN,
        }
    }

    /// Record one frame boundary at wall-clock `now_ms`. The inter-frame
    /// delta joins the sliding window and the level state machine runs.
    pub fn record_frame(&mut self, now_ms: f64) {
        if let Some(prev) = self.last_timestamp_ms {
            let delta = (now_ms - prev) as f32;
            if delta > 0.0 {
                self.push_sample(delta);
                self.step_level(now_ms);
            }
        }
        self.last_timestamp_ms = Some(now_ms);
    }

    fn push_sample(&mut self, delta_ms: f32) {
        self.samples[self.cursor] = delta_ms;
        self.cursor = (self.cursor + 1) % WINDOW_LEN;
        self.sample_count = (self.sample_count + 1).min(WINDOW_LEN);
        let sum: f32 = self.samples[..self.sample_count].iter().sum();
        self.avg_ms = sum / self.sample_count as f32;
    }

    fn step_level(&mut self, now_ms: f64) {
        // A very short window is noise, not a trend.
        if self.sample_count < WINDOW_LEN / 3 {
            return;
        }
        if now_ms - self.last_change_ms < COOLDOWN_MS {
            return;
        }
        let idx = self.level.index();
        // One step per change; repeated pressure walks the ladder, each
        // step gated by the cooldown.
        if idx < 4 && self.avg_ms > LEVEL_BOUNDS_MS[idx] + HYSTERESIS_MS {
            self.level = QualityLevel::ALL[idx + 1];
            self.last_change_ms = now_ms;
        } else if idx > 0 && self.avg_ms < LEVEL_BOUNDS_MS[idx - 1] - HYSTERESIS_MS {
            self.level = QualityLevel::ALL[idx - 1];
            self.last_change_ms = now_ms;
        }
    }

    /// Effective level: the user override when set, else the automatic one.
    #[inline]
    pub fn level(&self) -> QualityLevel {
        self.forced.unwrap_or(self.level)
    }

    /// Override automatic transitions until cleared with `None`.
    pub fn force_level(&mut self, level: Option<QualityLevel>) {
        self.forced = level;
    }

    #[inline]
    pub fn is_forced(&self) -> bool {
        self.forced.is_some()
    }

    #[inline]
    pub fn settings(&self) -> &'static QualitySettings {
        self.level().settings()
    }

    #[inline]
    pub fn avg_frame_ms(&self) -> f32 {
        self.avg_ms
    }

    pub fn fps(&self) -> f32 {
        if self.avg_ms > 0.0 {
            1000.0 / self.avg_ms
        } else {
            0.0
        }
    }
}

impl Default for QualityController {
    fn default() -> Self {
        Self::new()
    }
}
