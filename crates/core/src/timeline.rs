/// Minimum rendered width for a grid subdivision to stay legible.
pub const MIN_SUBDIVISION_PX: f64 = 16.0;

/// Below this measure width the ruler only labels every fourth measure.
const COARSE_RULER_PX: f64 = 40.0;

/// Named grid subdivisions, coarse to fine. The value is how many of the
/// subdivision fit in one quarter note (a whole note is a quarter of one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subdivision {
    Whole,
    Half,
    HalfTriplet,
    Quarter,
    QuarterTriplet,
    Eighth,
    EighthTriplet,
    Sixteenth,
    SixteenthTriplet,
}

impl Subdivision {
    /// Table order, coarse to fine.
    pub const ALL: [Subdivision; 9] = [
        Subdivision::Whole,
        Subdivision::Half,
        Subdivision::HalfTriplet,
        Subdivision::Quarter,
        Subdivision::QuarterTriplet,
        Subdivision::Eighth,
        Subdivision::EighthTriplet,
        Subdivision::Sixteenth,
        Subdivision::SixteenthTriplet,
    ];

    /// How many of this subdivision fit in one quarter note.
    pub fn per_quarter(&self) -> f64 {
        match self {
            Subdivision::Whole => 0.25,
            Subdivision::Half => 0.5,
            Subdivision::HalfTriplet => 0.75,
            Subdivision::Quarter => 1.0,
            Subdivision::QuarterTriplet => 1.5,
            Subdivision::Eighth => 2.0,
            Subdivision::EighthTriplet => 3.0,
            Subdivision::Sixteenth => 4.0,
            Subdivision::SixteenthTriplet => 6.0,
        }
    }

    pub fn is_triplet(&self) -> bool {
        matches!(
            self,
            Subdivision::HalfTriplet
                | Subdivision::QuarterTriplet
                | Subdivision::EighthTriplet
                | Subdivision::SixteenthTriplet
        )
    }

    /// Length of this subdivision in samples, given the quarter-note length.
    pub fn samples(&self, quarter_note_samples: f64) -> f64 {
        quarter_note_samples / self.per_quarter()
    }
}

/// Grid quantities derived from the finest legible subdivision, consumed by
/// the timeline ruler and grid renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub subdivision: Subdivision,
    pub subdivision_px: f64,
    pub subdivisions_per_beat: f64,
    pub subdivisions_per_measure: f64,
    pub measure_px: f64,
    /// Label only every fourth measure when measures get too narrow.
    pub render_every_fourth_measure: bool,
}

/// The transport clock and its pixel mapping.
///
/// Position is authoritative here; the real-time engine feeds it through the
/// session's poll loop and everything else only reads it. Pixel conversion
/// is a pure linear map at the current zoom with consistent floor rounding,
/// so one round-trip through the grid is idempotent.
#[derive(Debug, Clone)]
pub struct Timeline {
    sample_rate: u32,
    tempo: f64,
    time_signature: (u32, u32),
    samples_per_pixel: f64,
    position_samples: u64,
    measures: u32,
}

impl Timeline {
    pub fn new(
        sample_rate: u32,
        tempo: f64,
        time_signature: (u32, u32),
        samples_per_pixel: f64,
        measures: u32,
    ) -> Self {
        assert!(sample_rate > 0, "sample_rate must be greater than 0");
        assert!(tempo > 0.0, "tempo must be greater than 0");
        assert!(
            samples_per_pixel > 0.0,
            "samples_per_pixel must be greater than 0"
        );
        Self {
            sample_rate,
            tempo,
            time_signature,
            samples_per_pixel,
            position_samples: 0,
            measures,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn time_signature(&self) -> (u32, u32) {
        self.time_signature
    }

    pub fn measures(&self) -> u32 {
        self.measures
    }

    pub fn set_measures(&mut self, measures: u32) {
        self.measures = measures;
    }

    pub fn samples_per_pixel(&self) -> f64 {
        self.samples_per_pixel
    }

    /// Change the zoom ratio. The position is unchanged; only the pixel
    /// mapping moves.
    pub fn set_samples_per_pixel(&mut self, samples_per_pixel: f64) {
        assert!(
            samples_per_pixel > 0.0,
            "samples_per_pixel must be greater than 0"
        );
        self.samples_per_pixel = samples_per_pixel;
    }

    /// Current transport position in samples.
    pub fn position_samples(&self) -> u64 {
        self.position_samples
    }

    /// Current transport position in seconds.
    pub fn seconds(&self) -> f64 {
        self.position_samples as f64 / self.sample_rate as f64
    }

    /// Current transport position in pixels at the current zoom.
    pub fn position_in_pixels(&self) -> f64 {
        self.samples_to_pixels(self.position_samples as f64)
    }

    /// Engine-driven position update (from the poll loop).
    pub(crate) fn set_position_samples(&mut self, position: u64) {
        self.position_samples = position;
    }

    /// Seek the transport to a time in seconds. Clamps below zero.
    pub fn set_seconds(&mut self, seconds: f64) {
        self.position_samples = (seconds.max(0.0) * self.sample_rate as f64).floor() as u64;
    }

    /// Seek the transport to the sample under pixel offset `x`. Clamps below
    /// zero.
    pub fn seek_pixels(&mut self, x: f64) {
        self.position_samples = self.pixels_to_samples(x);
    }

    pub fn samples_to_pixels(&self, samples: f64) -> f64 {
        samples / self.samples_per_pixel
    }

    pub fn pixels_to_samples(&self, pixels: f64) -> u64 {
        (pixels.max(0.0) * self.samples_per_pixel).floor() as u64
    }

    /// Length of one quarter note in samples at the current tempo.
    pub fn quarter_note_samples(&self) -> f64 {
        60.0 / self.tempo * self.sample_rate as f64
    }

    /// Length of one measure in samples at the current tempo and signature.
    pub fn samples_per_measure(&self) -> f64 {
        self.quarter_note_samples() * self.time_signature.0 as f64
    }

    /// Total timeline width in pixels at the current zoom.
    pub fn total_pixels(&self) -> f64 {
        self.samples_to_pixels(self.samples_per_measure() * self.measures as f64)
    }

    /// The finest plain (non-triplet) subdivision that still renders at
    /// least [`MIN_SUBDIVISION_PX`] wide, or `None` when even a whole note
    /// is too narrow at the current zoom.
    pub fn finest_subdivision(&self) -> Option<Subdivision> {
        let quarter = self.quarter_note_samples();
        Subdivision::ALL
            .iter()
            .copied()
            .filter(|s| {
                !s.is_triplet() && self.samples_to_pixels(s.samples(quarter)) >= MIN_SUBDIVISION_PX
            })
            .last()
    }

    /// Grid quantities for the current zoom, or `None` when no subdivision
    /// is legible.
    pub fn grid_layout(&self) -> Option<GridLayout> {
        let subdivision = self.finest_subdivision()?;
        let quarter = self.quarter_note_samples();
        let beat_px = self.samples_to_pixels(quarter);
        let beats_per_measure = self.time_signature.0 as f64;
        let measure_px = beat_px * beats_per_measure;

        Some(GridLayout {
            subdivision,
            subdivision_px: self.samples_to_pixels(subdivision.samples(quarter)),
            subdivisions_per_beat: subdivision.per_quarter(),
            subdivisions_per_measure: subdivision.per_quarter() * beats_per_measure,
            measure_px,
            render_every_fourth_measure: measure_px < COARSE_RULER_PX,
        })
    }
}
