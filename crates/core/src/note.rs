use std::fmt;

/// The twelve pitch classes of the chromatic scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    pub fn name(&self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete pitch: pitch class plus octave.
///
/// Equality is on the full (class, octave) pair, so `C4` and `C5` are
/// distinct notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub class: PitchClass,
    pub octave: i8,
}

impl Pitch {
    pub fn new(class: PitchClass, octave: i8) -> Self {
        Self { class, octave }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.octave)
    }
}

/// A note event quantized to transport time.
///
/// An open event (no `off_sample`) is a key currently held down; a closed
/// event is a finished note. Timestamps are transport sample positions, not
/// wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub pitch: Pitch,
    pub on_sample: u64,
    pub off_sample: Option<u64>,
}

impl NoteEvent {
    /// Open a new event at the given transport position.
    pub fn open(pitch: Pitch, on_sample: u64) -> Self {
        Self {
            pitch,
            on_sample,
            off_sample: None,
        }
    }

    /// Close this event at the given transport position.
    pub fn close(self, off_sample: u64) -> Self {
        Self {
            off_sample: Some(off_sample),
            ..self
        }
    }

    pub fn is_open(&self) -> bool {
        self.off_sample.is_none()
    }
}
