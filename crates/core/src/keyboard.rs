use crate::mixer::Mixer;
use crate::note::{NoteEvent, Pitch, PitchClass};
use crate::session::EngineState;

/// Converts key attacks and releases into quantized note events.
///
/// Dispatch to instruments happens in every state so the player always hears
/// what they play; events are only persisted while recording. Timestamps are
/// taken by the caller as a single transport snapshot and passed in, so a
/// note's on and off can never come from two different clock reads.
#[derive(Debug)]
pub struct Keyboard {
    base_octave: i8,
    /// Open events awaiting a matching release, in attack order.
    pending: Vec<NoteEvent>,
    /// Finalized on/off pairs, in completion order.
    recorded: Vec<NoteEvent>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            base_octave: 3,
            pending: Vec::new(),
            recorded: Vec::new(),
        }
    }

    pub fn base_octave(&self) -> i8 {
        self.base_octave
    }

    pub fn set_base_octave(&mut self, octave: i8) {
        self.base_octave = octave;
    }

    /// Resolve a bare pitch class against the keyboard's base octave.
    pub fn pitch(&self, class: PitchClass) -> Pitch {
        Pitch::new(class, self.base_octave)
    }

    pub fn pending(&self) -> &[NoteEvent] {
        &self.pending
    }

    pub fn recorded(&self) -> &[NoteEvent] {
        &self.recorded
    }

    /// Key down: sound the note on every active MIDI track, and open a
    /// pending event if recording.
    pub fn attack(
        &mut self,
        pitch: Pitch,
        mixer: &Mixer,
        state: EngineState,
        position_samples: u64,
        now_seconds: f64,
    ) {
        for track in mixer.active_midi_tracks() {
            track.instrument().trigger_attack(pitch, now_seconds);
        }

        if state == EngineState::Recording {
            tracing::debug!(pitch = %pitch, on = position_samples, "note on");
            self.pending.push(NoteEvent::open(pitch, position_samples));
        }
    }

    /// Key up: release the note on every active MIDI track, and close the
    /// first-inserted pending event for this pitch if recording.
    ///
    /// When not recording, a matching pending event is deliberately left
    /// open; release is then a pure playback action.
    pub fn release(
        &mut self,
        pitch: Pitch,
        mixer: &Mixer,
        state: EngineState,
        position_samples: u64,
        now_seconds: f64,
    ) {
        for track in mixer.active_midi_tracks() {
            track.instrument().trigger_release(pitch, now_seconds);
        }

        if let Some(index) = self.pending.iter().position(|e| e.pitch == pitch) {
            if state == EngineState::Recording {
                let event = self.pending.remove(index);
                tracing::debug!(pitch = %pitch, off = position_samples, "note off");
                self.recorded.push(event.close(position_samples));
            }
        }
    }

    /// Drop everything recorded so far, held keys included. Used when
    /// starting a fresh take.
    pub fn clear_recorded_events(&mut self) {
        self.pending.clear();
        self.recorded.clear();
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}
