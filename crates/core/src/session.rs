use studio_transport::{AudioArc, Command, Status, WaveformData};

use crate::arrangement::Arrangement;
use crate::cache::ClipCache;
use crate::clip::{ClipId, ClipParams, ClipStore};
use crate::clip_ops;
use crate::error::Result;
use crate::instrument::InstrumentHandle;
use crate::keyboard::Keyboard;
use crate::mixer::{Mixer, TrackId};
use crate::note::Pitch;
use crate::timeline::Timeline;
use crate::undo::UndoManager;

const CLOCK_QUEUE_CAPACITY: usize = 64;
const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Session configuration, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub sample_rate: u32,
    pub tempo: f64,
    pub time_signature: (u32, u32),
    pub samples_per_pixel: f64,
    pub measures: u32,
    pub undo_depth: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            tempo: 120.0,
            time_signature: (4, 4),
            samples_per_pixel: 512.0,
            measures: 16,
            undo_depth: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Playing,
    Recording,
}

impl EngineState {
    /// The transport advances in both playing and recording.
    pub fn is_playing(&self) -> bool {
        matches!(self, EngineState::Playing | EngineState::Recording)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, EngineState::Recording)
    }
}

/// The session root: owns the timeline, the arrangement, the keyboard, and
/// the undo history, and speaks the clock protocol with the external
/// playback engine.
///
/// All mutation enters through methods here (or through the components it
/// hands out); the engine side only ever feeds positions in and receives
/// commands.
pub struct Session {
    timeline: Timeline,
    arrangement: Arrangement,
    keyboard: Keyboard,
    undo: UndoManager,
    state: EngineState,
    clock: rtrb::Consumer<Status>,
    clock_writer: Option<rtrb::Producer<Status>>,
    commands: rtrb::Producer<Command>,
    command_reader: Option<rtrb::Consumer<Command>>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let (clock_tx, clock_rx) = rtrb::RingBuffer::new(CLOCK_QUEUE_CAPACITY);
        let (command_tx, command_rx) = rtrb::RingBuffer::new(COMMAND_QUEUE_CAPACITY);

        Self {
            timeline: Timeline::new(
                config.sample_rate,
                config.tempo,
                config.time_signature,
                config.samples_per_pixel,
                config.measures,
            ),
            arrangement: Arrangement::new(),
            keyboard: Keyboard::new(),
            undo: UndoManager::new(config.undo_depth),
            state: EngineState::Idle,
            clock: clock_rx,
            clock_writer: Some(clock_tx),
            commands: command_tx,
            command_reader: Some(command_rx),
        }
    }

    /// The producer the playback engine pushes position updates into. Can
    /// only be taken once.
    pub fn take_clock_writer(&mut self) -> Option<rtrb::Producer<Status>> {
        self.clock_writer.take()
    }

    /// The consumer the playback engine drains commands from. Can only be
    /// taken once.
    pub fn take_command_reader(&mut self) -> Option<rtrb::Consumer<Command>> {
        self.command_reader.take()
    }

    /// Drain pending engine status into the timeline. Returns the latest
    /// position if it changed. Each poll leaves the timeline at a single
    /// consistent position; everything that timestamps against the
    /// transport reads that one snapshot.
    pub fn poll(&mut self) -> Option<u64> {
        let mut position_changed = None;
        while let Ok(status) = self.clock.pop() {
            match status {
                Status::Position(sample) => {
                    self.timeline.set_position_samples(sample);
                    position_changed = Some(sample);
                }
            }
        }
        position_changed
    }

    pub fn play(&mut self) {
        let _ = self.commands.push(Command::Play);
        self.set_state(EngineState::Playing);
    }

    /// Start recording. The transport runs while recording.
    pub fn record(&mut self) {
        let _ = self.commands.push(Command::Play);
        self.set_state(EngineState::Recording);
    }

    pub fn stop(&mut self) {
        let _ = self.commands.push(Command::Pause);
        let _ = self.commands.push(Command::Seek { sample: 0 });
        self.timeline.set_position_samples(0);
        self.set_state(EngineState::Idle);
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            tracing::info!(from = ?self.state, to = ?state, "engine state");
            self.state = state;
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Key down. Sounds on every active MIDI track; persists a pending
    /// event only while recording.
    pub fn attack(&mut self, pitch: Pitch) {
        // One transport snapshot for both timestamps derived from it
        let position = self.timeline.position_samples();
        let seconds = self.timeline.seconds();
        self.keyboard
            .attack(pitch, &self.arrangement.mixer, self.state, position, seconds);
    }

    /// Key up. Releases on every active MIDI track; closes the matching
    /// pending event only while recording.
    pub fn release(&mut self, pitch: Pitch) {
        let position = self.timeline.position_samples();
        let seconds = self.timeline.seconds();
        self.keyboard
            .release(pitch, &self.arrangement.mixer, self.state, position, seconds);
    }

    pub fn clear_recorded_events(&mut self) {
        self.keyboard.clear_recorded_events();
    }

    /// Append a new track, as one undo step.
    pub fn create_track(&mut self) -> Result<TrackId> {
        self.undo
            .with_group("create track", &mut self.arrangement, |txn| {
                Ok(txn.create_track())
            })
    }

    /// Remove a track and the clips it owns, as one undo step.
    pub fn remove_track(&mut self, track: TrackId) -> Result<()> {
        self.undo
            .with_group("remove track", &mut self.arrangement, |txn| {
                Ok(txn.remove_track(track)?)
            })
    }

    /// Create a clip on a track, as one undo step.
    pub fn create_audio_clip(&mut self, track: TrackId, params: ClipParams) -> Result<ClipId> {
        self.undo
            .with_group("create clip", &mut self.arrangement, |txn| {
                Ok(txn.create_audio_clip(track, params)?)
            })
    }

    /// Delete a clip, as one undo step. Cache entries are untouched; call
    /// [`prune_caches`] to sweep them.
    ///
    /// [`prune_caches`]: Session::prune_caches
    pub fn delete_clip(&mut self, clip: ClipId) -> Result<()> {
        self.undo
            .with_group("delete clip", &mut self.arrangement, |txn| {
                Ok(txn.delete_clip(clip)?)
            })
    }

    /// Move a clip between tracks addressed by index. See
    /// [`clip_ops::move_clip_to_new_track`].
    pub fn move_clip_to_new_track(
        &mut self,
        clip: ClipId,
        from_index: usize,
        to_index: usize,
    ) -> Result<Option<ClipId>> {
        clip_ops::move_clip_to_new_track(
            &mut self.arrangement,
            &mut self.undo,
            clip,
            from_index,
            to_index,
        )
    }

    /// Duplicate a clip onto its own track. See [`clip_ops::duplicate_clip`].
    pub fn duplicate_clip(&mut self, clip: ClipId) -> Result<Option<ClipId>> {
        clip_ops::duplicate_clip(&mut self.arrangement, &mut self.undo, clip)
    }

    /// Undo the most recent step, returning its label.
    pub fn undo(&mut self) -> Result<Option<String>> {
        self.undo.undo(&mut self.arrangement)
    }

    /// Redo the most recently undone step, returning its label.
    pub fn redo(&mut self) -> Result<Option<String>> {
        self.undo.redo(&mut self.arrangement)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Drop cache entries whose clip no longer exists.
    pub fn prune_caches(&mut self) -> usize {
        self.arrangement.prune_caches()
    }

    /// Assign an instrument to a track (routing, not an undoable edit).
    pub fn set_instrument(&mut self, track: TrackId, instrument: InstrumentHandle) -> Result<()> {
        let track_ref = self
            .arrangement
            .mixer_mut()
            .track_mut(track)
            .ok_or(crate::error::CoreError::UnknownTrack(track))?;
        track_ref.set_instrument(instrument);
        Ok(())
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    pub fn mixer(&self) -> &Mixer {
        self.arrangement.mixer()
    }

    pub fn mixer_mut(&mut self) -> &mut Mixer {
        self.arrangement.mixer_mut()
    }

    pub fn clips(&self) -> &ClipStore {
        self.arrangement.clips()
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn buffer_cache(&self) -> &ClipCache<AudioArc> {
        self.arrangement.buffer_cache()
    }

    pub fn buffer_cache_mut(&mut self) -> &mut ClipCache<AudioArc> {
        self.arrangement.buffer_cache_mut()
    }

    pub fn waveform_cache(&self) -> &ClipCache<WaveformData> {
        self.arrangement.waveform_cache()
    }

    pub fn waveform_cache_mut(&mut self) -> &mut ClipCache<WaveformData> {
        self.arrangement.waveform_cache_mut()
    }
}
