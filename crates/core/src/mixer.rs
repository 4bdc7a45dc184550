use std::fmt;
use std::sync::Arc;

use crate::clip::ClipId;
use crate::instrument::{InstrumentHandle, NullInstrument};

/// Unique identifier for tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input routing for a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Midi,
    Mic,
}

pub const DEFAULT_LANE_HEIGHT: f32 = 80.0;

/// A track: an ordered, routable container of clips.
///
/// Fields are only mutated through methods so the owning-track invariant
/// (clip id list vs. clip entity `track_id`) stays in the arrangement's
/// hands.
#[derive(Clone)]
pub struct Track {
    id: TrackId,
    active: bool,
    input: InputSource,
    lane_height: f32,
    instrument: InstrumentHandle,
    clip_ids: Vec<ClipId>,
}

impl Track {
    fn new(id: TrackId) -> Self {
        Self {
            id,
            active: true,
            input: InputSource::Midi,
            lane_height: DEFAULT_LANE_HEIGHT,
            instrument: Arc::new(NullInstrument),
            clip_ids: Vec::new(),
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn input(&self) -> InputSource {
        self.input
    }

    pub fn set_input(&mut self, input: InputSource) {
        self.input = input;
    }

    pub fn lane_height(&self) -> f32 {
        self.lane_height
    }

    pub fn set_lane_height(&mut self, lane_height: f32) {
        self.lane_height = lane_height;
    }

    pub fn instrument(&self) -> &InstrumentHandle {
        &self.instrument
    }

    pub fn set_instrument(&mut self, instrument: InstrumentHandle) {
        self.instrument = instrument;
    }

    /// Ids of the clips placed on this track, in placement order.
    pub fn clip_ids(&self) -> &[ClipId] {
        &self.clip_ids
    }

    pub(crate) fn attach_clip_at(&mut self, index: usize, id: ClipId) {
        let index = index.min(self.clip_ids.len());
        self.clip_ids.insert(index, id);
    }

    /// Detach a clip id, returning the list position it held.
    pub(crate) fn detach_clip(&mut self, id: ClipId) -> Option<usize> {
        let index = self.clip_ids.iter().position(|&c| c == id)?;
        self.clip_ids.remove(index);
        Some(index)
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("input", &self.input)
            .field("lane_height", &self.lane_height)
            .field("clip_ids", &self.clip_ids)
            .finish()
    }
}

/// Ordered registry of tracks. Observable order is append order.
#[derive(Debug, Default)]
pub struct Mixer {
    tracks: Vec<Track>,
    next_id: u64,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new track with default routing and instrument.
    pub fn create_track(&mut self) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        self.tracks.push(Track::new(id));
        tracing::info!(track = %id, "created track");
        id
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn track_at(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn index_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Tracks that receive keyboard input: active with MIDI routing, in
    /// registry order.
    pub fn active_midi_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks
            .iter()
            .filter(|t| t.active && t.input == InputSource::Midi)
    }

    /// Combined height of all lanes, used by the rendering layer to size the
    /// playhead.
    pub fn top_panel_height(&self) -> f32 {
        self.tracks.iter().map(|t| t.lane_height).sum()
    }

    /// Re-insert a previously removed track at its old position (undo of a
    /// removal).
    pub(crate) fn insert_track_at(&mut self, index: usize, track: Track) {
        let index = index.min(self.tracks.len());
        self.tracks.insert(index, track);
    }

    /// Remove a track, returning its position. The caller is responsible for
    /// having detached the track's clips first.
    pub(crate) fn take_track(&mut self, id: TrackId) -> Option<(usize, Track)> {
        let index = self.index_of(id)?;
        Some((index, self.tracks.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_track_appends_in_order() {
        let mut mixer = Mixer::new();
        let a = mixer.create_track();
        let b = mixer.create_track();
        let c = mixer.create_track();

        let order: Vec<TrackId> = mixer.tracks().iter().map(|t| t.id()).collect();
        assert_eq!(order, vec![a, b, c]);
        assert_eq!(mixer.index_of(b), Some(1));
    }

    #[test]
    fn test_new_track_defaults() {
        let mut mixer = Mixer::new();
        let id = mixer.create_track();
        let track = mixer.track(id).unwrap();

        assert!(track.active());
        assert_eq!(track.input(), InputSource::Midi);
        assert_eq!(track.lane_height(), DEFAULT_LANE_HEIGHT);
        assert!(track.clip_ids().is_empty());
    }

    #[test]
    fn test_active_midi_filter_preserves_order() {
        let mut mixer = Mixer::new();
        let a = mixer.create_track();
        let b = mixer.create_track();
        let c = mixer.create_track();
        let d = mixer.create_track();

        mixer.track_mut(b).unwrap().set_active(false);
        mixer.track_mut(c).unwrap().set_input(InputSource::Mic);

        let ids: Vec<TrackId> = mixer.active_midi_tracks().map(|t| t.id()).collect();
        assert_eq!(ids, vec![a, d]);
    }

    #[test]
    fn test_detach_clip_reports_position() {
        let mut mixer = Mixer::new();
        let id = mixer.create_track();
        let track = mixer.track_mut(id).unwrap();

        track.attach_clip_at(0, ClipId(10));
        track.attach_clip_at(1, ClipId(11));
        track.attach_clip_at(2, ClipId(12));

        assert_eq!(track.detach_clip(ClipId(11)), Some(1));
        assert_eq!(track.clip_ids(), &[ClipId(10), ClipId(12)]);
        assert_eq!(track.detach_clip(ClipId(11)), None);
    }

    #[test]
    fn test_take_and_reinsert_track() {
        let mut mixer = Mixer::new();
        let a = mixer.create_track();
        let b = mixer.create_track();
        let c = mixer.create_track();

        let (index, track) = mixer.take_track(b).unwrap();
        assert_eq!(index, 1);
        assert_eq!(mixer.len(), 2);

        mixer.insert_track_at(index, track);
        let order: Vec<TrackId> = mixer.tracks().iter().map(|t| t.id()).collect();
        assert_eq!(order, vec![a, b, c]);
    }

    #[test]
    fn test_top_panel_height_sums_lanes() {
        let mut mixer = Mixer::new();
        let a = mixer.create_track();
        mixer.create_track();
        mixer.track_mut(a).unwrap().set_lane_height(120.0);

        assert_eq!(mixer.top_panel_height(), 120.0 + DEFAULT_LANE_HEIGHT);
    }
}
