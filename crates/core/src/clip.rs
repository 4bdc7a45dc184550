use std::collections::HashMap;
use std::fmt;

use studio_transport::AudioArc;

use crate::mixer::TrackId;

/// Unique identifier for clips. Stable for the clip's whole life, including
/// across moves between tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub u64);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clip kind tag. Only audio clips exist today; matching on this is
/// deliberately exhaustive so a new kind forces every algorithm that walks
/// clips to decide how to treat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipKind {
    Audio,
}

/// Placement parameters carried by a clip, in transport samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipParams {
    pub start: u64,
    pub fade_in_samples: u64,
    pub fade_out_samples: u64,
    pub loop_samples: Option<u64>,
}

/// A placed audio clip.
///
/// The backing buffer is a shared handle; heavy derived data (decoded
/// buffers at session rate, peak envelopes) lives in the session caches
/// keyed by the clip id, not on the clip itself.
#[derive(Debug, Clone)]
pub struct AudioClip {
    id: ClipId,
    kind: ClipKind,
    start: u64,
    fade_in_samples: u64,
    fade_out_samples: u64,
    loop_samples: Option<u64>,
    track_id: TrackId,
    buffer: Option<AudioArc>,
}

impl AudioClip {
    fn new(id: ClipId, track_id: TrackId, params: ClipParams) -> Self {
        Self {
            id,
            kind: ClipKind::Audio,
            start: params.start,
            fade_in_samples: params.fade_in_samples,
            fade_out_samples: params.fade_out_samples,
            loop_samples: params.loop_samples,
            track_id,
            buffer: None,
        }
    }

    pub fn id(&self) -> ClipId {
        self.id
    }

    pub fn kind(&self) -> ClipKind {
        self.kind
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn set_start(&mut self, start: u64) {
        self.start = start;
    }

    pub fn fade_in_samples(&self) -> u64 {
        self.fade_in_samples
    }

    pub fn fade_out_samples(&self) -> u64 {
        self.fade_out_samples
    }

    pub fn set_fades(&mut self, fade_in_samples: u64, fade_out_samples: u64) {
        self.fade_in_samples = fade_in_samples;
        self.fade_out_samples = fade_out_samples;
    }

    pub fn loop_samples(&self) -> Option<u64> {
        self.loop_samples
    }

    pub fn set_loop_samples(&mut self, loop_samples: Option<u64>) {
        self.loop_samples = loop_samples;
    }

    pub fn track_id(&self) -> TrackId {
        self.track_id
    }

    pub(crate) fn set_track_id(&mut self, track_id: TrackId) {
        self.track_id = track_id;
    }

    pub fn buffer(&self) -> Option<&AudioArc> {
        self.buffer.as_ref()
    }

    pub(crate) fn replace_buffer(&mut self, buffer: Option<AudioArc>) -> Option<AudioArc> {
        std::mem::replace(&mut self.buffer, buffer)
    }

    /// Placement parameters, as handed to a duplicate or moved copy.
    pub fn params(&self) -> ClipParams {
        ClipParams {
            start: self.start,
            fade_in_samples: self.fade_in_samples,
            fade_out_samples: self.fade_out_samples,
            loop_samples: self.loop_samples,
        }
    }
}

/// Owns every clip entity in the session and allocates their ids.
///
/// Tracks reference clips by id only; the store and the owning track's id
/// list are always updated together by the arrangement.
#[derive(Debug, Default)]
pub struct ClipStore {
    clips: HashMap<ClipId, AudioClip>,
    next_id: u64,
}

impl ClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ClipId) -> Option<&AudioClip> {
        self.clips.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ClipId) -> Option<&mut AudioClip> {
        self.clips.get_mut(&id)
    }

    pub fn contains(&self, id: ClipId) -> bool {
        self.clips.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ClipId> + '_ {
        self.clips.keys().copied()
    }

    /// Allocate a fresh clip under `track_id`. Ids are never reused, even
    /// after the clip is deleted and the deletion undone.
    pub(crate) fn allocate(&mut self, track_id: TrackId, params: ClipParams) -> ClipId {
        let id = ClipId(self.next_id);
        self.next_id += 1;
        self.clips.insert(id, AudioClip::new(id, track_id, params));
        id
    }

    /// Re-insert a previously removed clip (undo of a delete).
    pub(crate) fn restore(&mut self, clip: AudioClip) {
        self.clips.insert(clip.id, clip);
    }

    pub(crate) fn remove(&mut self, id: ClipId) -> Option<AudioClip> {
        self.clips.remove(&id)
    }
}
