use studio_transport::{AudioArc, WaveformData};

use crate::cache::ClipCache;
use crate::clip::{AudioClip, ClipId, ClipParams, ClipStore};
use crate::error::{CoreError, Result};
use crate::mixer::{Mixer, TrackId};

/// Everything the edit system mutates as one unit: the track registry, the
/// clip entities, and the derived-data caches.
///
/// The primitives here keep the ownership invariant — a clip's `track_id`
/// always matches exactly one track's id list — by updating both sides
/// together. Undoable mutation goes through [`crate::undo::Txn`], which
/// records against these primitives.
#[derive(Debug, Default)]
pub struct Arrangement {
    pub(crate) mixer: Mixer,
    pub(crate) clips: ClipStore,
    pub(crate) buffer_cache: ClipCache<AudioArc>,
    pub(crate) waveform_cache: ClipCache<WaveformData>,
}

impl Arrangement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut Mixer {
        &mut self.mixer
    }

    pub fn clips(&self) -> &ClipStore {
        &self.clips
    }

    pub fn buffer_cache(&self) -> &ClipCache<AudioArc> {
        &self.buffer_cache
    }

    /// Mutable cache access for the decode worker that populates entries
    /// from outside the core.
    pub fn buffer_cache_mut(&mut self) -> &mut ClipCache<AudioArc> {
        &mut self.buffer_cache
    }

    pub fn waveform_cache(&self) -> &ClipCache<WaveformData> {
        &self.waveform_cache
    }

    pub fn waveform_cache_mut(&mut self) -> &mut ClipCache<WaveformData> {
        &mut self.waveform_cache
    }

    /// Allocate a clip under the given track. Fails if the track is unknown.
    pub(crate) fn create_clip(&mut self, track: TrackId, params: ClipParams) -> Result<ClipId> {
        let track_ref = self
            .mixer
            .track_mut(track)
            .ok_or(CoreError::UnknownTrack(track))?;
        let id = self.clips.allocate(track, params);
        let index = track_ref.clip_ids().len();
        track_ref.attach_clip_at(index, id);
        Ok(id)
    }

    /// Detach a clip from its owning track and remove it from the store,
    /// returning where it was so an undo can put it back.
    pub(crate) fn detach_clip(&mut self, id: ClipId) -> Result<(TrackId, usize, AudioClip)> {
        let clip = self.clips.remove(id).ok_or(CoreError::UnknownClip(id))?;
        let track_id = clip.track_id();
        let track = self
            .mixer
            .track_mut(track_id)
            .ok_or(CoreError::UnknownTrack(track_id))?;
        let index = track.detach_clip(id).ok_or(CoreError::UnknownClip(id))?;
        Ok((track_id, index, clip))
    }

    /// Re-attach a previously detached clip at its old list position.
    pub(crate) fn attach_clip_at(
        &mut self,
        track: TrackId,
        index: usize,
        mut clip: AudioClip,
    ) -> Result<()> {
        let track_ref = self
            .mixer
            .track_mut(track)
            .ok_or(CoreError::UnknownTrack(track))?;
        clip.set_track_id(track);
        track_ref.attach_clip_at(index, clip.id());
        self.clips.restore(clip);
        Ok(())
    }

    /// Drop cache entries whose clip no longer exists. Returns how many
    /// entries were removed across both caches.
    pub fn prune_caches(&mut self) -> usize {
        let clips = &self.clips;
        let removed = self.buffer_cache.prune(|id| clips.contains(id))
            + self.waveform_cache.prune(|id| clips.contains(id));
        if removed > 0 {
            tracing::debug!(removed, "pruned orphaned cache entries");
        }
        removed
    }
}
