use std::collections::VecDeque;

use studio_transport::{AudioArc, WaveformData};

use crate::arrangement::Arrangement;
use crate::clip::{AudioClip, ClipId, ClipParams};
use crate::error::{CoreError, Result};
use crate::mixer::{Track, TrackId};

/// One reversible primitive mutation of the arrangement.
///
/// Applying an op performs it and returns the op that undoes it, so undo and
/// redo are the same walk in opposite directions.
#[derive(Debug)]
pub(crate) enum EditOp {
    AttachClip {
        track: TrackId,
        index: usize,
        clip: Box<AudioClip>,
    },
    DetachClip {
        clip: ClipId,
    },
    InsertTrack {
        index: usize,
        track: Box<Track>,
    },
    RemoveTrack {
        track: TrackId,
    },
    PutBuffer {
        clip: ClipId,
        value: Option<AudioArc>,
    },
    PutWaveform {
        clip: ClipId,
        value: Option<WaveformData>,
    },
    SetClipBuffer {
        clip: ClipId,
        value: Option<AudioArc>,
    },
}

impl EditOp {
    fn apply(self, arr: &mut Arrangement) -> Result<EditOp> {
        match self {
            EditOp::AttachClip { track, index, clip } => {
                let id = clip.id();
                arr.attach_clip_at(track, index, *clip)?;
                Ok(EditOp::DetachClip { clip: id })
            }
            EditOp::DetachClip { clip } => {
                let (track, index, clip) = arr.detach_clip(clip)?;
                Ok(EditOp::AttachClip {
                    track,
                    index,
                    clip: Box::new(clip),
                })
            }
            EditOp::InsertTrack { index, track } => {
                let id = track.id();
                arr.mixer.insert_track_at(index, *track);
                Ok(EditOp::RemoveTrack { track: id })
            }
            EditOp::RemoveTrack { track } => {
                let (index, removed) = arr
                    .mixer
                    .take_track(track)
                    .ok_or(CoreError::UnknownTrack(track))?;
                Ok(EditOp::InsertTrack {
                    index,
                    track: Box::new(removed),
                })
            }
            EditOp::PutBuffer { clip, value } => {
                let prior = arr.buffer_cache.put(clip, value);
                Ok(EditOp::PutBuffer { clip, value: prior })
            }
            EditOp::PutWaveform { clip, value } => {
                let prior = arr.waveform_cache.put(clip, value);
                Ok(EditOp::PutWaveform { clip, value: prior })
            }
            EditOp::SetClipBuffer { clip, value } => {
                let entity = arr
                    .clips
                    .get_mut(clip)
                    .ok_or(CoreError::UnknownClip(clip))?;
                let prior = entity.replace_buffer(value);
                Ok(EditOp::SetClipBuffer { clip, value: prior })
            }
        }
    }
}

/// A labeled group of mutations, undone and redone as one user-visible step.
///
/// `ops` are stored so that applying them back to front performs the step's
/// effect (for an undo step: the inverses of the group's mutations, recorded
/// in mutation order).
#[derive(Debug)]
struct UndoStep {
    label: String,
    ops: Vec<EditOp>,
}

/// Records multi-step mutations as single undo steps.
///
/// Mutations are grouped with [`with_group`]: the body runs as a synchronous
/// critical section against a [`Txn`], which records the inverse of every
/// mutation it performs. A failing body is rolled back before the error
/// surfaces, so no partially-applied group is ever visible.
///
/// [`with_group`]: UndoManager::with_group
#[derive(Debug)]
pub struct UndoManager {
    undo_stack: VecDeque<UndoStep>,
    redo_stack: VecDeque<UndoStep>,
    max_depth: usize,
}

impl UndoManager {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth,
        }
    }

    /// Run `body` against a transaction, committing its recorded mutations
    /// as one labeled undo step.
    ///
    /// On error the recorded mutations are unwound newest-first and the
    /// failure is surfaced as [`CoreError::Transaction`]. Bodies that record
    /// nothing commit no step.
    pub fn with_group<T>(
        &mut self,
        label: &str,
        arr: &mut Arrangement,
        body: impl FnOnce(&mut Txn<'_>) -> anyhow::Result<T>,
    ) -> Result<T> {
        let mut txn = Txn {
            arr,
            ops: Vec::new(),
        };
        let result = body(&mut txn);
        let Txn { arr, mut ops } = txn;

        match result {
            Ok(value) => {
                if !ops.is_empty() {
                    tracing::debug!(label, ops = ops.len(), "committed undo group");
                    if self.undo_stack.len() >= self.max_depth {
                        self.undo_stack.pop_front();
                    }
                    self.undo_stack.push_back(UndoStep {
                        label: label.to_string(),
                        ops,
                    });
                    self.redo_stack.clear();
                }
                Ok(value)
            }
            Err(source) => {
                while let Some(op) = ops.pop() {
                    op.apply(arr)?;
                }
                tracing::warn!(label, "undo group failed, rolled back");
                Err(CoreError::Transaction {
                    label: label.to_string(),
                    source,
                })
            }
        }
    }

    /// Undo the most recent step. Returns its label, or `None` when there is
    /// nothing to undo.
    pub fn undo(&mut self, arr: &mut Arrangement) -> Result<Option<String>> {
        let Some(step) = self.undo_stack.pop_back() else {
            return Ok(None);
        };
        let ops = Self::apply_step(step.ops, arr)?;
        self.redo_stack.push_back(UndoStep {
            label: step.label.clone(),
            ops,
        });
        tracing::debug!(label = %step.label, "undid");
        Ok(Some(step.label))
    }

    /// Redo the most recently undone step. Returns its label, or `None` when
    /// there is nothing to redo.
    pub fn redo(&mut self, arr: &mut Arrangement) -> Result<Option<String>> {
        let Some(step) = self.redo_stack.pop_back() else {
            return Ok(None);
        };
        let ops = Self::apply_step(step.ops, arr)?;
        self.undo_stack.push_back(UndoStep {
            label: step.label.clone(),
            ops,
        });
        tracing::debug!(label = %step.label, "redid");
        Ok(Some(step.label))
    }

    /// Apply a step's ops back to front, collecting the opposing step.
    fn apply_step(ops: Vec<EditOp>, arr: &mut Arrangement) -> Result<Vec<EditOp>> {
        let mut inverse = Vec::with_capacity(ops.len());
        for op in ops.into_iter().rev() {
            inverse.push(op.apply(arr)?);
        }
        Ok(inverse)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Recording handle handed to [`UndoManager::with_group`] bodies.
///
/// Every mutation records its inverse before returning, so a group can be
/// unwound at any point. Reads go through [`arrangement`].
///
/// [`arrangement`]: Txn::arrangement
pub struct Txn<'a> {
    arr: &'a mut Arrangement,
    ops: Vec<EditOp>,
}

impl Txn<'_> {
    pub fn arrangement(&self) -> &Arrangement {
        self.arr
    }

    /// Allocate a clip under `track`. Fails if the track is unknown.
    pub fn create_audio_clip(&mut self, track: TrackId, params: ClipParams) -> Result<ClipId> {
        let id = self.arr.create_clip(track, params)?;
        self.ops.push(EditOp::DetachClip { clip: id });
        tracing::debug!(clip = %id, track = %track, "created clip");
        Ok(id)
    }

    /// Detach a clip from its track and drop it. Caches are untouched;
    /// callers that want cache cleanup do it explicitly.
    pub fn delete_clip(&mut self, clip: ClipId) -> Result<()> {
        let (track, index, removed) = self.arr.detach_clip(clip)?;
        tracing::debug!(clip = %clip, track = %track, "deleted clip");
        self.ops.push(EditOp::AttachClip {
            track,
            index,
            clip: Box::new(removed),
        });
        Ok(())
    }

    /// Copy the buffer-cache entry from `source` to `dest`. Missing source
    /// entries are a no-op, and record nothing.
    pub fn copy_buffer_cache(&mut self, source: ClipId, dest: ClipId) {
        if let Some(value) = self.arr.buffer_cache.get(source).cloned() {
            let prior = self.arr.buffer_cache.put(dest, Some(value));
            self.ops.push(EditOp::PutBuffer {
                clip: dest,
                value: prior,
            });
        }
    }

    /// Copy the waveform-cache entry from `source` to `dest`. Missing source
    /// entries are a no-op, and record nothing.
    pub fn copy_waveform_cache(&mut self, source: ClipId, dest: ClipId) {
        if let Some(value) = self.arr.waveform_cache.get(source).cloned() {
            let prior = self.arr.waveform_cache.put(dest, Some(value));
            self.ops.push(EditOp::PutWaveform {
                clip: dest,
                value: prior,
            });
        }
    }

    /// Point a clip at a backing buffer.
    pub fn set_clip_buffer(&mut self, clip: ClipId, buffer: AudioArc) -> Result<()> {
        let entity = self
            .arr
            .clips
            .get_mut(clip)
            .ok_or(CoreError::UnknownClip(clip))?;
        let prior = entity.replace_buffer(Some(buffer));
        self.ops.push(EditOp::SetClipBuffer { clip, value: prior });
        Ok(())
    }

    /// Append a new track.
    pub fn create_track(&mut self) -> TrackId {
        let id = self.arr.mixer.create_track();
        self.ops.push(EditOp::RemoveTrack { track: id });
        id
    }

    /// Remove a track, deleting its clips first.
    pub fn remove_track(&mut self, track: TrackId) -> Result<()> {
        let owned: Vec<ClipId> = self
            .arr
            .mixer
            .track(track)
            .ok_or(CoreError::UnknownTrack(track))?
            .clip_ids()
            .to_vec();
        for clip in owned {
            self.delete_clip(clip)?;
        }
        let (index, removed) = self
            .arr
            .mixer
            .take_track(track)
            .ok_or(CoreError::UnknownTrack(track))?;
        tracing::info!(track = %track, "removed track");
        self.ops.push(EditOp::InsertTrack {
            index,
            track: Box::new(removed),
        });
        Ok(())
    }
}
