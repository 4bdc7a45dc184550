//! Clip operations that span tracks and caches, grouped for undo.

use crate::arrangement::Arrangement;
use crate::clip::{ClipId, ClipKind};
use crate::error::Result;
use crate::undo::UndoManager;

/// Move a clip to another track, addressed by track index.
///
/// Returns the id of the replacement clip, or `None` when the request is
/// declined: same source and destination, or a destination index that is out
/// of range against the track count *now* (indices may have shifted since
/// the request was made). Declining is silent because invalid drops are
/// normal UI traffic, not faults.
///
/// The move runs as one undo group: create the replacement under the
/// destination with the same placement parameters, copy both cache entries
/// forward, share the backing buffer, delete the original. The old id's
/// cache entries are left behind for an explicit prune.
pub fn move_clip_to_new_track(
    arr: &mut Arrangement,
    undo: &mut UndoManager,
    clip_id: ClipId,
    from_index: usize,
    to_index: usize,
) -> Result<Option<ClipId>> {
    if from_index == to_index || to_index >= arr.mixer().len() {
        return Ok(None);
    }
    let Some(clip) = arr.clips().get(clip_id) else {
        return Ok(None);
    };
    match clip.kind() {
        ClipKind::Audio => {}
    }

    let params = clip.params();
    let buffer = clip.buffer().cloned();
    let dest_track = match arr.mixer().track_at(to_index) {
        Some(track) => track.id(),
        None => return Ok(None),
    };

    let new_id = undo.with_group("move clip to new track", arr, |txn| {
        let new_id = txn.create_audio_clip(dest_track, params)?;
        txn.copy_buffer_cache(clip_id, new_id);
        if let Some(buffer) = buffer {
            txn.set_clip_buffer(new_id, buffer)?;
        }
        txn.copy_waveform_cache(clip_id, new_id);
        txn.delete_clip(clip_id)?;
        Ok(new_id)
    })?;

    tracing::debug!(old = %clip_id, new = %new_id, to = to_index, "moved clip");
    Ok(Some(new_id))
}

/// Duplicate a clip onto its own track.
///
/// Same copy-forward algorithm as a move, minus the delete: the duplicate
/// gets the original's placement parameters, both cache entries, and the
/// shared backing buffer, without recomputing any derived data.
pub fn duplicate_clip(
    arr: &mut Arrangement,
    undo: &mut UndoManager,
    clip_id: ClipId,
) -> Result<Option<ClipId>> {
    let Some(clip) = arr.clips().get(clip_id) else {
        return Ok(None);
    };
    match clip.kind() {
        ClipKind::Audio => {}
    }

    let params = clip.params();
    let buffer = clip.buffer().cloned();
    let track = clip.track_id();

    let new_id = undo.with_group("duplicate clip", arr, |txn| {
        let new_id = txn.create_audio_clip(track, params)?;
        txn.copy_buffer_cache(clip_id, new_id);
        if let Some(buffer) = buffer {
            txn.set_clip_buffer(new_id, buffer)?;
        }
        txn.copy_waveform_cache(clip_id, new_id);
        Ok(new_id)
    })?;

    tracing::debug!(old = %clip_id, new = %new_id, "duplicated clip");
    Ok(Some(new_id))
}

#[cfg(test)]
mod tests {
    use studio_transport::{AudioArc, WaveformData};

    use super::*;
    use crate::clip::ClipParams;
    use crate::mixer::TrackId;

    fn waveform(marker: usize) -> WaveformData {
        WaveformData {
            peaks: vec![(-0.5, 0.5)],
            samples_per_bucket: marker,
        }
    }

    /// Two tracks, one fully populated clip on the first.
    fn setup() -> (Arrangement, UndoManager, TrackId, TrackId, ClipId) {
        let mut arr = Arrangement::new();
        let from = arr.mixer_mut().create_track();
        let to = arr.mixer_mut().create_track();

        let params = ClipParams {
            start: 4800,
            fade_in_samples: 64,
            fade_out_samples: 128,
            loop_samples: Some(22050),
        };
        let clip = arr.create_clip(from, params).unwrap();

        let audio = AudioArc::new(vec![0.25; 16], 44100, 1);
        arr.clips.get_mut(clip).unwrap().replace_buffer(Some(audio.clone()));
        arr.buffer_cache_mut().set(clip, audio);
        arr.waveform_cache_mut().set(clip, waveform(512));

        (arr, UndoManager::default(), from, to, clip)
    }

    #[test]
    fn test_move_same_index_is_noop() {
        let (mut arr, mut undo, _, _, clip) = setup();

        let result = move_clip_to_new_track(&mut arr, &mut undo, clip, 0, 0).unwrap();

        assert_eq!(result, None);
        assert!(arr.clips().contains(clip));
        assert_eq!(arr.buffer_cache().len(), 1);
        assert_eq!(arr.waveform_cache().len(), 1);
        assert!(!undo.can_undo());
    }

    #[test]
    fn test_move_out_of_range_is_noop() {
        let (mut arr, mut undo, from, _, clip) = setup();

        let result = move_clip_to_new_track(&mut arr, &mut undo, clip, 0, 5).unwrap();

        assert_eq!(result, None);
        assert_eq!(arr.mixer().track(from).unwrap().clip_ids(), &[clip]);
        assert!(!undo.can_undo());
    }

    #[test]
    fn test_move_transfers_clip_and_caches() {
        let (mut arr, mut undo, from, to, old) = setup();

        let new = move_clip_to_new_track(&mut arr, &mut undo, old, 0, 1)
            .unwrap()
            .expect("move should happen");

        // Old track lost the clip, new track gained a new id
        assert!(arr.mixer().track(from).unwrap().clip_ids().is_empty());
        assert_eq!(arr.mixer().track(to).unwrap().clip_ids(), &[new]);
        assert_ne!(old, new);

        // Placement parameters carried over exactly
        let moved = arr.clips().get(new).unwrap();
        assert_eq!(moved.start(), 4800);
        assert_eq!(moved.fade_in_samples(), 64);
        assert_eq!(moved.fade_out_samples(), 128);
        assert_eq!(moved.loop_samples(), Some(22050));
        assert_eq!(moved.track_id(), to);

        // Backing buffer is shared, not copied
        assert!(moved.buffer().is_some());

        // Both caches have entries under the new id...
        assert!(arr.buffer_cache().contains(new));
        assert!(arr.waveform_cache().contains(new));
        // ...and the old id's entries were not cleaned up
        assert!(arr.buffer_cache().contains(old));
        assert!(arr.waveform_cache().contains(old));
        assert!(!arr.clips().contains(old));
    }

    #[test]
    fn test_move_then_prune_drops_old_entries() {
        let (mut arr, mut undo, _, _, old) = setup();

        let new = move_clip_to_new_track(&mut arr, &mut undo, old, 0, 1)
            .unwrap()
            .unwrap();

        let removed = arr.prune_caches();
        assert_eq!(removed, 2);
        assert!(!arr.buffer_cache().contains(old));
        assert!(arr.buffer_cache().contains(new));
        assert!(arr.waveform_cache().contains(new));
    }

    #[test]
    fn test_move_is_one_undo_step() {
        let (mut arr, mut undo, from, to, old) = setup();

        let new = move_clip_to_new_track(&mut arr, &mut undo, old, 0, 1)
            .unwrap()
            .unwrap();

        let label = undo.undo(&mut arr).unwrap();
        assert_eq!(label.as_deref(), Some("move clip to new track"));

        // Everything from the group reverted together
        assert_eq!(arr.mixer().track(from).unwrap().clip_ids(), &[old]);
        assert!(arr.mixer().track(to).unwrap().clip_ids().is_empty());
        assert!(arr.clips().contains(old));
        assert!(!arr.clips().contains(new));
        assert!(!arr.buffer_cache().contains(new));
        assert!(!arr.waveform_cache().contains(new));

        undo.redo(&mut arr).unwrap();
        assert_eq!(arr.mixer().track(to).unwrap().clip_ids(), &[new]);
        assert!(!arr.clips().contains(old));
    }

    #[test]
    fn test_move_clip_without_cached_data() {
        let (mut arr, mut undo, _, to, _) = setup();
        // A clip that was never decoded: no buffer, no cache entries
        let bare = arr.create_clip(to, ClipParams::default()).unwrap();

        let new = move_clip_to_new_track(&mut arr, &mut undo, bare, 1, 0)
            .unwrap()
            .expect("move should happen");

        assert!(!arr.buffer_cache().contains(new));
        assert!(!arr.waveform_cache().contains(new));
        assert!(arr.clips().get(new).unwrap().buffer().is_none());
    }

    #[test]
    fn test_move_unknown_clip_is_noop() {
        let (mut arr, mut undo, _, _, _) = setup();

        let result = move_clip_to_new_track(&mut arr, &mut undo, ClipId(999), 0, 1).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_duplicate_creates_independent_copy() {
        let (mut arr, mut undo, from, _, old) = setup();

        let dup = duplicate_clip(&mut arr, &mut undo, old)
            .unwrap()
            .expect("duplicate should happen");

        assert_eq!(arr.mixer().track(from).unwrap().clip_ids(), &[old, dup]);
        assert_eq!(
            arr.clips().get(dup).unwrap().params(),
            arr.clips().get(old).unwrap().params()
        );
        assert!(arr.buffer_cache().contains(dup));
        assert!(arr.waveform_cache().contains(dup));

        // Overwriting the original's entry leaves the duplicate's alone
        arr.waveform_cache_mut().set(old, waveform(64));
        assert_eq!(
            arr.waveform_cache().get(dup).unwrap().samples_per_bucket,
            512
        );
    }

    #[test]
    fn test_duplicate_is_undoable() {
        let (mut arr, mut undo, from, _, old) = setup();

        let dup = duplicate_clip(&mut arr, &mut undo, old).unwrap().unwrap();

        undo.undo(&mut arr).unwrap();
        assert_eq!(arr.mixer().track(from).unwrap().clip_ids(), &[old]);
        assert!(!arr.clips().contains(dup));
        assert!(!arr.buffer_cache().contains(dup));
    }
}
