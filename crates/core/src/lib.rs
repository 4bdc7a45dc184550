pub mod arrangement;
pub mod cache;
pub mod clip;
pub mod clip_ops;
pub mod error;
pub mod instrument;
pub mod keyboard;
pub mod mixer;
pub mod note;
pub mod session;
pub mod timeline;
pub mod undo;

pub use arrangement::Arrangement;
pub use cache::ClipCache;
pub use clip::{AudioClip, ClipId, ClipKind, ClipParams, ClipStore};
pub use clip_ops::{duplicate_clip, move_clip_to_new_track};
pub use error::{CoreError, Result};
pub use instrument::{Instrument, InstrumentHandle, NullInstrument};
pub use keyboard::Keyboard;
pub use mixer::{InputSource, Mixer, Track, TrackId};
pub use note::{NoteEvent, Pitch, PitchClass};
pub use session::{EngineState, Session, SessionConfig};
pub use timeline::{GridLayout, Subdivision, Timeline};
pub use undo::{Txn, UndoManager};

pub use studio_transport::{AudioArc, Command, Status, WaveformData};
