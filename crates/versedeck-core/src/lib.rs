//! VerseDeck Core Library
//!
//! Slide composition engine: text fitting, canvas interaction, the slide
//! store with undo, and local/remote persistence.

pub mod adjust;
pub mod backend;
pub mod canvas;
pub mod capture;
pub mod config;
pub mod drop;
pub mod fit;
pub mod group;
pub mod history;
pub mod input;
pub mod layout;
pub mod model;
pub mod selection;
pub mod session;
pub mod storage;
pub mod store;
pub mod sync;

pub use adjust::Adjustment;
pub use backend::{BackendError, BackendResult, SlideBackend};
pub use canvas::{Canvas, Confirmed, DropOutcome, NavOutcome, Navigation, Notice, Prompt, Setting};
pub use capture::{CaptureQueue, CaptureRequest};
pub use config::{Bounds, Clamped, ComposerConfig};
pub use drop::DropPayload;
pub use fit::{ApproximateMeasure, FitBounds, TextMeasure, fit_line_to_width, fit_stanza_font_size, global_measure, install_measure};
pub use group::GroupIndex;
pub use history::{LinesHistory, MAX_UNDO_HISTORY};
pub use input::{Key, KeyOutcome, Modifiers};
pub use layout::{Verse, layout_verses};
pub use model::{CANVAS_HEIGHT, CANVAS_WIDTH, EditMode, Line, LineId, Slide, SlideId, StanzaId, SyncState, TextAlign};
pub use session::{SESSION_KEY, SessionError, SessionSnapshot};
pub use storage::{FileStorage, LocalSession, MemoryStorage, Storage, StorageError};
pub use store::SlideStore;
pub use sync::{BackendSync, ReorderReport, SaveApplied, SyncJob, SyncOutcome};
