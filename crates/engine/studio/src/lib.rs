//! Front-end state for Brickyard
//!
//! Everything the browser page keeps between events, modelled without any
//! DOM types so it can be tested natively:
//!
//! - [`upload`]: the single-image upload surface
//! - [`run`]: the detection run lifecycle with stale-result protection
//! - [`library`]: search, type filter and grid/list view over a batch
//! - [`selection`]: ordered set of picked pieces
//! - [`arrangement`]: rotation, zoom, layout and dropped positions
//! - [`session`]: the page-level aggregate that keeps them consistent

pub mod arrangement;
pub mod library;
pub mod run;
pub mod selection;
pub mod session;
pub mod upload;

pub use arrangement::{
    Arrangement, DragPayload, LayoutMode, Position, Rect, ZoomDirection, MAX_ZOOM, MIN_ZOOM,
    ZOOM_STEP,
};
pub use library::{piece_types, selection_summary, Download, EmptyState, Library, TypeFilter, ViewMode};
pub use run::{DetectionRun, FailurePolicy, Resolution, RunError, RunOutcome, RunPhase, RunTicket};
pub use selection::Selection;
pub use session::{Session, SessionError};
pub use upload::{is_accepted, FileCandidate, UploadError, UploadSurface, UploadedImage};
