//! Report synthesis: a deterministic reduction of a session into a
//! structured document, its Markdown rendering, and optional prose
//! narratives.

pub mod document;
pub mod narrative;
pub mod render;

pub use document::{
    ConstraintRow, ObjectiveRow, ProgressSummary, ReportDocument, ReportStatus,
    NARRATIVE_DISABLED, NARRATIVE_FAILED,
};
pub use narrative::{LlmNarrator, NarrativeGenerator, NoNarrator};
