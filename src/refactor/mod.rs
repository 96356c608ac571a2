// Refactoring - writes diagnostic fixes back to source files

mod editor;

pub use editor::{apply_to_text, FixApplier, FixSummary, TextOutcome};
