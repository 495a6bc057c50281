//! State validation, guarded mutation and the error log.

mod engine;
mod log;
mod path;
mod rules;

pub use engine::ValidationEngine;
pub use log::{
    CriticalClassifier, ErrorRecord, ErrorReport, ErrorSink, FeedbackKind, FeedbackSink,
    WarningRecord,
};
pub use path::{FieldPath, FieldValue, PathError, display_value};
pub use rules::{
    Constraint, FieldRule, MoveRule, REQUIRED_PUZZLE_FIELDS, REQUIRED_STATE_FIELDS, RuleNamespace,
    ValidationRules,
};
