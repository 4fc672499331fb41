//! Per-learner weighted grade summaries for one assignment group.
//!
//! The pipeline validates that the group belongs to the course, keeps the
//! assignments that are already due, applies the late penalty and averages
//! each learner's scores weighted by points possible.

pub mod clock;
pub mod error;
pub mod fixtures;
pub mod grading;
pub mod models;
pub mod report;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::GradingError;
pub use grading::{get_learner_data, learner_data_with_clock, try_learner_data};
pub use models::{
    Assignment, AssignmentGroup, AssignmentScore, Course, GradebookInput, LearnerSummary, Numeric,
    Submission, SubmissionDetails,
};
