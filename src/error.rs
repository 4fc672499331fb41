use thiserror::Error;

/// Conditions that abort a grading run. None of them yield partial results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradingError {
    #[error("assignment group {group_id} belongs to course {group_course_id}, not course {course_id}")]
    GroupMismatch {
        group_id: u64,
        group_course_id: u64,
        course_id: u64,
    },
    #[error("invalid points_possible for assignment {assignment_id}")]
    InvalidPoints { assignment_id: u64 },
    #[error("invalid score value for assignment {assignment_id} (learner {learner_id})")]
    InvalidScore { learner_id: u64, assignment_id: u64 },
}

impl GradingError {
    pub fn kind(&self) -> &'static str {
        match self {
            GradingError::GroupMismatch { .. } => "group_mismatch",
            GradingError::InvalidPoints { .. } => "invalid_points",
            GradingError::InvalidScore { .. } => "invalid_score",
        }
    }
}
