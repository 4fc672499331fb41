use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentGroup {
    pub id: u64,
    pub name: String,
    pub course_id: u64,
    pub group_weight: f64,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub due_at: String,
    #[serde(default)]
    pub points_possible: Numeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub learner_id: u64,
    pub assignment_id: u64,
    pub submission: SubmissionDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDetails {
    #[serde(default)]
    pub submitted_at: String,
    #[serde(default)]
    pub score: Numeric,
}

/// A loosely typed number as it arrives from fixture data.
///
/// Anything that is not a finite number is kept as-is so the grading stages
/// can reject it with the right error kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Other(serde_json::Value),
}

impl Numeric {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }
}

// A missing value is not a number.
impl Default for Numeric {
    fn default() -> Self {
        Numeric::Other(serde_json::Value::Null)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Number(value)
    }
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Numeric::Number(parsed),
            _ => Numeric::Other(serde_json::Value::String(value.to_string())),
        }
    }
}

/// Everything one grading run needs, in the shape fixture files use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradebookInput {
    pub course: Course,
    pub assignment_group: AssignmentGroup,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentScore {
    pub assignment_id: u64,
    pub fraction: f64,
}

/// Per-learner result: the points-weighted average plus one fractional
/// score per counted assignment, in first-appearance order.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnerSummary {
    pub id: u64,
    pub avg: f64,
    pub scores: Vec<AssignmentScore>,
}

impl LearnerSummary {
    pub fn score_for(&self, assignment_id: u64) -> Option<f64> {
        self.scores
            .iter()
            .find(|score| score.assignment_id == assignment_id)
            .map(|score| score.fraction)
    }

    /// Sum of effective scores over sum of points possible.
    /// An empty slice has no average and yields NaN.
    pub(crate) fn weighted_average(entries: &[(f64, f64)]) -> f64 {
        let (total_score, total_points) = entries
            .iter()
            .fold((0.0, 0.0), |(score, points), (s, p)| (score + s, points + p));
        total_score / total_points
    }
}

// Flattened as `{ "id": .., "avg": .., "<assignment_id>": fraction, .. }`.
impl Serialize for LearnerSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.scores.len() + 2))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("avg", &self.avg)?;
        for score in &self.scores {
            map.serialize_entry(&score.assignment_id.to_string(), &score.fraction)?;
        }
        map.end()
    }
}
