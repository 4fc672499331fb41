use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, error, info};

use crate::clock::{Clock, SystemClock};
use crate::error::GradingError;
use crate::models::{Assignment, AssignmentGroup, AssignmentScore, Course, LearnerSummary, Submission};

/// Fraction of an assignment's points deducted once for a late submission.
pub const LATE_PENALTY_RATE: f64 = 0.1;

const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses `YYYY-MM-DD` (midnight UTC), RFC 3339, and date-times with or
/// without seconds, separated by `T` or a space. A trailing `Z` or no zone
/// at all means UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(stamp) = DateTime::parse_from_str(raw, format) {
            return Some(stamp.with_timezone(&Utc));
        }
    }

    let naive = raw
        .strip_suffix('Z')
        .or_else(|| raw.strip_suffix('z'))
        .unwrap_or(raw);
    for format in NAIVE_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(stamp.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn validate_group(course: &Course, group: &AssignmentGroup) -> Result<(), GradingError> {
    if group.course_id != course.id {
        return Err(GradingError::GroupMismatch {
            group_id: group.id,
            group_course_id: group.course_id,
            course_id: course.id,
        });
    }

    info!(
        course_id = course.id,
        group_id = group.id,
        "assignment group validated for the course"
    );
    Ok(())
}

fn positive_points(assignment: &Assignment) -> Result<f64, GradingError> {
    match assignment.points_possible.as_f64() {
        Some(points) if points > 0.0 => Ok(points),
        _ => Err(GradingError::InvalidPoints {
            assignment_id: assignment.id,
        }),
    }
}

/// Assignments that are due as of `now`, with names uppercased.
///
/// Not-yet-due and undated assignments are skipped. A due assignment with a
/// bad point value fails the whole call. The group itself is left untouched.
pub fn eligible_assignments(
    group: &AssignmentGroup,
    now: DateTime<Utc>,
) -> Result<Vec<Assignment>, GradingError> {
    let mut eligible = Vec::with_capacity(group.assignments.len());

    for assignment in &group.assignments {
        match parse_timestamp(&assignment.due_at) {
            Some(due) if due <= now => {}
            _ => {
                debug!(
                    assignment_id = assignment.id,
                    due_at = %assignment.due_at,
                    "skipping assignment that is not yet due"
                );
                continue;
            }
        }

        positive_points(assignment)?;

        eligible.push(Assignment {
            name: assignment.name.to_uppercase(),
            ..assignment.clone()
        });
    }

    Ok(eligible)
}

/// Raw score minus the flat late penalty when `submitted_at` is after `due_at`.
/// No clamping: the result may be negative.
pub fn effective_score(
    raw: f64,
    points_possible: f64,
    due_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
) -> f64 {
    match (due_at, submitted_at) {
        (Some(due), Some(submitted)) if submitted > due => raw - LATE_PENALTY_RATE * points_possible,
        _ => raw,
    }
}

struct GradableAssignment {
    points: f64,
    due: Option<DateTime<Utc>>,
}

struct LearnerTally {
    id: u64,
    entries: Vec<(f64, f64)>,
    scores: Vec<AssignmentScore>,
}

impl LearnerTally {
    fn record(&mut self, assignment_id: u64, score: f64, points: f64) {
        let fraction = score / points;
        match self
            .scores
            .iter_mut()
            .find(|existing| existing.assignment_id == assignment_id)
        {
            Some(existing) => existing.fraction = fraction,
            None => self.scores.push(AssignmentScore {
                assignment_id,
                fraction,
            }),
        }
        self.entries.push((score, points));
    }

    fn finish(self) -> LearnerSummary {
        LearnerSummary {
            id: self.id,
            avg: LearnerSummary::weighted_average(&self.entries),
            scores: self.scores,
        }
    }
}

/// Joins submissions against the eligible assignments and builds one summary
/// per learner, in first-appearance order.
pub fn aggregate(
    eligible: &[Assignment],
    submissions: &[Submission],
) -> Result<Vec<LearnerSummary>, GradingError> {
    let mut by_id: HashMap<u64, GradableAssignment> = HashMap::with_capacity(eligible.len());
    for assignment in eligible {
        let gradable = GradableAssignment {
            points: positive_points(assignment)?,
            due: parse_timestamp(&assignment.due_at),
        };
        by_id.insert(assignment.id, gradable);
    }

    let mut tallies: Vec<LearnerTally> = Vec::new();
    let mut positions: HashMap<u64, usize> = HashMap::new();

    for submission in submissions {
        let Some(assignment) = by_id.get(&submission.assignment_id) else {
            debug!(
                learner_id = submission.learner_id,
                assignment_id = submission.assignment_id,
                "skipping submission for ineligible assignment"
            );
            continue;
        };

        let raw = submission
            .submission
            .score
            .as_f64()
            .ok_or(GradingError::InvalidScore {
                learner_id: submission.learner_id,
                assignment_id: submission.assignment_id,
            })?;

        let score = effective_score(
            raw,
            assignment.points,
            assignment.due,
            parse_timestamp(&submission.submission.submitted_at),
        );

        let position = *positions.entry(submission.learner_id).or_insert_with(|| {
            tallies.push(LearnerTally {
                id: submission.learner_id,
                entries: Vec::new(),
                scores: Vec::new(),
            });
            tallies.len() - 1
        });

        tallies[position].record(submission.assignment_id, score, assignment.points);
    }

    Ok(tallies.into_iter().map(LearnerTally::finish).collect())
}

/// Runs the full pipeline, surfacing which check failed.
pub fn try_learner_data(
    course: &Course,
    group: &AssignmentGroup,
    submissions: &[Submission],
    clock: &dyn Clock,
) -> Result<Vec<LearnerSummary>, GradingError> {
    validate_group(course, group)?;
    let eligible = eligible_assignments(group, clock.now())?;
    aggregate(&eligible, submissions)
}

/// Like [`try_learner_data`], but any failure is logged and yields an empty list.
pub fn learner_data_with_clock(
    course: &Course,
    group: &AssignmentGroup,
    submissions: &[Submission],
    clock: &dyn Clock,
) -> Vec<LearnerSummary> {
    match try_learner_data(course, group, submissions, clock) {
        Ok(summaries) => summaries,
        Err(err) => {
            error!(kind = err.kind(), error = %err, "grading run aborted");
            Vec::new()
        }
    }
}

pub fn get_learner_data(
    course: &Course,
    group: &AssignmentGroup,
    submissions: &[Submission],
) -> Vec<LearnerSummary> {
    learner_data_with_clock(course, group, submissions, &SystemClock)
}
