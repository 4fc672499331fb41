use std::path::Path;

use anyhow::Context;

use crate::models::{
    Assignment, AssignmentGroup, Course, GradebookInput, Numeric, Submission, SubmissionDetails,
};

/// The worked example gradebook: one course, one group of three assignments
/// (the last due far in the future) and five submissions from two learners.
pub fn sample_gradebook() -> GradebookInput {
    let course = Course {
        id: 451,
        name: "Introduction to JavaScript".to_string(),
    };

    let assignments = vec![
        (1, "Declare a Variable", "2023-01-25", 50.0),
        (2, "Write a Function", "2023-02-27", 150.0),
        (3, "Code the World", "3156-11-15", 500.0),
    ]
    .into_iter()
    .map(|(id, name, due_at, points)| Assignment {
        id,
        name: name.to_string(),
        due_at: due_at.to_string(),
        points_possible: Numeric::from(points),
    })
    .collect();

    let assignment_group = AssignmentGroup {
        id: 12345,
        name: "Fundamentals of JavaScript".to_string(),
        course_id: 451,
        group_weight: 25.0,
        assignments,
    };

    let submissions = vec![
        (125, 1, "2023-01-25", 47.0),
        (125, 2, "2023-02-12", 150.0),
        (125, 3, "2023-01-25", 400.0),
        (132, 1, "2023-01-24", 39.0),
        (132, 2, "2023-03-07", 140.0),
    ]
    .into_iter()
    .map(|(learner_id, assignment_id, submitted_at, score)| Submission {
        learner_id,
        assignment_id,
        submission: SubmissionDetails {
            submitted_at: submitted_at.to_string(),
            score: Numeric::from(score),
        },
    })
    .collect();

    GradebookInput {
        course,
        assignment_group,
        submissions,
    }
}

pub fn load_gradebook(path: &Path) -> anyhow::Result<GradebookInput> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read gradebook {}", path.display()))?;
    let input = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse gradebook {}", path.display()))?;
    Ok(input)
}

/// Reads submissions from a CSV with columns
/// `learner_id,assignment_id,submitted_at,score`.
///
/// Scores stay loosely typed, so a non-numeric cell is reported by the
/// grading run rather than here.
pub fn import_submissions_csv(path: &Path) -> anyhow::Result<Vec<Submission>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        learner_id: u64,
        assignment_id: u64,
        submitted_at: String,
        score: String,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open submissions {}", path.display()))?;
    let mut submissions = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("bad submission row {}", index + 1))?;
        submissions.push(Submission {
            learner_id: row.learner_id,
            assignment_id: row.assignment_id,
            submission: SubmissionDetails {
                submitted_at: row.submitted_at,
                score: Numeric::from(row.score.as_str()),
            },
        });
    }

    Ok(submissions)
}
