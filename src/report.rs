use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{AssignmentGroup, Course, LearnerSummary};

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentAverage {
    pub assignment_id: u64,
    pub learner_count: usize,
    pub avg_fraction: f64,
}

/// Mean fractional score per assignment across learners, in first-appearance order.
pub fn summarize_by_assignment(summaries: &[LearnerSummary]) -> Vec<AssignmentAverage> {
    let mut totals: Vec<(u64, usize, f64)> = Vec::new();

    for summary in summaries {
        for score in &summary.scores {
            match totals.iter_mut().find(|(id, _, _)| *id == score.assignment_id) {
                Some(entry) => {
                    entry.1 += 1;
                    entry.2 += score.fraction;
                }
                None => totals.push((score.assignment_id, 1, score.fraction)),
            }
        }
    }

    totals
        .into_iter()
        .map(|(assignment_id, learner_count, total)| AssignmentAverage {
            assignment_id,
            learner_count,
            avg_fraction: total / learner_count as f64,
        })
        .collect()
}

pub fn build_report(
    course: &Course,
    group: &AssignmentGroup,
    as_of: DateTime<Utc>,
    summaries: &[LearnerSummary],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Grade Summary Report");
    let _ = writeln!(
        output,
        "{} ({}), group {} (weight {}) as of {}",
        course.name,
        course.id,
        group.name,
        group.group_weight,
        as_of.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Learner Averages");

    if summaries.is_empty() {
        let _ = writeln!(output, "No graded submissions.");
    } else {
        for summary in summaries {
            let _ = writeln!(
                output,
                "- Learner {}: {:.1}% across {} assignments",
                summary.id,
                summary.avg * 100.0,
                summary.scores.len()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Assignment Averages");

    let averages = summarize_by_assignment(summaries);
    if averages.is_empty() {
        let _ = writeln!(output, "No graded submissions.");
    } else {
        for average in &averages {
            let name = group
                .assignments
                .iter()
                .rfind(|assignment| assignment.id == average.assignment_id)
                .map(|assignment| assignment.name.to_uppercase())
                .unwrap_or_else(|| format!("ASSIGNMENT {}", average.assignment_id));
            let _ = writeln!(
                output,
                "- {} ({}): {:.1}% over {} learners",
                name,
                average.assignment_id,
                average.avg_fraction * 100.0,
                average.learner_count
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::fixtures::sample_gradebook;
    use crate::grading::learner_data_with_clock;
    use chrono::TimeZone;

    #[test]
    fn averages_assignments_across_learners() {
        let input = sample_gradebook();
        let as_of = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let summaries = learner_data_with_clock(
            &input.course,
            &input.assignment_group,
            &input.submissions,
            &FixedClock(as_of),
        );

        let averages = summarize_by_assignment(&summaries);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].assignment_id, 1);
        assert_eq!(averages[0].learner_count, 2);
        assert!((averages[0].avg_fraction - 0.86).abs() < 1e-9);
    }

    #[test]
    fn report_lists_learners_and_assignments() {
        let input = sample_gradebook();
        let as_of = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let summaries = learner_data_with_clock(
            &input.course,
            &input.assignment_group,
            &input.submissions,
            &FixedClock(as_of),
        );

        let report = build_report(&input.course, &input.assignment_group, as_of, &summaries);
        assert!(report.contains("Introduction to JavaScript (451)"));
        assert!(report.contains("- Learner 125: 98.5% across 2 assignments"));
        assert!(report.contains("- Learner 132: 82.0% across 2 assignments"));
        assert!(report.contains("- DECLARE A VARIABLE (1): 86.0% over 2 learners"));
        assert!(!report.contains("CODE THE WORLD"));
    }

    #[test]
    fn duplicate_assignment_ids_use_the_last_name() {
        let mut input = sample_gradebook();
        input.assignment_group.assignments[1].id = 1;
        input.assignment_group.assignments[1].name = "Rewrite a Variable".to_string();
        let as_of = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let summaries = learner_data_with_clock(
            &input.course,
            &input.assignment_group,
            &input.submissions,
            &FixedClock(as_of),
        );

        let report = build_report(&input.course, &input.assignment_group, as_of, &summaries);
        assert!(report.contains("- REWRITE A VARIABLE (1):"));
        assert!(!report.contains("DECLARE A VARIABLE"));
    }

    #[test]
    fn empty_report_says_so() {
        let input = sample_gradebook();
        let as_of = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let report = build_report(&input.course, &input.assignment_group, as_of, &[]);
        assert_eq!(report.matches("No graded submissions.").count(), 2);
    }
}
