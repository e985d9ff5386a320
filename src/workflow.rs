use crate::model::{AttendanceRecord, Student};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("student name must not be blank")]
    BlankName,
    #[error("student already registered: {0}")]
    DuplicateName(String),
    #[error("student not found: {0}")]
    UnknownStudent(String),
    #[error("no student id left above {0}")]
    IdsExhausted(i64),
}

impl WorkflowError {
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::BlankName => "blank_name",
            WorkflowError::DuplicateName(_) => "duplicate_name",
            WorkflowError::UnknownStudent(_) => "unknown_student",
            WorkflowError::IdsExhausted(_) => "ids_exhausted",
        }
    }
}

pub fn next_student_id(roster: &[Student]) -> Result<i64, WorkflowError> {
    match roster.iter().map(|s| s.id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(WorkflowError::IdsExhausted(max)),
    }
}

/// Appends a new student. Names match case-sensitively after trimming.
pub fn register(
    roster: &[Student],
    name: &str,
    today: NaiveDate,
) -> Result<Vec<Student>, WorkflowError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WorkflowError::BlankName);
    }
    if roster.iter().any(|s| s.name == name) {
        return Err(WorkflowError::DuplicateName(name.to_string()));
    }
    let id = next_student_id(roster)?;
    let mut out = roster.to_vec();
    out.push(Student {
        id,
        name: name.to_string(),
        total_classes: 0,
        date_joined: today,
    });
    Ok(out)
}

/// Logs one session. The same student may be checked in more than once per day.
pub fn check_in(
    roster: &[Student],
    attendance: &[AttendanceRecord],
    student_name: &str,
    date: NaiveDate,
) -> Result<(Vec<Student>, Vec<AttendanceRecord>), WorkflowError> {
    let student_name = student_name.trim();
    let Some(pos) = roster.iter().position(|s| s.name == student_name) else {
        return Err(WorkflowError::UnknownStudent(student_name.to_string()));
    };

    let mut roster = roster.to_vec();
    let student = &mut roster[pos];
    student.total_classes = student.total_classes.saturating_add(1);

    let mut attendance = attendance.to_vec();
    attendance.push(AttendanceRecord {
        date,
        student_id: student.id,
        student_name: student.name.clone(),
    });
    Ok((roster, attendance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    fn student(id: i64, name: &str, total: u32) -> Student {
        Student {
            id,
            name: name.to_string(),
            total_classes: total,
            date_joined: d(2024, 1, 1),
        }
    }

    #[test]
    fn first_registration_gets_id_one() {
        assert_eq!(register(&[], "", d(2024, 3, 1)), Err(WorkflowError::BlankName));
        assert_eq!(register(&[], "  \t", d(2024, 3, 1)), Err(WorkflowError::BlankName));

        let roster = register(&[], "Ada", d(2024, 3, 1)).expect("register");
        assert_eq!(roster, vec![Student {
            id: 1,
            name: "Ada".to_string(),
            total_classes: 0,
            date_joined: d(2024, 3, 1),
        }]);
    }

    #[test]
    fn new_id_exceeds_every_prior_id() {
        let roster = vec![student(4, "A", 0), student(2, "B", 0), student(9, "C", 0)];
        let out = register(&roster, " Dee ", d(2024, 3, 1)).expect("register");
        assert_eq!(out.len(), roster.len() + 1);
        let added = out.last().expect("added");
        assert_eq!(added.name, "Dee");
        assert!(roster.iter().all(|s| s.id < added.id));
        assert_eq!(added.id, 10);
    }

    #[test]
    fn registration_fails_when_ids_run_out() {
        let roster = vec![student(i64::MAX, "A", 0)];
        let e = register(&roster, "B", d(2024, 3, 1)).unwrap_err();
        assert_eq!(e, WorkflowError::IdsExhausted(i64::MAX));
        assert_eq!(e.code(), "ids_exhausted");
        assert_eq!(next_student_id(&[student(i64::MAX - 1, "A", 0)]), Ok(i64::MAX));
    }

    #[test]
    fn duplicate_name_is_case_sensitive() {
        let roster = vec![student(1, "Ada", 3)];
        assert_eq!(
            register(&roster, "Ada", d(2024, 3, 1)),
            Err(WorkflowError::DuplicateName("Ada".to_string()))
        );
        let out = register(&roster, "ada", d(2024, 3, 1)).expect("different case");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn check_in_increments_once_and_appends_once() {
        let roster = vec![student(1, "Ada", 7), student(2, "Bo", 0)];
        let prior: Vec<AttendanceRecord> = (1..=7)
            .map(|day| AttendanceRecord {
                date: d(2024, 2, day),
                student_id: 1,
                student_name: "Ada".to_string(),
            })
            .collect();

        let (roster2, attendance2) = check_in(&roster, &prior, "Ada", d(2024, 3, 1)).expect("check in");
        assert_eq!(roster2[0].total_classes, 8);
        assert_eq!(roster2[1], roster[1]);
        assert_eq!(attendance2.len(), prior.len() + 1);
        assert_eq!(
            attendance2.last(),
            Some(&AttendanceRecord {
                date: d(2024, 3, 1),
                student_id: 1,
                student_name: "Ada".to_string(),
            })
        );
    }

    #[test]
    fn same_day_check_ins_both_count() {
        let roster = vec![student(1, "Ada", 0)];
        let (r1, a1) = check_in(&roster, &[], "Ada", d(2024, 3, 1)).expect("first");
        let (r2, a2) = check_in(&r1, &a1, "Ada", d(2024, 3, 1)).expect("second");
        assert_eq!(r2[0].total_classes, 2);
        assert_eq!(a2.len(), 2);
    }

    #[test]
    fn unknown_student_is_rejected() {
        let roster = vec![student(1, "Ada", 0)];
        let e = check_in(&roster, &[], "Grace", d(2024, 3, 1)).unwrap_err();
        assert_eq!(e, WorkflowError::UnknownStudent("Grace".to_string()));
        assert_eq!(e.code(), "unknown_student");
    }
}
