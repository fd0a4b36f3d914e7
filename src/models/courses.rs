use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Course {
    #[sqlx(rename = "CourseId")]
    pub id: i64,
    #[sqlx(rename = "CourseName")]
    pub name: String,
    #[sqlx(rename = "PassingGrade")]
    pub passing_grade: i64,
    #[sqlx(rename = "Active")]
    pub active: bool,
}

/// A single graded task for a user in a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    pub course: Course,
    pub task: i64,
    pub grade: i64,
}

impl Grade {
    pub fn passed(&self) -> bool {
        self.grade >= self.course.passing_grade
    }
}

/// A user's membership in a course. `assigned` distinguishes a teaching
/// assignment from a student enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub course: Course,
    pub enrolled_at: Option<NaiveDateTime>,
    pub assigned: bool,
}
