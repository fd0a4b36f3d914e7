use chrono::{NaiveDateTime, Utc};
use sqlx::SqlitePool;

use crate::core::AppError;
use crate::models::courses::{Course, Enrollment, Grade};

#[derive(sqlx::FromRow)]
struct EnrollmentRow {
    #[sqlx(rename = "CourseId")]
    course_id: i64,
    #[sqlx(rename = "CourseName")]
    course_name: String,
    #[sqlx(rename = "PassingGrade")]
    passing_grade: i64,
    #[sqlx(rename = "Active")]
    active: bool,
    #[sqlx(rename = "EnrolledAt")]
    enrolled_at: Option<NaiveDateTime>,
    #[sqlx(rename = "Assigned")]
    assigned: bool,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Enrollment {
            course: Course {
                id: row.course_id,
                name: row.course_name,
                passing_grade: row.passing_grade,
                active: row.active,
            },
            enrolled_at: row.enrolled_at,
            assigned: row.assigned,
        }
    }
}

pub async fn get_course(pool: &SqlitePool, course_id: i64) -> Result<Course, AppError> {
    let course = sqlx::query_as::<_, Course>(
        "SELECT CourseId, CourseName, PassingGrade, Active FROM Course WHERE CourseId = ?",
    )
    .bind(course_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("No such course"))?;

    Ok(course)
}

/// Courses a student is enrolled in (teaching assignments excluded).
pub async fn enrolled_courses(pool: &SqlitePool, user_id: i64) -> Result<Vec<Enrollment>, AppError> {
    let rows = sqlx::query_as::<_, EnrollmentRow>(
        "SELECT Course.CourseId, Course.CourseName, Course.PassingGrade, Course.Active,
                CourseEnrollments.EnrolledAt, CourseEnrollments.Assigned
         FROM CourseEnrollments
         JOIN Course ON Course.CourseId = CourseEnrollments.CourseId
         WHERE CourseEnrollments.UserId = ? AND CourseEnrollments.Assigned = 0
         ORDER BY Course.CourseId",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Enrollment::from).collect())
}

/// Courses a teacher has been assigned to.
pub async fn courses_taught(pool: &SqlitePool, user_id: i64) -> Result<Vec<Course>, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT Course.CourseId, Course.CourseName, Course.PassingGrade, Course.Active
         FROM CourseEnrollments
         JOIN Course ON Course.CourseId = CourseEnrollments.CourseId
         WHERE CourseEnrollments.UserId = ? AND CourseEnrollments.Assigned = 1
         ORDER BY Course.CourseId",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(courses)
}

/// Active courses belonging to the student's degree that the student has not
/// enrolled in yet. Resolved through the degree taxonomy: the student's
/// `Degree` row names a composed degree, and `Connection` maps that degree
/// to its courses.
#[tracing::instrument(name = "Resolving eligible courses", skip(pool))]
pub async fn eligible_courses(pool: &SqlitePool, user_id: i64) -> Result<Vec<Course>, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT Course.CourseId, Course.CourseName, Course.PassingGrade, Course.Active
         FROM Course
         JOIN Connection ON Connection.CourseId = Course.CourseId
         JOIN Degree ON Degree.DegreeId = Connection.DegreeId
         WHERE Degree.UserId = ?
           AND Course.Active = 1
           AND Course.CourseId NOT IN
               (SELECT CourseId FROM CourseEnrollments WHERE UserId = ?)
         ORDER BY Course.CourseId",
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(courses)
}

async fn insert_enrollment(
    pool: &SqlitePool,
    user_id: i64,
    course_id: i64,
    assigned: bool,
) -> Result<(), AppError> {
    // Surfacing the duplicate before the insert keeps the error message
    // usable; the primary key still backstops a race.
    let already: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM CourseEnrollments WHERE UserId = ? AND CourseId = ?",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await?;

    if already > 0 {
        return Err(AppError::conflict("Already enrolled in this course"));
    }

    sqlx::query(
        "INSERT INTO CourseEnrollments (UserId, CourseId, EnrolledAt, Assigned)
         VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(Utc::now().naive_utc())
    .bind(assigned)
    .execute(pool)
    .await?;

    Ok(())
}

#[tracing::instrument(name = "Enrolling in course", skip(pool))]
pub async fn enroll(pool: &SqlitePool, user_id: i64, course_id: i64) -> Result<(), AppError> {
    let course = get_course(pool, course_id).await?;
    if !course.active {
        return Err(AppError::validation_error("Course is not active"));
    }

    insert_enrollment(pool, user_id, course_id, false).await
}

/// Assigns a teacher to a course. Unlike student enrollment this is allowed
/// on inactive courses, so a course can be staffed before it opens.
#[tracing::instrument(name = "Assigning course", skip(pool))]
pub async fn assign_course(
    pool: &SqlitePool,
    teacher_id: i64,
    course_id: i64,
) -> Result<(), AppError> {
    get_course(pool, course_id).await?;
    insert_enrollment(pool, teacher_id, course_id, true).await
}

#[derive(sqlx::FromRow)]
struct GradeRow {
    #[sqlx(rename = "CourseId")]
    course_id: i64,
    #[sqlx(rename = "CourseName")]
    course_name: String,
    #[sqlx(rename = "PassingGrade")]
    passing_grade: i64,
    #[sqlx(rename = "Active")]
    active: bool,
    #[sqlx(rename = "Task")]
    task: i64,
    #[sqlx(rename = "Grade")]
    grade: i64,
}

pub async fn grades_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Grade>, AppError> {
    let rows = sqlx::query_as::<_, GradeRow>(
        "SELECT Course.CourseId, Course.CourseName, Course.PassingGrade, Course.Active,
                Grade.Task, Grade.Grade
         FROM Grade
         JOIN Course ON Course.CourseId = Grade.CourseId
         WHERE Grade.UserId = ?
         ORDER BY Course.CourseId, Grade.Task",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let grades = rows
        .into_iter()
        .map(|row| Grade {
            course: Course {
                id: row.course_id,
                name: row.course_name,
                passing_grade: row.passing_grade,
                active: row.active,
            },
            task: row.task,
            grade: row.grade,
        })
        .collect();

    Ok(grades)
}

/// Records (or corrects) the grade for one task of a course.
#[tracing::instrument(name = "Recording grade", skip(pool))]
pub async fn record_grade(
    pool: &SqlitePool,
    user_id: i64,
    course_id: i64,
    task: i64,
    grade: i64,
) -> Result<(), AppError> {
    if !(0..=100).contains(&grade) {
        return Err(AppError::validation_error("Grade must be between 0 and 100"));
    }
    get_course(pool, course_id).await?;

    sqlx::query(
        "INSERT INTO Grade (UserId, CourseId, Task, Grade)
         VALUES (?, ?, ?, ?)
         ON CONFLICT (UserId, CourseId, Task) DO UPDATE SET Grade = excluded.Grade",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(task)
    .bind(grade)
    .execute(pool)
    .await?;

    Ok(())
}

#[tracing::instrument(name = "Creating course", skip(pool))]
pub async fn create_course(
    pool: &SqlitePool,
    name: &str,
    passing_grade: i64,
) -> Result<Course, AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation_error("Course name is required"));
    }
    if !(0..=100).contains(&passing_grade) {
        return Err(AppError::validation_error(
            "Passing grade must be between 0 and 100",
        ));
    }

    let course = sqlx::query_as::<_, Course>(
        "INSERT INTO Course (CourseName, PassingGrade) VALUES (?, ?)
         RETURNING CourseId, CourseName, PassingGrade, Active",
    )
    .bind(name)
    .bind(passing_grade)
    .fetch_one(pool)
    .await?;

    Ok(course)
}

pub async fn set_course_active(
    pool: &SqlitePool,
    course_id: i64,
    active: bool,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE Course SET Active = ? WHERE CourseId = ?")
        .bind(active)
        .bind(course_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("No such course"));
    }

    Ok(())
}
