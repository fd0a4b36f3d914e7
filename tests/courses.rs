mod helpers;

use claim::{assert_err, assert_ok, assert_some};
use helpers::{create_student, create_teacher, spawn_db};

use roll_call::core::AppErrorType;
use roll_call::db::{courses, degrees, users};
use roll_call::models::users::User;

// Seeded taxonomy: degree 1 is "Bachelors of Computer Science (Software
// Engineering)", connected to courses 1-3 (active) and 6 (inactive).

#[tokio::test]
async fn eligible_courses_follow_the_degree_and_skip_inactive_ones() {
    let pool = spawn_db().await;

    let student = create_student(&pool).await;
    let student_id = student.person().id;

    // No degree yet, so nothing is eligible.
    let eligible = assert_ok!(courses::eligible_courses(&pool, student_id).await);
    assert!(eligible.is_empty());

    assert_ok!(degrees::enroll_in_degree(&pool, student_id, 1).await);

    let eligible = assert_ok!(courses::eligible_courses(&pool, student_id).await);
    let ids: Vec<i64> = eligible.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(eligible.iter().all(|c| c.active));
}

#[tokio::test]
async fn enrolling_moves_a_course_from_eligible_to_enrolled() {
    let pool = spawn_db().await;

    let student = create_student(&pool).await;
    let student_id = student.person().id;
    assert_ok!(degrees::enroll_in_degree(&pool, student_id, 1).await);

    assert_ok!(courses::enroll(&pool, student_id, 1).await);

    let eligible = assert_ok!(courses::eligible_courses(&pool, student_id).await);
    let ids: Vec<i64> = eligible.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![2, 3]);

    let enrolled = assert_ok!(courses::enrolled_courses(&pool, student_id).await);
    assert_eq!(enrolled.len(), 1);
    assert_eq!(enrolled[0].course.id, 1);
    assert!(!enrolled[0].assigned);
    assert_some!(enrolled[0].enrolled_at);
}

#[tokio::test]
async fn double_enrollment_is_a_conflict_and_inactive_courses_are_closed() {
    let pool = spawn_db().await;

    let student = create_student(&pool).await;
    let student_id = student.person().id;
    assert_ok!(degrees::enroll_in_degree(&pool, student_id, 1).await);

    assert_ok!(courses::enroll(&pool, student_id, 1).await);
    let error = assert_err!(courses::enroll(&pool, student_id, 1).await);
    assert_eq!(error.error_type, AppErrorType::ConflictError);

    // Course 6 belongs to the degree but is inactive.
    let error = assert_err!(courses::enroll(&pool, student_id, 6).await);
    assert_eq!(error.error_type, AppErrorType::PayloadValidationError);

    let error = assert_err!(courses::enroll(&pool, student_id, 4242).await);
    assert_eq!(error.error_type, AppErrorType::NotFoundError);
}

#[tokio::test]
async fn teaching_assignments_are_flagged_and_kept_apart_from_enrollments() {
    let pool = spawn_db().await;

    let teacher = create_teacher(&pool).await;
    let teacher_id = teacher.person().id;

    assert_ok!(courses::assign_course(&pool, teacher_id, 3).await);
    // Staffing an inactive course is allowed.
    assert_ok!(courses::assign_course(&pool, teacher_id, 6).await);

    let taught = assert_ok!(courses::courses_taught(&pool, teacher_id).await);
    let ids: Vec<i64> = taught.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 6]);

    // Assignments must not show up as student enrollments.
    let enrolled = assert_ok!(courses::enrolled_courses(&pool, teacher_id).await);
    assert!(enrolled.is_empty());

    match users::get_user_by_id(&pool, teacher_id).await.unwrap() {
        User::Teacher(t) => assert_eq!(t.courses.len(), 2),
        other => panic!("Expected a teacher, got {:?}", other.role()),
    }
}

#[tokio::test]
async fn grades_join_back_to_their_courses_and_honor_the_passing_grade() {
    let pool = spawn_db().await;

    let student = create_student(&pool).await;
    let student_id = student.person().id;
    assert_ok!(degrees::enroll_in_degree(&pool, student_id, 1).await);
    assert_ok!(courses::enroll(&pool, student_id, 3).await);

    // Course 3 (Algorithms) has a passing grade of 60.
    assert_ok!(courses::record_grade(&pool, student_id, 3, 1, 55).await);
    assert_ok!(courses::record_grade(&pool, student_id, 3, 2, 80).await);

    let grades = assert_ok!(courses::grades_for_user(&pool, student_id).await);
    assert_eq!(grades.len(), 2);
    assert_eq!(grades[0].course.name, "Algorithms");
    assert!(!grades[0].passed());
    assert!(grades[1].passed());

    // Re-recording a task corrects the stored grade.
    assert_ok!(courses::record_grade(&pool, student_id, 3, 1, 65).await);
    let grades = assert_ok!(courses::grades_for_user(&pool, student_id).await);
    assert_eq!(grades.len(), 2);
    assert_eq!(grades[0].grade, 65);
    assert!(grades[0].passed());
}

#[tokio::test]
async fn out_of_range_grades_are_rejected() {
    let pool = spawn_db().await;

    let student = create_student(&pool).await;
    let student_id = student.person().id;

    let error = assert_err!(courses::record_grade(&pool, student_id, 3, 1, 101).await);
    assert_eq!(error.error_type, AppErrorType::PayloadValidationError);

    let error = assert_err!(courses::record_grade(&pool, student_id, 3, 1, -1).await);
    assert_eq!(error.error_type, AppErrorType::PayloadValidationError);
}

#[tokio::test]
async fn a_resolved_student_carries_degree_courses_and_grades() {
    let pool = spawn_db().await;

    let student = create_student(&pool).await;
    let student_id = student.person().id;
    assert_ok!(degrees::enroll_in_degree(&pool, student_id, 1).await);
    assert_ok!(courses::enroll(&pool, student_id, 1).await);
    assert_ok!(courses::record_grade(&pool, student_id, 1, 1, 70).await);

    match users::get_user_by_id(&pool, student_id).await.unwrap() {
        User::Student(s) => {
            assert_eq!(
                s.degree.as_deref(),
                Some("Bachelors of Computer Science (Software Engineering)")
            );
            assert_eq!(s.courses.len(), 1);
            assert_eq!(s.grades.len(), 1);
        }
        other => panic!("Expected a student, got {:?}", other.role()),
    }
}

#[tokio::test]
async fn created_courses_start_active_and_can_be_closed() {
    let pool = spawn_db().await;

    let course = assert_ok!(courses::create_course(&pool, "Compilers", 60).await);
    assert!(course.active);
    assert_eq!(course.passing_grade, 60);

    assert_ok!(courses::set_course_active(&pool, course.id, false).await);
    let reloaded = assert_ok!(courses::get_course(&pool, course.id).await);
    assert!(!reloaded.active);

    let error = assert_err!(courses::create_course(&pool, "  ", 50).await);
    assert_eq!(error.error_type, AppErrorType::PayloadValidationError);

    let error = assert_err!(courses::create_course(&pool, "Compilers II", 101).await);
    assert_eq!(error.error_type, AppErrorType::PayloadValidationError);
}
