use sqlx::SqlitePool;

use crate::core::AppError;
use crate::models::degrees::DegreeSummary;

const DEGREE_SELECT: &str =
    "SELECT Degrees.DegreeId AS degree_id,
            DegreeBase.BaseName AS base,
            DegreeBaseName.Name AS subject,
            DegreeType.TypeName AS specialization
     FROM Degrees
     JOIN DegreeBase ON DegreeBase.BaseId = Degrees.Base
     JOIN DegreeBaseName ON DegreeBaseName.BaseNameId = Degrees.BaseName
     JOIN DegreeType ON DegreeType.TypeId = Degrees.Type";

/// Every composed degree in the taxonomy, for the degree-picker screen.
pub async fn list_degrees(pool: &SqlitePool) -> Result<Vec<DegreeSummary>, AppError> {
    let degrees = sqlx::query_as::<_, DegreeSummary>(&format!(
        "{DEGREE_SELECT} ORDER BY Degrees.DegreeId"
    ))
    .fetch_all(pool)
    .await?;

    Ok(degrees)
}

pub async fn get_degree(pool: &SqlitePool, degree_id: i64) -> Result<DegreeSummary, AppError> {
    let degree = sqlx::query_as::<_, DegreeSummary>(&format!(
        "{DEGREE_SELECT} WHERE Degrees.DegreeId = ?"
    ))
    .bind(degree_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("No such degree"))?;

    Ok(degree)
}

/// The degree a student is enrolled in, if any.
pub async fn degree_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<DegreeSummary>, AppError> {
    let degree = sqlx::query_as::<_, DegreeSummary>(&format!(
        "{DEGREE_SELECT}
         JOIN Degree ON Degree.DegreeId = Degrees.DegreeId
         WHERE Degree.UserId = ?"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(degree)
}

/// Puts a student into a degree. One degree per student; switching degrees
/// is not a portal operation.
#[tracing::instrument(name = "Enrolling in degree", skip(pool))]
pub async fn enroll_in_degree(
    pool: &SqlitePool,
    user_id: i64,
    degree_id: i64,
) -> Result<(), AppError> {
    get_degree(pool, degree_id).await?;

    if degree_for_user(pool, user_id).await?.is_some() {
        return Err(AppError::conflict("Already enrolled in a degree"));
    }

    sqlx::query("INSERT INTO Degree (UserId, DegreeId) VALUES (?, ?)")
        .bind(user_id)
        .bind(degree_id)
        .execute(pool)
        .await?;

    Ok(())
}
