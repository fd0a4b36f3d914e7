use sqlx::SqlitePool;
use validator::Validate;

use crate::core::validation::{
    hash_password, validate_date, validate_name, verify_password,
};
use crate::core::AppError;
use crate::db::{courses, degrees};
use crate::models::users::{
    Admin, ChangeEmailRequest, ChangePasswordRequest, Person, RegisterRequest, Role, Student,
    Teacher, User,
};

#[derive(sqlx::FromRow)]
struct UserRow {
    #[sqlx(rename = "Id")]
    id: i64,
    #[sqlx(rename = "FirstName")]
    first_name: String,
    #[sqlx(rename = "Surname")]
    surname: String,
    #[sqlx(rename = "Birth")]
    birth: String,
    #[sqlx(rename = "Email")]
    email: String,
    #[sqlx(rename = "UniEmail")]
    uni_email: Option<String>,
    #[sqlx(rename = "Password")]
    password: String,
    #[sqlx(rename = "Account")]
    account: Option<i64>,
}

impl UserRow {
    fn role(&self) -> Result<Role, AppError> {
        // The insert trigger backfills the role flag; a NULL here means the
        // row predates the trigger and is treated as a plain student.
        Role::from_account_id(self.account.unwrap_or(1)).map_err(AppError::internal_error)
    }

    fn into_person(self) -> Person {
        Person {
            id: self.id,
            first_name: self.first_name,
            surname: self.surname,
            birthdate: self.birth,
            email: self.email,
            uni_email: self.uni_email,
        }
    }
}

async fn fetch_user_row(pool: &SqlitePool, user_id: i64) -> Result<UserRow, AppError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT Id, FirstName, Surname, Birth, Email, UniEmail, Password, Account
         FROM User
         WHERE Id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("No such user"))?;

    Ok(row)
}

/// Builds the role-tagged record for an already-verified row.
async fn resolve_user(pool: &SqlitePool, row: UserRow) -> Result<User, AppError> {
    let role = row.role()?;
    let user_id = row.id;
    let person = row.into_person();

    let user = match role {
        Role::Student => {
            let degree = degrees::degree_for_user(pool, user_id)
                .await?
                .map(|d| d.to_string());
            let courses = courses::enrolled_courses(pool, user_id).await?;
            let grades = courses::grades_for_user(pool, user_id).await?;
            User::Student(Student {
                person,
                degree,
                courses,
                grades,
            })
        }
        Role::Teacher => {
            let courses = courses::courses_taught(pool, user_id).await?;
            User::Teacher(Teacher { person, courses })
        }
        Role::Admin => User::Admin(Admin { person }),
    };

    Ok(user)
}

#[tracing::instrument(name = "Registering user", skip(pool, request))]
pub async fn create_user(pool: &SqlitePool, request: &RegisterRequest) -> Result<User, AppError> {
    request.validate()?;

    if !validate_name(&request.first_name) || !validate_name(&request.surname) {
        return Err(AppError::validation_error("Missing name"));
    }
    if !validate_date(&request.birthdate) {
        return Err(AppError::validation_error("Incorrect date/format"));
    }
    if request.password != request.password_confirmation {
        return Err(AppError::validation_error("Wrong password"));
    }
    if email_exists(pool, &request.email).await? {
        return Err(AppError::conflict(
            "An account with this email already exists",
        ));
    }

    let password_hash = hash_password(&request.password)?;

    // Account and UniEmail are filled in by the insert triggers.
    let result = sqlx::query(
        "INSERT INTO User (FirstName, Surname, Birth, Email, Password)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&request.first_name)
    .bind(&request.surname)
    .bind(&request.birthdate)
    .bind(&request.email)
    .bind(&password_hash)
    .execute(pool)
    .await?;

    get_user_by_id(pool, result.last_insert_rowid()).await
}

/// Maps a login credential to the role-tagged user record. Unknown emails
/// and wrong passwords fail the same way, and the role-specific fields are
/// only loaded once the password has been verified.
#[tracing::instrument(name = "Authenticating user", skip(pool, password))]
pub async fn authenticate(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT Id, FirstName, Surname, Birth, Email, UniEmail, Password, Account
         FROM User
         WHERE Email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    if !verify_password(password, &row.password)? {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    resolve_user(pool, row).await
}

pub async fn get_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<User, AppError> {
    let row = fetch_user_row(pool, user_id).await?;
    resolve_user(pool, row).await
}

pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM User WHERE Email = ?")
        .bind(email)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

#[tracing::instrument(name = "Changing password", skip(pool, request))]
pub async fn change_password(
    pool: &SqlitePool,
    user_id: i64,
    request: &ChangePasswordRequest,
) -> Result<(), AppError> {
    request.validate()?;

    let row = fetch_user_row(pool, user_id).await?;
    if !verify_password(&request.current_password, &row.password)? {
        return Err(AppError::unauthorized("Current password is incorrect"));
    }

    let password_hash = hash_password(&request.new_password)?;

    sqlx::query("UPDATE User SET Password = ? WHERE Id = ?")
        .bind(&password_hash)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[tracing::instrument(name = "Changing email", skip(pool, request))]
pub async fn change_email(
    pool: &SqlitePool,
    user_id: i64,
    request: &ChangeEmailRequest,
) -> Result<(), AppError> {
    request.validate()?;

    if email_exists(pool, &request.new_email).await? {
        return Err(AppError::conflict(
            "An account with this email already exists",
        ));
    }

    let result = sqlx::query("UPDATE User SET Email = ? WHERE Id = ?")
        .bind(&request.new_email)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("No such user"));
    }

    Ok(())
}

/// Admin promotion path. The insert trigger forces every new account to
/// Student, so Teacher/Admin roles are always granted after the fact.
#[tracing::instrument(name = "Setting account role", skip(pool))]
pub async fn set_account_role(
    pool: &SqlitePool,
    user_id: i64,
    role: Role,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE User SET Account = ? WHERE Id = ?")
        .bind(role.account_id())
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("No such user"));
    }

    Ok(())
}
