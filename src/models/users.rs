use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::courses::{Course, Enrollment, Grade};

/// Account classifier for a `User` row. Stored as the `Account` foreign key
/// (1 = Student, 2 = Teacher, 3 = Admin).
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

#[derive(Debug, thiserror::Error)]
#[error("{0} is not a valid role")]
pub struct InvalidRole(pub String);

impl Role {
    pub fn account_id(&self) -> i64 {
        match self {
            Role::Student => 1,
            Role::Teacher => 2,
            Role::Admin => 3,
        }
    }

    pub fn from_account_id(id: i64) -> Result<Self, InvalidRole> {
        match id {
            1 => Ok(Role::Student),
            2 => Ok(Role::Teacher),
            3 => Ok(Role::Admin),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Student" => Ok(Role::Student),
            "Teacher" => Ok(Role::Teacher),
            "Admin" => Ok(Role::Admin),
            _ => Err(InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
            Role::Admin => "Admin",
        };
        write!(f, "{}", token)
    }
}

/// Base identity shared by every account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub surname: String,
    pub birthdate: String,
    pub email: String,
    /// Derived by the database on insert: `<id>@idkUniversity.com`.
    pub uni_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub person: Person,
    /// Display name of the degree the student is enrolled in, if any.
    pub degree: Option<String>,
    pub courses: Vec<Enrollment>,
    pub grades: Vec<Grade>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub person: Person,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub person: Person,
}

/// A resolved account: the role flag on the `User` row decides which
/// variant gets built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum User {
    Student(Student),
    Teacher(Teacher),
    Admin(Admin),
}

impl User {
    pub fn person(&self) -> &Person {
        match self {
            User::Student(s) => &s.person,
            User::Teacher(t) => &t.person,
            User::Admin(a) => &a.person,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            User::Student(_) => Role::Student,
            User::Teacher(_) => Role::Teacher,
            User::Admin(_) => Role::Admin,
        }
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Surname is required"))]
    pub surname: String,
    #[validate(length(min = 1, message = "Birthdate is required"))]
    pub birthdate: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(length(min = 1, message = "Password confirmation is required"))]
    pub password_confirmation: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEmailRequest {
    #[validate(email(message = "Invalid email"))]
    pub new_email: String,
}
