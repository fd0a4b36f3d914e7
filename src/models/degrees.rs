use serde::{Deserialize, Serialize};

/// One composed degree out of the three-dimensional taxonomy:
/// base (Bachelors/Masters/PhD) x subject area x specialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct DegreeSummary {
    pub degree_id: i64,
    pub base: String,
    pub subject: String,
    pub specialization: String,
}

impl std::fmt::Display for DegreeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} ({})",
            self.base, self.subject, self.specialization
        )
    }
}
