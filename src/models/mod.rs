pub mod courses;
pub mod degrees;
pub mod users;
