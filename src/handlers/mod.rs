pub mod achievements;
pub mod admissions;
pub mod auth;
pub mod branches;
pub mod gallery;
pub mod health;
pub mod notices;
pub mod payments;
pub mod users;
