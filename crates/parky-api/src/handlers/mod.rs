//! API handlers

pub mod health;
pub mod national_parks;
pub mod trails;
pub mod users;
