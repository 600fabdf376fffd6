pub mod gyms;
pub mod reviews;
pub mod users;
