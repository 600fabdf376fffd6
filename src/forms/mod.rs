pub mod account;
pub mod gym;
pub mod review;
