pub mod gym;
pub mod review;
pub mod user;

pub use gym::{Gym, GymDistance, GymResponse, NearbyGym, TagCount, TopGym};
pub use review::{Review, ReviewWithAuthor};
pub use user::User;
