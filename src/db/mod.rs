pub mod opportunities;
pub mod sessions;
pub mod users;
