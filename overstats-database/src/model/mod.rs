pub mod changes;
pub mod profile;
pub mod region;
pub mod users;
