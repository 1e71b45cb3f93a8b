pub mod changes;
pub mod users;
