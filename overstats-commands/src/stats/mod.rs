pub(crate) mod messages;
pub mod hero;
pub mod me;
pub mod save;
pub mod setchannel;
pub mod top;
