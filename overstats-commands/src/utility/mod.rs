pub(crate) mod embeds;
pub mod help;
