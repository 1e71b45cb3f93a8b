pub mod stats;
pub mod utility;

use overstats_core::{Data, Error};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::help::META,
    stats::save::META,
    stats::setchannel::META,
    stats::me::META,
    stats::hero::META,
    stats::top::META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::help::help(),
        stats::save::save(),
        stats::setchannel::setchannel(),
        stats::me::me(),
        stats::hero::hero(),
        stats::top::top(),
    ]
}
