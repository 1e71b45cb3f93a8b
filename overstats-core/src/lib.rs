use overstats_database::Database;
use overstats_provider::OvrstatClient;

pub type Error = anyhow::Error;

/// State shared by every command invocation.
#[derive(Clone, Debug)]
pub struct Data {
    pub db: Database,
    pub provider: OvrstatClient,
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
