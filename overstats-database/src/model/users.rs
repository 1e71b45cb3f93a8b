use serde::{Deserialize, Serialize};

use crate::model::profile::ProfileSnapshot;
use crate::model::region::Region;

/// A registered player and their latest profile snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub handle: String,
    pub region: Region,
    pub notify_channel_id: Option<u64>,
    pub profile: Option<ProfileSnapshot>,
    pub registered_at: u64,
    pub profile_updated_at: Option<u64>,
}

/// Identity fields written by the registration path, along with the profile
/// fetched while validating the handle.
#[derive(Clone, Debug)]
pub struct NewRegistration {
    pub id: u64,
    pub handle: String,
    pub region: Region,
    pub profile: ProfileSnapshot,
}

/// Identity needed to re-fetch a user's profile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshTarget {
    pub id: u64,
    pub handle: String,
    pub region: Region,
}

/// One row of a field-ordered population query.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedEntry {
    pub user_id: u64,
    pub handle: String,
    pub region: Region,
    pub value: f64,
}

/// Outcome of a single-row write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// The row existed before the write.
    pub matched: bool,
    /// A new row was created.
    pub inserted: bool,
    /// The written columns differ from what was stored before.
    pub changed: bool,
}
