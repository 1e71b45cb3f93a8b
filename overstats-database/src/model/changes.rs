use crate::model::users::UserRecord;

/// Before/after pair emitted by the change feed for one row mutation.
///
/// `old` is absent for inserts. Either side is also absent when its stored
/// document could not be decoded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeEvent {
    pub old: Option<UserRecord>,
    pub new: Option<UserRecord>,
}
