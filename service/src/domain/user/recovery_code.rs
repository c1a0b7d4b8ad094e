//! [`RecoveryCode`] definitions.

#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

#[cfg(doc)]
use super::User;

/// Password recovery request of a [`User`].
///
/// A [`User`] has at most one [`RecoveryCode`].
#[derive(Clone, Debug)]
pub struct RecoveryCode {
    /// Indicator whether the recovery is confirmed already.
    pub is_confirmed: bool,

    /// [`Code`] issued for the recovery, if any.
    pub confirmation_code: Option<Code>,
}

/// Code confirming a password recovery.
#[derive(Clone, Eq, PartialEq, derive_more::Debug)]
#[debug("Code(*)")]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Code(String);
