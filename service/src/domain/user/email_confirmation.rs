//! [`EmailConfirmation`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

#[cfg(doc)]
use super::User;

/// Confirmation of the [`User`]'s email address.
///
/// A [`User`] has at most one [`EmailConfirmation`].
#[derive(Clone, Debug)]
pub struct EmailConfirmation {
    /// Indicator whether the email address is confirmed already.
    pub is_confirmed: bool,

    /// [`Code`] sent to the email address, if any.
    pub confirmation_code: Option<Code>,

    /// [`DateTime`] after which the [`Code`] is no longer accepted.
    pub expiration_date: Option<ExpirationDateTime>,
}

/// Code confirming an email address.
#[derive(Clone, Eq, PartialEq, derive_more::Debug)]
#[debug("Code(*)")]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Code(String);

/// [`DateTime`] when an [`EmailConfirmation`] [`Code`] expires.
pub type ExpirationDateTime = DateTimeOf<(EmailConfirmation, unit::Expiration)>;
