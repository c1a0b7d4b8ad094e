//! [`Query`] collection related to a single [`User`].

use common::operations::By;

#[cfg(doc)]
use crate::{domain::User, Query};
use crate::{domain::user, read};

use super::DatabaseQuery;

/// Queries a [`read::user::Projection`] of a [`User`] by its [`user::Id`].
///
/// [`None`] means there is no such [`User`].
pub type ById = DatabaseQuery<By<Option<read::user::Projection>, user::Id>>;
