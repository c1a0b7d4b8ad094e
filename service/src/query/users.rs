//! [`Query`] collection related to the multiple [`User`]s.

use common::operations::{By, Commit, Select, Snapshot, Snapshotted};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    infra::{database, Database},
    read::user::list,
    Service,
};

use super::Query;

/// Queries a [`list::Page`] of [`User`]s.
///
/// The [`list::Page`] items and its total count are selected from the same
/// [`Snapshot`] of the [`Database`], so they never contradict each other.
#[derive(Clone, Debug, Default)]
pub struct List(pub list::RawQuery);

impl<Db> Query<List> for Service<Db>
where
    Db: Database<Snapshot, Err = Traced<database::Error>>,
    Snapshotted<Db>: Database<
            Select<By<Vec<list::Row>, list::Selector>>,
            Ok = Vec<list::Row>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<list::TotalCount, list::Selector>>,
            Ok = list::TotalCount,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        List(raw): List,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = raw.normalize(self.config().pagination);
        let arguments = selector.arguments;

        let tx = self
            .database()
            .execute(Snapshot)
            .await
            .map_err(tracerr::wrap!())?;
        let (rows, total_count) = futures::try_join!(
            tx.execute(Select(By::<Vec<_>, _>::new(selector.clone()))),
            tx.execute(Select(By::<list::TotalCount, _>::new(selector))),
        )
        .map_err(tracerr::wrap!())?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(list::Page::new(&arguments, rows, total_count.into()))
    }
}
