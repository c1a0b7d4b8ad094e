//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{
            self,
            postgres::{self, users_sql::Statements, Connection},
            Postgres,
        },
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<read::user::Projection>, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::user::Projection>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::user::Projection>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, login, email, created_at \
            FROM users \
            WHERE id = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        Ok(Some(read::user::Projection {
            id: row.try_get("id").map_err(decoding_error)?,
            login: row.try_get("login").map_err(decoding_error)?,
            email: row.try_get("email").map_err(decoding_error)?,
            created_at: row.try_get("created_at").map_err(decoding_error)?,
        }))
    }
}

impl<C>
    Database<
        Select<By<Vec<read::user::list::Row>, read::user::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::user::list::Row>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::user::list::Row>, read::user::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let stmts = Statements::build(by.as_inner());

        self.query(stmts.fetch.as_str(), &stmts.fetch_params())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(list_row)
            .collect::<Result<_, _>>()
            .map_err(decoding_error)
    }
}

impl<C>
    Database<
        Select<By<read::user::list::TotalCount, read::user::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::user::list::TotalCount, read::user::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let stmts = Statements::build(by.as_inner());

        let count: i64 = self
            .query(stmts.count.as_str(), &stmts.count_params())
            .await
            .map_err(tracerr::wrap!())?
            .first()
            .map_or(Ok(0), |row| row.try_get(0))
            .map_err(decoding_error)?;
        // `COUNT(*)` is never negative.
        Ok(u64::try_from(count).unwrap_or_default().into())
    }
}

/// Decodes a [`read::user::list::Row`] out of the provided fetched [`Row`].
fn list_row(row: &Row) -> Result<read::user::list::Row, tokio_postgres::Error> {
    let email_confirmation = row
        .try_get::<_, Option<user::Id>>("ec_user_id")?
        .map(|_| {
            Ok::<_, tokio_postgres::Error>(user::EmailConfirmation {
                is_confirmed: row
                    .try_get::<_, Option<bool>>("ec_is_confirmed")?
                    .unwrap_or_default(),
                confirmation_code: row.try_get("ec_confirmation_code")?,
                expiration_date: row.try_get("ec_expiration_date")?,
            })
        })
        .transpose()?;
    let recovery_code = row
        .try_get::<_, Option<user::Id>>("rc_user_id")?
        .map(|_| {
            Ok::<_, tokio_postgres::Error>(user::RecoveryCode {
                is_confirmed: row
                    .try_get::<_, Option<bool>>("rc_is_confirmed")?
                    .unwrap_or_default(),
                confirmation_code: row.try_get("rc_confirmation_code")?,
            })
        })
        .transpose()?;

    Ok(read::user::list::Row {
        user: User {
            id: row.try_get("id")?,
            login: row.try_get("login")?,
            password_hash: row.try_get("password")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
        },
        email_confirmation,
        recovery_code,
    })
}

/// Wraps the provided column decoding error into a [`database::Error`].
fn decoding_error(e: tokio_postgres::Error) -> Traced<database::Error> {
    tracerr::new!(database::Error::from(postgres::Error::from(e)))
}
