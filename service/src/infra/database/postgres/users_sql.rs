//! SQL [`Statements`] selecting a [`Page`] of [`User`]s.
//!
//! [`Page`]: read::user::list::Page
//! [`User`]: crate::domain::User

use itertools::Itertools as _;
use postgres_types::ToSql;

use crate::read;

use super::SearchPattern;

/// Filtering `WHERE` predicate, shared by the fetch and count statements.
#[derive(Clone, Debug)]
pub(crate) struct Predicate {
    /// SQL text of this [`Predicate`].
    sql: String,

    /// [`SearchPattern`]s bound to the `$1`, `$2`, ... placeholders of this
    /// [`Predicate`].
    patterns: Vec<SearchPattern>,
}

impl Predicate {
    /// Composes a new [`Predicate`] out of the provided [`Filter`].
    ///
    /// Present search terms are combined with `OR`, while no terms at all
    /// result in a `TRUE` [`Predicate`]. A term containing NUL matches
    /// nothing and is not bound.
    ///
    /// [`Filter`]: read::user::list::Filter
    pub(crate) fn new(filter: &read::user::list::Filter) -> Self {
        let read::user::list::Filter { login, email } = filter;

        let mut patterns = Vec::with_capacity(2);
        let conditions = [("login", login), ("email", email)]
            .into_iter()
            .filter_map(|(column, term)| {
                let term: &str = term.as_ref()?.as_ref();
                // Text columns never contain NUL, and Postgres refuses to
                // bind it.
                if term.contains('\0') {
                    return Some("FALSE".to_owned());
                }
                patterns.push(SearchPattern::new(term));
                Some(format!("u.{column} ~* ${}::VARCHAR", patterns.len()))
            })
            .collect::<Vec<_>>();

        let sql = if conditions.is_empty() {
            "TRUE".to_owned()
        } else {
            conditions.iter().join(" OR ")
        };
        Self { sql, patterns }
    }
}

/// Parameterized statements fetching a [`Page`] of [`User`]s and counting all
/// the [`User`]s matching the same [`Predicate`].
///
/// Only whitelisted identifiers and keywords are inlined into the SQL text,
/// everything else is bound as a parameter.
///
/// [`Page`]: read::user::list::Page
/// [`User`]: crate::domain::User
#[derive(Clone, Debug)]
pub(crate) struct Statements {
    /// SQL text of the statement fetching the requested [`Page`].
    ///
    /// [`Page`]: read::user::list::Page
    pub(crate) fetch: String,

    /// SQL text of the statement counting all the matching rows.
    pub(crate) count: String,

    /// Shared [`Predicate`] of the statements.
    predicate: Predicate,

    /// Maximum number of rows to fetch.
    limit: i64,

    /// Number of rows to skip before fetching.
    offset: i64,
}

impl Statements {
    /// Builds new [`Statements`] for the provided [`Selector`].
    ///
    /// [`Selector`]: read::user::list::Selector
    pub(crate) fn build(selector: &read::user::list::Selector) -> Self {
        let read::user::list::Selector {
            arguments,
            filter,
            sorting: read::user::list::Sorting { by, order },
        } = selector;

        let predicate = Predicate::new(filter);
        let limit_idx = predicate.patterns.len() + 1;
        let offset_idx = limit_idx + 1;

        let fetch = format!(
            "SELECT u.id, u.login, u.password, u.email, u.created_at, \
                    ec.user_id AS ec_user_id, \
                    ec.is_confirmed AS ec_is_confirmed, \
                    ec.confirmation_code AS ec_confirmation_code, \
                    ec.expiration_date AS ec_expiration_date, \
                    rc.user_id AS rc_user_id, \
                    rc.is_confirmed AS rc_is_confirmed, \
                    rc.confirmation_code AS rc_confirmation_code \
             FROM users u \
             LEFT JOIN email_confirmation ec ON ec.user_id = u.id \
             LEFT JOIN recovery_code rc ON rc.user_id = u.id \
             WHERE {predicate} \
             ORDER BY u.{column}{collation} {order}, u.id ASC \
             LIMIT ${limit_idx}::INT8 \
             OFFSET ${offset_idx}::INT8",
            predicate = predicate.sql,
            column = by.column(),
            collation = if by.is_textual() { r#" COLLATE "C""# } else { "" },
            order = order.sql(),
        );
        let count = format!(
            "SELECT COUNT(*)::INT8 \
             FROM users u \
             WHERE {predicate}",
            predicate = predicate.sql,
        );

        Self {
            fetch,
            count,
            predicate,
            limit: i64::from(arguments.page_size()),
            offset: i64::try_from(arguments.offset()).unwrap_or(i64::MAX),
        }
    }

    /// Returns the parameters of the [`Statements::fetch`] statement.
    pub(crate) fn fetch_params(&self) -> Vec<&(dyn ToSql + Sync)> {
        let mut params = self.count_params();
        params.push(&self.limit);
        params.push(&self.offset);
        params
    }

    /// Returns the parameters of the [`Statements::count`] statement.
    pub(crate) fn count_params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.predicate
            .patterns
            .iter()
            .map(|p| -> &(dyn ToSql + Sync) { p })
            .collect()
    }
}

#[cfg(test)]
mod spec {
    use common::pagination::{Limits, Param};

    use crate::read::user::list::RawQuery;

    use super::{SearchPattern, Statements};

    fn build(query: RawQuery) -> Statements {
        Statements::build(&query.normalize(Limits::default()))
    }

    fn text(s: &str) -> Option<Param> {
        Some(Param::from(s))
    }

    /// Extracts the part of the `sql` between the provided markers.
    fn between<'s>(sql: &'s str, from: &str, to: &str) -> &'s str {
        let start = sql.find(from).unwrap() + from.len();
        let end = start + sql[start..].find(to).unwrap();
        sql[start..end].trim()
    }

    fn patterns(stmts: &Statements) -> Vec<&str> {
        stmts
            .predicate
            .patterns
            .iter()
            .map(SearchPattern::as_ref)
            .collect()
    }

    #[test]
    fn selects_everything_without_terms() {
        let stmts = build(RawQuery::default());

        assert_eq!(between(&stmts.fetch, "WHERE", "ORDER BY"), "TRUE");
        assert!(stmts.count.ends_with("WHERE TRUE"));
        assert!(patterns(&stmts).is_empty());
        assert_eq!(stmts.count_params().len(), 0);
        assert_eq!(stmts.fetch_params().len(), 2);
        assert!(stmts.fetch.contains("LIMIT $1::INT8"));
        assert!(stmts.fetch.contains("OFFSET $2::INT8"));
    }

    #[test]
    fn filters_by_login() {
        let stmts = build(RawQuery {
            search_login_term: text("al"),
            ..RawQuery::default()
        });

        assert_eq!(
            between(&stmts.fetch, "WHERE", "ORDER BY"),
            "u.login ~* $1::VARCHAR",
        );
        assert_eq!(patterns(&stmts), ["al"]);
        assert!(stmts.fetch.contains("LIMIT $2::INT8"));
        assert!(stmts.fetch.contains("OFFSET $3::INT8"));
    }

    #[test]
    fn filters_by_email() {
        let stmts = build(RawQuery {
            search_email_term: text("@y"),
            ..RawQuery::default()
        });

        assert_eq!(
            between(&stmts.fetch, "WHERE", "ORDER BY"),
            "u.email ~* $1::VARCHAR",
        );
        assert_eq!(patterns(&stmts), ["@y"]);
    }

    #[test]
    fn unites_both_terms() {
        let stmts = build(RawQuery {
            search_login_term: text("a"),
            search_email_term: text("y"),
            ..RawQuery::default()
        });

        let predicate = "u.login ~* $1::VARCHAR OR u.email ~* $2::VARCHAR";
        assert_eq!(between(&stmts.fetch, "WHERE", "ORDER BY"), predicate);
        assert!(stmts.count.ends_with(&format!("WHERE {predicate}")));
        assert_eq!(patterns(&stmts), ["a", "y"]);
        assert_eq!(stmts.count_params().len(), 2);
        assert_eq!(stmts.fetch_params().len(), 4);
        assert!(stmts.fetch.contains("LIMIT $3::INT8"));
        assert!(stmts.fetch.contains("OFFSET $4::INT8"));
    }

    #[test]
    fn never_binds_nul_terms() {
        let stmts = build(RawQuery {
            search_login_term: text("a\0b"),
            search_email_term: text("y"),
            ..RawQuery::default()
        });

        assert_eq!(
            between(&stmts.fetch, "WHERE", "ORDER BY"),
            "FALSE OR u.email ~* $1::VARCHAR",
        );
        assert_eq!(patterns(&stmts), ["y"]);
        assert_eq!(stmts.fetch_params().len(), 3);

        let stmts = build(RawQuery {
            search_login_term: text("\0"),
            ..RawQuery::default()
        });
        assert_eq!(between(&stmts.fetch, "WHERE", "ORDER BY"), "FALSE");
        assert!(stmts.count.ends_with("WHERE FALSE"));
        assert!(patterns(&stmts).is_empty());
    }

    #[test]
    fn escapes_search_terms() {
        let stmts = build(RawQuery {
            search_login_term: text("a.*"),
            ..RawQuery::default()
        });

        assert_eq!(patterns(&stmts), [r"a\.\*"]);
    }

    #[test]
    fn orders_by_creation_with_tie_break() {
        let stmts = build(RawQuery::default());

        assert_eq!(
            between(&stmts.fetch, "ORDER BY", "LIMIT"),
            "u.created_at DESC, u.id ASC",
        );
    }

    #[test]
    fn collates_textual_ordering() {
        let stmts = build(RawQuery {
            sort_by: text("login"),
            sort_direction: text("asc"),
            ..RawQuery::default()
        });
        assert_eq!(
            between(&stmts.fetch, "ORDER BY", "LIMIT"),
            r#"u.login COLLATE "C" ASC, u.id ASC"#,
        );

        let stmts = build(RawQuery {
            sort_by: text("email"),
            ..RawQuery::default()
        });
        assert_eq!(
            between(&stmts.fetch, "ORDER BY", "LIMIT"),
            r#"u.email COLLATE "C" DESC, u.id ASC"#,
        );
    }

    #[test]
    fn counts_without_joins() {
        let stmts = build(RawQuery::default());

        assert!(!stmts.count.contains("JOIN"));
        assert!(!stmts.count.contains("ORDER BY"));
        assert!(!stmts.count.contains("LIMIT"));
        assert!(stmts.fetch.contains("LEFT JOIN email_confirmation ec"));
        assert!(stmts.fetch.contains("LEFT JOIN recovery_code rc"));
    }

    #[test]
    fn computes_limit_and_offset() {
        let stmts = build(RawQuery {
            page_number: text("3"),
            page_size: text("20"),
            ..RawQuery::default()
        });

        assert_eq!(stmts.limit, 20);
        assert_eq!(stmts.offset, 40);
    }

    #[test]
    fn adversarial_input_keeps_statement_shape() {
        let default = build(RawQuery::default());

        for evil in [
            "'; DROP TABLE users;--",
            "created_at; DELETE FROM users",
            "login\" COLLATE \"C",
            "$1",
            "1 OR 1=1",
            "-1",
            "0",
            "desc, password",
        ] {
            let stmts = build(RawQuery {
                sort_by: text(evil),
                sort_direction: text(evil),
                page_number: text(evil),
                page_size: text(evil),
                ..RawQuery::default()
            });

            assert_eq!(stmts.fetch, default.fetch);
            assert_eq!(stmts.count, default.count);
            assert_eq!(stmts.limit, default.limit);
            assert_eq!(stmts.offset, default.offset);
        }
    }

    #[test]
    fn search_terms_never_reach_sql_text() {
        let evil = "'; DROP TABLE users;--";
        let stmts = build(RawQuery {
            search_login_term: text(evil),
            search_email_term: text(evil),
            ..RawQuery::default()
        });

        assert!(!stmts.fetch.contains(evil));
        assert!(!stmts.count.contains(evil));
        assert_eq!(patterns(&stmts), [evil, evil]);
    }
}
