//! [`User`] read model definition.

use serde::Serialize;

use crate::domain::{user, User};

/// Public view of a [`User`].
///
/// Carries no credentials nor confirmation codes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// ID of the [`User`].
    pub id: user::Id,

    /// [`user::Login`] of the [`User`].
    pub login: user::Login,

    /// [`user::Email`] of the [`User`].
    pub email: user::Email,

    /// [`user::CreationDateTime`] of the [`User`].
    pub created_at: user::CreationDateTime,
}

impl From<User> for Projection {
    fn from(user: User) -> Self {
        let User {
            id,
            login,
            password_hash: _,
            email,
            created_at,
        } = user;
        Self {
            id,
            login,
            email,
            created_at,
        }
    }
}

pub mod list {
    //! [`User`]s list definitions.

    use common::{
        define_pagination,
        pagination::{Limits, Order, Param},
    };
    use derive_more::{AsRef, Display, From, Into};
    use serde::Deserialize;
    use tracing as log;

    use crate::domain::{user, User};

    use super::Projection;

    define_pagination!(Projection, Filter, Sorting);

    /// Query for a [`Page`] of [`User`]s, as it was received from a caller.
    ///
    /// Every field is optional and accepts values of any type, so a
    /// well-formed envelope is never rejected.
    #[derive(Clone, Debug, Default, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct RawQuery {
        /// Part of a [`user::Login`] to search for.
        pub search_login_term: Option<Param>,

        /// Part of a [`user::Email`] to search for.
        pub search_email_term: Option<Param>,

        /// Name of the field to sort by.
        pub sort_by: Option<Param>,

        /// Direction to sort in.
        pub sort_direction: Option<Param>,

        /// Number of the requested [`Page`].
        pub page_number: Option<Param>,

        /// Maximum number of [`User`]s on the requested [`Page`].
        pub page_size: Option<Param>,
    }

    impl RawQuery {
        /// Collects a [`RawQuery`] out of the provided textual key-value
        /// pairs (such as the ones of a URL query string).
        ///
        /// Only the first occurrence of a key is kept, and unknown keys are
        /// ignored.
        #[must_use]
        pub fn from_pairs<K, V>(
            pairs: impl IntoIterator<Item = (K, V)>,
        ) -> Self
        where
            K: AsRef<str>,
            V: Into<String>,
        {
            let mut raw = Self::default();
            for (key, value) in pairs {
                let key = key.as_ref();
                let field = match key {
                    "searchLoginTerm" => &mut raw.search_login_term,
                    "searchEmailTerm" => &mut raw.search_email_term,
                    "sortBy" => &mut raw.sort_by,
                    "sortDirection" => &mut raw.sort_direction,
                    "pageNumber" => &mut raw.page_number,
                    "pageSize" => &mut raw.page_size,
                    _ => continue,
                };
                if field.is_some() {
                    log::debug!("duplicated `{key}` ignored");
                    continue;
                }
                *field = Some(Param::Text(value.into()));
            }
            raw
        }

        /// Normalizes this [`RawQuery`] into a [`Selector`].
        ///
        /// Never fails: every missing or invalid field is replaced with its
        /// default value.
        #[must_use]
        pub fn normalize(self, limits: Limits) -> Selector {
            let Self {
                search_login_term,
                search_email_term,
                sort_by,
                sort_direction,
                page_number,
                page_size,
            } = self;

            let filter = Filter {
                login: search_login_term
                    .as_ref()
                    .and_then(Param::to_text)
                    .and_then(SearchTerm::new),
                email: search_email_term
                    .as_ref()
                    .and_then(Param::to_text)
                    .and_then(SearchTerm::new),
            };

            let by = sort_by.as_ref().and_then(Param::to_text);
            let order = sort_direction.as_ref().and_then(Param::to_text);
            let sorting = Sorting {
                by: by.as_deref().and_then(SortBy::parse).unwrap_or_else(|| {
                    if let Some(by) = &by {
                        log::debug!("unknown `sortBy` `{by}` repaired");
                    }
                    SortBy::default()
                }),
                order: order.as_deref().and_then(Order::parse).unwrap_or_else(
                    || {
                        if let Some(order) = &order {
                            log::debug!(
                                "unknown `sortDirection` `{order}` repaired",
                            );
                        }
                        Order::default()
                    },
                ),
            };

            let arguments = Arguments::normalize(
                page_number.as_ref(),
                page_size.as_ref(),
                limits,
            );
            if page_number.is_some_and(|n| {
                n.to_positive() != Some(arguments.page_number())
            }) || page_size
                .is_some_and(|s| s.to_positive() != Some(arguments.page_size()))
            {
                log::debug!("pagination repaired into {arguments:?}");
            }

            Selector {
                arguments,
                filter,
                sorting,
            }
        }
    }

    /// Filter for [`Selector`].
    ///
    /// [`User`]s matching any of the present terms are selected, or every
    /// [`User`] if no term is present.
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Filter {
        /// [`SearchTerm`] to look for in a [`user::Login`].
        pub login: Option<SearchTerm>,

        /// [`SearchTerm`] to look for in a [`user::Email`].
        pub email: Option<SearchTerm>,
    }

    /// Case-insensitive substring to search for.
    ///
    /// Never blank.
    #[derive(AsRef, Clone, Debug, Display, Eq, Into, PartialEq)]
    #[as_ref(str, String)]
    pub struct SearchTerm(String);

    impl SearchTerm {
        /// Creates a new [`SearchTerm`] out of the provided `term`.
        ///
        /// [`None`] is returned if the `term` is blank.
        #[must_use]
        pub fn new(term: impl Into<String>) -> Option<Self> {
            let term = term.into();
            (!term.trim().is_empty()).then_some(Self(term))
        }
    }

    /// Sorting for [`Selector`].
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Sorting {
        /// Field to sort by.
        pub by: SortBy,

        /// [`Order`] to sort in.
        pub order: Order,
    }

    /// Field of a [`User`] to sort by.
    ///
    /// Ties are always broken by [`user::Id`] in ascending order.
    #[derive(
        Clone,
        Copy,
        Debug,
        Default,
        Display,
        Eq,
        Hash,
        PartialEq,
        strum::EnumString,
    )]
    pub enum SortBy {
        /// [`user::CreationDateTime`].
        #[default]
        #[display("createdAt")]
        #[strum(serialize = "createdAt")]
        CreatedAt,

        /// [`user::Login`].
        #[display("login")]
        #[strum(serialize = "login")]
        Login,

        /// [`user::Email`].
        #[display("email")]
        #[strum(serialize = "email")]
        Email,
    }

    impl SortBy {
        /// Parses the raw `input` into a [`SortBy`].
        ///
        /// [`None`] is returned for anything other than `createdAt`, `login`
        /// or `email`.
        #[must_use]
        pub fn parse(input: &str) -> Option<Self> {
            input.parse().ok()
        }

        /// Returns the name of the storage column this [`SortBy`] refers to.
        #[must_use]
        pub const fn column(&self) -> &'static str {
            match self {
                Self::CreatedAt => "created_at",
                Self::Login => "login",
                Self::Email => "email",
            }
        }

        /// Indicates whether this [`SortBy`] refers to a textual field, which
        /// should be compared bytewise regardless of the storage locale.
        #[must_use]
        pub const fn is_textual(&self) -> bool {
            match self {
                Self::CreatedAt => false,
                Self::Login | Self::Email => true,
            }
        }
    }

    /// [`User`] fetched along with its confirmation records.
    #[derive(Clone, Debug)]
    pub struct Row {
        /// Fetched [`User`].
        pub user: User,

        /// [`user::EmailConfirmation`] of the [`User`], if any.
        pub email_confirmation: Option<user::EmailConfirmation>,

        /// [`user::RecoveryCode`] of the [`User`], if any.
        pub recovery_code: Option<user::RecoveryCode>,
    }

    impl From<Row> for Projection {
        fn from(row: Row) -> Self {
            row.user.into()
        }
    }

    /// Total count of [`User`]s matching a [`Filter`].
    #[derive(Clone, Copy, Debug, Default, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(u64);

    #[cfg(test)]
    mod spec {
        use common::pagination::{Limits, Order, Param};

        use super::{RawQuery, SearchTerm, SortBy, Sorting};

        fn text(s: &str) -> Option<Param> {
            Some(Param::from(s))
        }

        #[test]
        fn defaults_empty_query() {
            let selector = RawQuery::default().normalize(Limits::default());

            assert_eq!(selector.filter.login, None);
            assert_eq!(selector.filter.email, None);
            assert_eq!(
                selector.sorting,
                Sorting {
                    by: SortBy::CreatedAt,
                    order: Order::Descending,
                },
            );
            assert_eq!(selector.arguments.page_number(), 1);
            assert_eq!(selector.arguments.page_size(), 10);
        }

        #[test]
        fn keeps_valid_fields() {
            let selector = RawQuery {
                search_login_term: text("al"),
                search_email_term: text("@y"),
                sort_by: text("login"),
                sort_direction: text("ASC"),
                page_number: text("2"),
                page_size: Some(Param::Int(1)),
            }
            .normalize(Limits::default());

            assert_eq!(selector.filter.login, SearchTerm::new("al"));
            assert_eq!(selector.filter.email, SearchTerm::new("@y"));
            assert_eq!(selector.sorting.by, SortBy::Login);
            assert_eq!(selector.sorting.order, Order::Ascending);
            assert_eq!(selector.arguments.page_number(), 2);
            assert_eq!(selector.arguments.page_size(), 1);
        }

        #[test]
        fn drops_blank_search_terms() {
            let selector = RawQuery {
                search_login_term: text("   "),
                search_email_term: Some(Param::Other),
                ..RawQuery::default()
            }
            .normalize(Limits::default());

            assert_eq!(selector.filter.login, None);
            assert_eq!(selector.filter.email, None);
        }

        #[test]
        fn stringifies_numeric_search_terms() {
            let selector = RawQuery {
                search_login_term: Some(Param::Int(42)),
                ..RawQuery::default()
            }
            .normalize(Limits::default());

            assert_eq!(selector.filter.login, SearchTerm::new("42"));
        }

        #[test]
        fn repairs_unknown_sorting() {
            for (by, direction) in [
                ("'; DROP TABLE users;--", "sideways"),
                ("created_at", "descending"),
                ("password", "asc desc"),
                ("LOGIN", ""),
            ] {
                let selector = RawQuery {
                    sort_by: text(by),
                    sort_direction: text(direction),
                    ..RawQuery::default()
                }
                .normalize(Limits::default());

                assert_eq!(selector.sorting, Sorting::default());
            }
        }

        #[test]
        fn repairs_invalid_pagination() {
            let selector = RawQuery {
                page_number: Some(Param::Int(-1)),
                page_size: text("ten"),
                ..RawQuery::default()
            }
            .normalize(Limits::default());

            assert_eq!(selector.arguments.page_number(), 1);
            assert_eq!(selector.arguments.page_size(), 10);
        }

        #[test]
        fn maps_sort_fields_to_columns() {
            assert_eq!(SortBy::CreatedAt.column(), "created_at");
            assert_eq!(SortBy::Login.column(), "login");
            assert_eq!(SortBy::Email.column(), "email");

            assert!(!SortBy::CreatedAt.is_textual());
            assert!(SortBy::Login.is_textual());
            assert!(SortBy::Email.is_textual());
        }

        #[test]
        fn deserializes_mistyped_fields() {
            let query: RawQuery = serde_json::from_str(
                r#"{
                    "searchLoginTerm": "a",
                    "sortBy": 7,
                    "sortDirection": null,
                    "pageNumber": "3",
                    "pageSize": [1],
                    "unknown": true
                }"#,
            )
            .unwrap();
            let selector = query.normalize(Limits::default());

            assert_eq!(selector.filter.login, SearchTerm::new("a"));
            assert_eq!(selector.sorting, Sorting::default());
            assert_eq!(selector.arguments.page_number(), 3);
            assert_eq!(selector.arguments.page_size(), 10);
        }

        #[test]
        fn collects_first_occurrence_of_pairs() {
            let selector = RawQuery::from_pairs([
                ("pageSize", "1"),
                ("sortBy", "login"),
                ("pageSize", "5"),
                ("searchEmailTerm", "@y"),
                ("sortBy", "email"),
                ("unknown", "x"),
            ])
            .normalize(Limits::default());

            assert_eq!(selector.arguments.page_size(), 1);
            assert_eq!(selector.sorting.by, SortBy::Login);
            assert_eq!(selector.filter.email, SearchTerm::new("@y"));
            assert_eq!(selector.filter.login, None);
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{user, User};

    use super::Projection;

    #[test]
    fn projection_elides_credentials() {
        let user = User {
            id: "u1".into(),
            login: "alice".into(),
            password_hash: "secret-hash".into(),
            email: "a@x".into(),
            created_at: user::CreationDateTime::from_unix_timestamp(0).unwrap(),
        };

        let json = serde_json::to_value(Projection::from(user)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "u1",
                "login": "alice",
                "email": "a@x",
                "createdAt": "1970-01-01T00:00:00Z",
            }),
        );
    }
}
