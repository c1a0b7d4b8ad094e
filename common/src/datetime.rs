//! Date and time utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, fmt, marker::PhantomData};

#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{
    format_description::well_known::{iso8601, Iso8601, Rfc3339},
    UtcOffset,
};

/// [ISO 8601] format with an expanded six-digit year, covering the years
/// [RFC 3339] cannot represent.
///
/// [ISO 8601]: https://www.iso.org/iso-8601-date-and-time-format.html
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
const EXPANDED_ISO8601: Iso8601<
    {
        iso8601::Config::DEFAULT
            .set_year_is_six_digits(true)
            .encode()
    },
> = Iso8601;

/// Untyped date and time.
pub type DateTime = DateTimeOf;

/// UTC date and time with a microsecond precision.
///
/// The `Of` type parameter only tags what the moment describes (creation,
/// expiration, etc.), so different moments cannot be mixed up accidentally.
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Inner representation of the date and time.
    inner: time::OffsetDateTime,

    /// Type parameter describing the kind of date and time.
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Creates a new [`DateTime`] from the provided Unix timestamp.
    ///
    /// [`None`] is returned if the timestamp is invalid.
    #[must_use]
    pub fn from_unix_timestamp(timestamp: i64) -> Option<Self> {
        Some(Self {
            inner: time::OffsetDateTime::from_unix_timestamp(timestamp).ok()?,
            _of: PhantomData,
        })
    }

    /// Returns the [`DateTime`] as an [RFC 3339] string.
    ///
    /// Years beyond `9999` are rendered as [ISO 8601] with an expanded
    /// six-digit year instead.
    ///
    /// [ISO 8601]: https://www.iso.org/iso-8601-date-and-time-format.html
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.inner
            .format(&Rfc3339)
            .or_else(|_| self.inner.format(&EXPANDED_ISO8601))
            .unwrap_or_else(|e| {
                panic!("cannot format `DateTime` as ISO 8601: {e}")
            })
    }
}

impl<Of: ?Sized> fmt::Debug for DateTimeOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DateTime").field(&self.inner).finish()
    }
}

impl<Of: ?Sized> fmt::Display for DateTimeOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> TryFrom<time::OffsetDateTime> for DateTimeOf<Of> {
    type Error = time::error::ComponentRange;

    fn try_from(dt: time::OffsetDateTime) -> Result<Self, Self::Error> {
        dt.to_offset(UtcOffset::UTC)
            .replace_microsecond(dt.microsecond())
            .map(|inner| Self {
                inner,
                _of: PhantomData,
            })
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::OffsetDateTime::from_sql(ty, raw)?
            .try_into()
            .map_err(Box::from)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing [RFC 3339] integration with [`serde`] crate.
    //!
    //! [RFC 3339]: https://tools.ietf.org/html/rfc3339

    use serde::{Serialize, Serializer};

    use super::DateTimeOf;

    impl<Of: ?Sized> Serialize for DateTimeOf<Of> {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&self.to_rfc3339())
        }
    }
}

#[cfg(test)]
mod spec {
    use super::DateTime;

    #[test]
    fn formats_as_rfc3339() {
        let dt = DateTime::from_unix_timestamp(1_700_000_000).unwrap();

        assert_eq!(dt.to_rfc3339(), "2023-11-14T22:13:20Z");
        assert_eq!(dt.to_string(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn formats_far_future_with_expanded_year() {
        // 10000-01-01T00:00:00Z
        let dt = DateTime::from_unix_timestamp(253_402_300_800).unwrap();

        assert!(
            dt.to_rfc3339().starts_with("+010000-01-01T00:00:00"),
            "{dt}",
        );
    }

    #[test]
    fn orders_chronologically() {
        let earlier = DateTime::from_unix_timestamp(0).unwrap();
        let later = DateTime::from_unix_timestamp(1).unwrap();

        assert!(earlier < later);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_string() {
        let dt = DateTime::from_unix_timestamp(0).unwrap();

        assert_eq!(
            serde_json::to_string(&dt).unwrap(),
            r#""1970-01-01T00:00:00Z""#,
        );
    }
}
