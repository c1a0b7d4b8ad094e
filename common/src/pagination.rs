//! Abstractions for offset-based pagination.

use derive_more::{Display, Error};
#[cfg(feature = "serde")]
use serde::Serialize;

/// Number of the page returned when none (or an invalid one) is requested.
pub const DEFAULT_PAGE_NUMBER: u32 = 1;

/// Size of the page returned when none (or an invalid one) is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound of a page size applied by default.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Bounds applied to the page size while normalizing [`Arguments`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Limits {
    /// Page size used when none (or an invalid one) is requested.
    default_page_size: u32,

    /// Largest page size allowed to be requested.
    max_page_size: u32,
}

impl Limits {
    /// Creates new [`Limits`] out of the provided page sizes.
    ///
    /// # Errors
    ///
    /// If any of the sizes is zero, or the `default_page_size` exceeds the
    /// `max_page_size`.
    pub fn new(
        default_page_size: u32,
        max_page_size: u32,
    ) -> Result<Self, InvalidLimits> {
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(InvalidLimits {
                default_page_size,
                max_page_size,
            });
        }
        Ok(Self {
            default_page_size,
            max_page_size,
        })
    }

    /// Returns the default page size of these [`Limits`].
    #[must_use]
    pub const fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Returns the maximum page size of these [`Limits`].
    #[must_use]
    pub const fn max_page_size(&self) -> u32 {
        self.max_page_size
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Error of constructing [`Limits`].
#[derive(Clone, Copy, Debug, Display, Error)]
#[display(
    "invalid pagination limits: default page size {default_page_size} must \
     be positive and not exceed max page size {max_page_size}"
)]
pub struct InvalidLimits {
    /// Requested default page size.
    pub default_page_size: u32,

    /// Requested maximum page size.
    pub max_page_size: u32,
}

/// Raw pagination parameter, as it was received from a caller.
///
/// Never fails to deserialize: values of any unexpected type become
/// [`Param::Other`].
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    /// Integer number.
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Textual value, possibly containing a number.
    Text(String),

    /// Value of any other type.
    Other,
}

impl Param {
    /// Interprets this [`Param`] as a positive integer.
    ///
    /// [`None`] is returned for non-numeric, fractional, non-positive or
    /// out-of-range values.
    #[must_use]
    pub fn to_positive(&self) -> Option<u32> {
        let n = match self {
            Self::Int(n) => *n,
            Self::Float(f) => integral(*f)?,
            Self::Text(s) => {
                let s = s.trim();
                match s.parse() {
                    Ok(n) => n,
                    Err(_) => integral(s.parse().ok()?)?,
                }
            }
            Self::Other => return None,
        };
        u32::try_from(n).ok().filter(|n| *n > 0)
    }

    /// Interprets this [`Param`] as a text.
    ///
    /// Numbers are rendered back into their textual form, while
    /// [`Param::Other`] values have no textual representation.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Other => None,
        }
    }
}

/// Converts the provided float into an integer, if it has no fractional part
/// and fits the range where floats are exact.
#[expect(
    clippy::cast_possible_truncation,
    reason = "integral and range-checked"
)]
fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f.abs() <= 1e15).then(|| f as i64)
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for Param {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Param {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        /// Untagged representation of a [`Param`].
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Float(f64),
            Text(String),
            Other(serde::de::IgnoredAny),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Int(n) => Self::Int(n),
            Repr::Float(f) => Self::Float(f),
            Repr::Text(s) => Self::Text(s),
            Repr::Other(serde::de::IgnoredAny) => Self::Other,
        })
    }
}

/// Normalized pagination arguments.
///
/// Both the page number and the page size are always positive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// Number of the requested page, starting from `1`.
    page_number: u32,

    /// Maximum number of items on the requested page.
    page_size: u32,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Arguments {
    /// Creates new [`Arguments`] if both values are positive.
    #[must_use]
    pub fn new(page_number: u32, page_size: u32) -> Option<Self> {
        (page_number > 0 && page_size > 0).then_some(Self {
            page_number,
            page_size,
        })
    }

    /// Normalizes the raw `page_number` and `page_size` into [`Arguments`].
    ///
    /// Missing or invalid values are replaced with [`DEFAULT_PAGE_NUMBER`] and
    /// [`Limits::default_page_size()`], while a page size above
    /// [`Limits::max_page_size()`] is clamped to it. Never fails.
    #[must_use]
    pub fn normalize(
        page_number: Option<&Param>,
        page_size: Option<&Param>,
        limits: Limits,
    ) -> Self {
        Self {
            page_number: page_number
                .and_then(Param::to_positive)
                .unwrap_or(DEFAULT_PAGE_NUMBER),
            page_size: page_size
                .and_then(Param::to_positive)
                .map_or(limits.default_page_size, |s| {
                    s.min(limits.max_page_size)
                }),
        }
    }

    /// Returns the number of the requested page.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Returns the maximum number of items on the requested page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the number of items preceding the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number - 1) * u64::from(self.page_size)
    }
}

/// Order of items on a page.
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
#[strum(ascii_case_insensitive)]
pub enum Order {
    /// Ascending order.
    #[display("asc")]
    #[strum(serialize = "asc")]
    Ascending,

    /// Descending order.
    #[default]
    #[display("desc")]
    #[strum(serialize = "desc")]
    Descending,
}

impl Order {
    /// Parses the raw `input` into an [`Order`].
    ///
    /// Surrounding whitespace and letter case are ignored. [`None`] is returned
    /// for anything other than `asc` or `desc`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        input.trim().parse().ok()
    }

    #[cfg(feature = "postgres")]
    /// Returns SQL keyword representing this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Page of items along with the metadata describing its position.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Page<T> {
    /// Total number of pages, `0` if there are no items at all.
    pub pages_count: u64,

    /// Number of this [`Page`].
    pub page: u32,

    /// Maximum number of items on this [`Page`].
    pub page_size: u32,

    /// Total number of items across all the pages.
    pub total_count: u64,

    /// Items on this [`Page`].
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Creates a new [`Page`] of the provided `items`, requested with the
    /// given [`Arguments`].
    #[must_use]
    pub fn new(
        args: &Arguments,
        items: impl IntoIterator<Item = impl Into<T>>,
        total_count: u64,
    ) -> Self {
        Self {
            pages_count: total_count.div_ceil(u64::from(args.page_size)),
            page: args.page_number,
            page_size: args.page_size,
            total_count,
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Page selector.
#[derive(Clone, Debug)]
pub struct Selector<F, S> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Filter being applied before paginating.
    pub filter: F,

    /// Sorting being applied before paginating.
    pub sorting: S,
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($item:ty, $filter:ty, $sorting:ty) => {
        #[doc = "A [`Page`] of items."]
        pub type Page = $crate::pagination::Page<$item>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter, $sorting>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Limits, Order, Page, Param};

    fn normalize(number: Option<Param>, size: Option<Param>) -> Arguments {
        Arguments::normalize(number.as_ref(), size.as_ref(), Limits::default())
    }

    #[test]
    fn defaults_missing_arguments() {
        let args = normalize(None, None);

        assert_eq!(args.page_number(), 1);
        assert_eq!(args.page_size(), 10);
        assert_eq!(args.offset(), 0);
    }

    #[test]
    fn accepts_numeric_text() {
        let args = normalize(Some("3".into()), Some(" 25 ".into()));

        assert_eq!(args.page_number(), 3);
        assert_eq!(args.page_size(), 25);
        assert_eq!(args.offset(), 50);
    }

    #[test]
    fn accepts_integral_decimals_in_any_form() {
        for (number, size) in [
            (Param::Float(2.0), Param::Float(20.0)),
            (Param::from("2.0"), Param::from("20.00")),
            (Param::from(" 2. "), Param::from("2e1")),
        ] {
            let args = normalize(Some(number), Some(size));

            assert_eq!(args.page_number(), 2);
            assert_eq!(args.page_size(), 20);
        }
    }

    #[test]
    fn repairs_invalid_arguments() {
        for bad in [
            Param::from("abc"),
            Param::from(""),
            Param::from("2.5"),
            Param::from("NaN"),
            Param::from("inf"),
            Param::Int(0),
            Param::Int(-4),
            Param::Float(1.5),
            Param::Other,
            Param::from("'; DROP TABLE users;--"),
        ] {
            let args = normalize(Some(bad.clone()), Some(bad));

            assert_eq!(args, Arguments::default());
        }
    }

    #[test]
    fn clamps_page_size() {
        let args = normalize(None, Some(Param::Int(1_000)));
        assert_eq!(args.page_size(), 100);

        let limits = Limits::new(5, 20).unwrap();
        let args = Arguments::normalize(None, Some(&Param::Int(50)), limits);
        assert_eq!(args.page_size(), 20);
        let args = Arguments::normalize(None, None, limits);
        assert_eq!(args.page_size(), 5);
    }

    #[test]
    fn rejects_invalid_limits() {
        assert!(Limits::new(0, 10).is_err());
        assert!(Limits::new(20, 10).is_err());
        assert!(Limits::new(10, 10).is_ok());
    }

    #[test]
    fn offset_does_not_overflow() {
        let args = Arguments::new(u32::MAX, u32::MAX).unwrap();

        assert_eq!(
            args.offset(),
            u64::from(u32::MAX - 1) * u64::from(u32::MAX),
        );
    }

    #[test]
    fn parses_order_leniently() {
        assert_eq!(Order::parse("asc"), Some(Order::Ascending));
        assert_eq!(Order::parse("ASC"), Some(Order::Ascending));
        assert_eq!(Order::parse(" Desc "), Some(Order::Descending));
        assert_eq!(Order::parse("ascending"), None);
        assert_eq!(Order::parse("desc; DROP TABLE users"), None);
        assert_eq!(Order::default(), Order::Descending);
    }

    #[test]
    fn counts_pages() {
        let args = Arguments::new(2, 10).unwrap();

        let page = Page::<u8>::new(&args, Vec::<u8>::new(), 0);
        assert_eq!(page.pages_count, 0);

        let page = Page::<u8>::new(&args, [1_u8, 2], 10);
        assert_eq!(page.pages_count, 1);

        let page = Page::<u8>::new(&args, [1_u8], 11);
        assert_eq!(page.pages_count, 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.total_count, 11);
    }

    #[test]
    fn converts_items_preserving_metadata() {
        let args = Arguments::new(1, 2).unwrap();
        let page = Page::<u16>::new(&args, [1_u8, 2], 3);

        assert_eq!(page.items, [1_u16, 2]);
        assert_eq!(page.pages_count, 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_any_param() {
        let params: Vec<Param> =
            serde_json::from_str(r#"[1, 2.5, "3", true, null, {}]"#).unwrap();

        assert_eq!(
            params,
            [
                Param::Int(1),
                Param::Float(2.5),
                Param::Text("3".into()),
                Param::Other,
                Param::Other,
                Param::Other,
            ],
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_envelope_in_camel_case() {
        let args = Arguments::new(1, 10).unwrap();
        let page = Page::<u8>::new(&args, [7_u8], 1);

        assert_eq!(
            serde_json::to_string(&page).unwrap(),
            r#"{"pagesCount":1,"page":1,"pageSize":10,"totalCount":1,"items":[7]}"#,
        );
    }
}
