//! Composable query specifications
//!
//! A [`Specification`] bundles filter criteria, an optional ordering and an
//! optional page window for one entity type. Criteria form a small typed
//! expression tree over the entity's [`Field`] enum, so the same
//! specification can be evaluated in memory ([`Specification::apply`]) or
//! rendered to SQL by the storage layer.
//!
//! Listing endpoints build one specification and derive the count query
//! from it with [`Specification::without_paging`], which keeps the filter
//! identical and only drops the window:
//!
//! ```rust
//! use nest_admin_core::establishment::{Establishment, EstablishmentField};
//! use nest_admin_core::specification::{Criteria, SortDir, Specification};
//!
//! let spec = Specification::<Establishment>::new(
//!     Criteria::contains(EstablishmentField::Name, "inn"),
//! )
//! .with_ordering("name", SortDir::Desc)
//! .and_then(|spec| spec.with_paging(2, 25))
//! .unwrap();
//!
//! let count = spec.without_paging();
//! assert_eq!(count.criteria(), spec.criteria());
//! assert!(count.paging().is_none());
//! assert_eq!(spec.paging().unwrap().skip(), 25);
//! ```

use crate::{Failure, Outcome};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 1000;

/// A queryable attribute of an entity
pub trait Field: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Public name, also used as the sort key in requests
    fn name(self) -> &'static str;

    fn all() -> &'static [Self];

    /// Resolve a public name, ignoring case
    fn parse(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// An entity that can be filtered, sorted and paged
pub trait Queryable {
    type Field: Field;

    /// Entity name used in error codes
    const ENTITY: &'static str;

    /// Field used as the final tie-breaker of every ordering
    fn id_field() -> Self::Field;

    fn value_of(&self, field: Self::Field) -> Value;
}

/// Whether two entities agree on every queryable field.
///
/// Field values are the stored representation, so a change of letter case
/// counts as a change even where the value object compares caselessly.
pub fn same_values<E: Queryable>(a: &E, b: &E) -> bool {
    E::Field::all()
        .iter()
        .all(|f| a.value_of(*f) == b.value_of(*f))
}

/// Literal value in a criterion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Value {
    Text(String),
    Uuid(Uuid),
    Int(i64),
    Bool(bool),
}

impl Value {
    fn rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) => 1,
            Value::Text(_) => 2,
            Value::Uuid(_) => 3,
        }
    }

    /// Total order used for in-memory sorting
    pub fn compare(&self, other: &Value) -> CmpOrdering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            // ids are stored as hyphenated text, so compare them that way
            (Value::Uuid(a), Value::Uuid(b)) => a.to_string().cmp(&b.to_string()),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Filter expression over the fields `F` of one entity
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria<F> {
    /// Matches everything
    All,
    Eq(F, Value),
    /// Case-insensitive substring match on a text field
    Contains(F, String),
    And(Box<Criteria<F>>, Box<Criteria<F>>),
    Or(Box<Criteria<F>>, Box<Criteria<F>>),
    Not(Box<Criteria<F>>),
}

impl<F: Field> Criteria<F> {
    pub fn eq<V: Into<Value>>(field: F, value: V) -> Self {
        Criteria::Eq(field, value.into())
    }

    pub fn contains<S: Into<String>>(field: F, text: S) -> Self {
        Criteria::Contains(field, text.into())
    }

    #[must_use]
    pub fn and(self, other: Criteria<F>) -> Self {
        match (self, other) {
            (Criteria::All, c) | (c, Criteria::All) => c,
            (a, b) => Criteria::And(Box::new(a), Box::new(b)),
        }
    }

    #[must_use]
    pub fn or(self, other: Criteria<F>) -> Self {
        match (self, other) {
            (Criteria::All, _) | (_, Criteria::All) => Criteria::All,
            (a, b) => Criteria::Or(Box::new(a), Box::new(b)),
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Criteria::Not(Box::new(self))
    }

    /// AND the criterion in when a filter value is present
    #[must_use]
    pub fn and_maybe<T>(self, value: Option<T>, make: impl FnOnce(T) -> Criteria<F>) -> Self {
        match value {
            Some(v) => self.and(make(v)),
            None => self,
        }
    }

    /// Evaluate against one entity
    pub fn matches<E: Queryable<Field = F>>(&self, entity: &E) -> bool {
        match self {
            Criteria::All => true,
            Criteria::Eq(field, value) => &entity.value_of(*field) == value,
            Criteria::Contains(field, needle) => match entity.value_of(*field) {
                Value::Text(text) => text.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            Criteria::And(a, b) => a.matches(entity) && b.matches(entity),
            Criteria::Or(a, b) => a.matches(entity) || b.matches(entity),
            Criteria::Not(c) => !c.matches(entity),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDir {
    #[default]
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl SortDir {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

impl FromStr for SortDir {
    type Err = Failure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDir::Asc),
            "desc" | "descending" => Ok(SortDir::Desc),
            other => Err(Failure::validation(
                "Specification.InvalidSortOrder",
                format!("'{other}' is not a sort order; use asc or desc"),
            )),
        }
    }
}

/// Ordering on one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering<F> {
    pub field: F,
    pub dir: SortDir,
}

/// One-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Paging {
    page_number: u32,
    page_size: u32,
}

impl Paging {
    pub fn new(page_number: u32, page_size: u32) -> Outcome<Self> {
        if page_number < 1 {
            return Err(Failure::validation(
                "Specification.InvalidPageNumber",
                "Page number must be at least 1",
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Failure::validation(
                "Specification.InvalidPageSize",
                format!("Page size must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        Ok(Self {
            page_number,
            page_size,
        })
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip before this page
    pub fn skip(&self) -> u64 {
        u64::from(self.page_number - 1) * u64::from(self.page_size)
    }

    pub fn take(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// Filter, ordering and page window for entity `E`
pub struct Specification<E: Queryable> {
    criteria: Criteria<E::Field>,
    ordering: Option<Ordering<E::Field>>,
    paging: Option<Paging>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Queryable> Clone for Specification<E> {
    fn clone(&self) -> Self {
        Self {
            criteria: self.criteria.clone(),
            ordering: self.ordering,
            paging: self.paging,
            _entity: PhantomData,
        }
    }
}

impl<E: Queryable> fmt::Debug for Specification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("entity", &E::ENTITY)
            .field("criteria", &self.criteria)
            .field("ordering", &self.ordering)
            .field("paging", &self.paging)
            .finish()
    }
}

impl<E: Queryable> Default for Specification<E> {
    fn default() -> Self {
        Self::new(Criteria::All)
    }
}

impl<E: Queryable> Specification<E> {
    pub fn new(criteria: Criteria<E::Field>) -> Self {
        Self {
            criteria,
            ordering: None,
            paging: None,
            _entity: PhantomData,
        }
    }

    /// Conjunction with another specification's criteria.
    ///
    /// Ordering and paging of `self` are kept.
    #[must_use]
    pub fn and(&self, other: &Specification<E>) -> Self {
        Self {
            criteria: self.criteria.clone().and(other.criteria.clone()),
            ..self.clone()
        }
    }

    /// Disjunction with another specification's criteria.
    ///
    /// Ordering and paging of `self` are kept.
    #[must_use]
    pub fn or(&self, other: &Specification<E>) -> Self {
        Self {
            criteria: self.criteria.clone().or(other.criteria.clone()),
            ..self.clone()
        }
    }

    pub fn with_paging(self, page_number: u32, page_size: u32) -> Outcome<Self> {
        let paging = Paging::new(page_number, page_size)?;
        Ok(Self {
            paging: Some(paging),
            ..self
        })
    }

    /// Order by a named field; unknown names fail validation
    pub fn with_ordering(self, field_name: &str, dir: SortDir) -> Outcome<Self> {
        let field = E::Field::parse(field_name).ok_or_else(|| {
            let allowed = E::Field::all()
                .iter()
                .map(|f| f.name())
                .collect::<Vec<_>>()
                .join(", ");
            Failure::validation(
                "Specification.InvalidSortField",
                format!(
                    "'{}' is not a sortable field of {}; expected one of: {}",
                    field_name,
                    E::ENTITY,
                    allowed
                ),
            )
        })?;
        Ok(self.ordered_by(field, dir))
    }

    #[must_use]
    pub fn ordered_by(self, field: E::Field, dir: SortDir) -> Self {
        Self {
            ordering: Some(Ordering { field, dir }),
            ..self
        }
    }

    /// Same criteria, no page window; used for counting
    #[must_use]
    pub fn without_paging(&self) -> Self {
        Self {
            paging: None,
            ..self.clone()
        }
    }

    pub fn criteria(&self) -> &Criteria<E::Field> {
        &self.criteria
    }

    pub fn ordering(&self) -> Option<Ordering<E::Field>> {
        self.ordering
    }

    pub fn paging(&self) -> Option<Paging> {
        self.paging
    }

    /// Sort keys in application order, always ending with the id
    pub fn sort_keys(&self) -> Vec<(E::Field, SortDir)> {
        let id = E::id_field();
        match self.ordering {
            Some(o) if o.field == id => vec![(id, o.dir)],
            Some(o) => vec![(o.field, o.dir), (id, SortDir::Asc)],
            None => vec![(id, SortDir::Asc)],
        }
    }

    pub fn matches(&self, entity: &E) -> bool {
        self.criteria.matches(entity)
    }

    /// Evaluate the full specification over an in-memory collection
    pub fn apply<'a, I>(&self, items: I) -> Vec<&'a E>
    where
        I: IntoIterator<Item = &'a E>,
    {
        let mut selected: Vec<&E> = items.into_iter().filter(|e| self.matches(e)).collect();
        let keys = self.sort_keys();
        selected.sort_by(|a, b| {
            keys.iter()
                .map(|(field, dir)| {
                    let ord = a.value_of(*field).compare(&b.value_of(*field));
                    match dir {
                        SortDir::Asc => ord,
                        SortDir::Desc => ord.reverse(),
                    }
                })
                .find(|ord| *ord != CmpOrdering::Equal)
                .unwrap_or(CmpOrdering::Equal)
        });
        match self.paging {
            Some(p) => selected
                .into_iter()
                .skip(p.skip() as usize)
                .take(p.take() as usize)
                .collect(),
            None => selected,
        }
    }
}
