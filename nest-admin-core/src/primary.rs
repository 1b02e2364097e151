//! Single-primary bookkeeping for dependent records
//!
//! Addresses, contacts and phones each carry an `is_primary` flag. For one
//! establishment at most one record of a family may hold it. The rules are
//! expressed here as a small state machine over the sibling set; the
//! storage layer applies the resulting demotions inside the same
//! transaction as the write that triggered them.

use crate::ids::{EstablishmentId, TypedId};
use crate::{Failure, Outcome};

/// A dependent record that can be marked as its parent's primary one
pub trait PrimaryFlagged {
    type Id: TypedId;

    /// Entity name used in error codes
    const FAMILY: &'static str;

    fn record_id(&self) -> Self::Id;

    fn parent_id(&self) -> EstablishmentId;

    fn is_primary(&self) -> bool;
}

/// Primary state of one parent's sibling set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryState<Id> {
    NoPrimary,
    OnePrimary(Id),
}

impl<Id: TypedId> PrimaryState<Id> {
    pub fn from_current(current: Option<Id>) -> Self {
        match current {
            Some(id) => PrimaryState::OnePrimary(id),
            None => PrimaryState::NoPrimary,
        }
    }

    /// Derive the state from the ids of the records flagged primary.
    ///
    /// More than one id means the invariant is already broken, which is
    /// reported as an unexpected failure.
    pub fn from_primary_ids(family: &str, parent: EstablishmentId, ids: &[Id]) -> Outcome<Self> {
        match ids {
            [] => Ok(PrimaryState::NoPrimary),
            [id] => Ok(PrimaryState::OnePrimary(*id)),
            _ => Err(Failure::unexpected(
                format!("{family}.MultiplePrimaries"),
                format!("Establishment {parent} has more than one primary {family}"),
            )),
        }
    }

    /// Derive the state from a full sibling set
    pub fn from_siblings<'a, T, I>(siblings: I) -> Outcome<Self>
    where
        T: PrimaryFlagged<Id = Id> + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let primaries: Vec<&T> = siblings.into_iter().filter(|s| s.is_primary()).collect();
        match primaries.first() {
            None => Ok(PrimaryState::NoPrimary),
            Some(first) => {
                let ids: Vec<Id> = primaries.iter().map(|s| s.record_id()).collect();
                Self::from_primary_ids(T::FAMILY, first.parent_id(), &ids)
            }
        }
    }

    pub fn primary(&self) -> Option<Id> {
        match self {
            PrimaryState::OnePrimary(id) => Some(*id),
            PrimaryState::NoPrimary => None,
        }
    }

    /// Make `id` the primary record.
    ///
    /// Returns the new state and the sibling that must be demoted first, if
    /// any. Promoting the current primary demotes nothing.
    pub fn promote(self, id: Id) -> (Self, Option<Id>) {
        match self {
            PrimaryState::OnePrimary(other) if other != id => {
                (PrimaryState::OnePrimary(id), Some(other))
            }
            _ => (PrimaryState::OnePrimary(id), None),
        }
    }

    /// Clear the flag of `id` if it holds it
    pub fn demote(self, id: Id) -> Self {
        match self {
            PrimaryState::OnePrimary(current) if current == id => PrimaryState::NoPrimary,
            state => state,
        }
    }
}

/// Refuse to delete a primary record while it still has siblings.
///
/// `remaining_siblings` counts the other live records of the same parent.
/// Deleting the last record is allowed even when it is primary.
pub fn ensure_deletable<T: PrimaryFlagged>(record: &T, remaining_siblings: i64) -> Outcome<()> {
    if record.is_primary() && remaining_siblings > 0 {
        return Err(Failure::validation(
            format!("{}.DeletionNotAllowed", T::FAMILY),
            format!(
                "{} {} is the primary one; set another as primary first",
                T::FAMILY,
                record.record_id()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::EstablishmentPhoneId;
    use crate::ErrorKind;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct Row {
        id: EstablishmentPhoneId,
        parent: EstablishmentId,
        primary: bool,
    }

    impl PrimaryFlagged for Row {
        type Id = EstablishmentPhoneId;
        const FAMILY: &'static str = "Row";

        fn record_id(&self) -> EstablishmentPhoneId {
            self.id
        }

        fn parent_id(&self) -> EstablishmentId {
            self.parent
        }

        fn is_primary(&self) -> bool {
            self.primary
        }
    }

    #[test]
    fn test_promote_demotes_previous_primary() {
        let a = EstablishmentPhoneId::new();
        let b = EstablishmentPhoneId::new();

        let (state, demoted) = PrimaryState::NoPrimary.promote(a);
        assert_eq!(demoted, None);
        assert_eq!(state.primary(), Some(a));

        let (state, demoted) = state.promote(b);
        assert_eq!(demoted, Some(a));
        assert_eq!(state, PrimaryState::OnePrimary(b));

        let (state, demoted) = state.promote(b);
        assert_eq!(demoted, None);
        assert_eq!(state.demote(a), PrimaryState::OnePrimary(b));
        assert_eq!(state.demote(b), PrimaryState::NoPrimary);
    }

    #[test]
    fn test_from_siblings_detects_broken_invariant() {
        let parent = EstablishmentId::new();
        let rows = vec![
            Row { id: EstablishmentPhoneId::new(), parent, primary: true },
            Row { id: EstablishmentPhoneId::new(), parent, primary: true },
        ];
        let failure = PrimaryState::from_siblings(&rows).unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Unexpected);
        assert!(failure.has_code("Row.MultiplePrimaries"));
    }

    #[test]
    fn test_ensure_deletable() {
        let parent = EstablishmentId::new();
        let primary = Row { id: EstablishmentPhoneId::new(), parent, primary: true };
        let secondary = Row { primary: false, id: EstablishmentPhoneId::new(), ..primary.clone() };

        let failure = ensure_deletable(&primary, 1).unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert!(failure.has_code("Row.DeletionNotAllowed"));

        assert!(ensure_deletable(&primary, 0).is_ok());
        assert!(ensure_deletable(&secondary, 3).is_ok());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create { primary: bool },
        Promote(usize),
        Demote(usize),
        Delete(usize),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<bool>().prop_map(|primary| Op::Create { primary }),
            any::<usize>().prop_map(Op::Promote),
            any::<usize>().prop_map(Op::Demote),
            any::<usize>().prop_map(Op::Delete),
        ]
    }

    /// Apply a write the way a handler does: demote first, then write
    fn write(rows: &mut Vec<Row>, row: Row) {
        let state = PrimaryState::from_siblings(rows.iter()).unwrap();
        if row.primary {
            let (_, demoted) = state.promote(row.id);
            if let Some(demoted) = demoted {
                for r in rows.iter_mut().filter(|r| r.id == demoted) {
                    r.primary = false;
                }
            }
        }
        match rows.iter_mut().find(|r| r.id == row.id) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
    }

    proptest! {
        #[test]
        fn prop_at_most_one_primary(ops in prop::collection::vec(arb_op(), 1..60)) {
            let parent = EstablishmentId::new();
            let mut rows: Vec<Row> = Vec::new();

            for op in ops {
                match op {
                    Op::Create { primary } => {
                        write(&mut rows, Row { id: EstablishmentPhoneId::new(), parent, primary });
                    }
                    Op::Promote(i) if !rows.is_empty() => {
                        let row = Row { primary: true, ..rows[i % rows.len()].clone() };
                        write(&mut rows, row);
                    }
                    Op::Demote(i) if !rows.is_empty() => {
                        let row = Row { primary: false, ..rows[i % rows.len()].clone() };
                        write(&mut rows, row);
                    }
                    Op::Delete(i) if !rows.is_empty() => {
                        let idx = i % rows.len();
                        let remaining = rows.len() as i64 - 1;
                        if ensure_deletable(&rows[idx], remaining).is_ok() {
                            rows.remove(idx);
                        } else {
                            prop_assert!(rows[idx].primary && remaining > 0);
                        }
                    }
                    _ => {}
                }
                let primaries = rows.iter().filter(|r| r.primary).count();
                prop_assert!(primaries <= 1);
            }
        }
    }
}
