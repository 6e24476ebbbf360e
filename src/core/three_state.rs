//! Three-valued verdicts
//!
//! Static analysis cannot always prove the absence or presence of a
//! property, so verdicts are `No < Unsure < Yes`. Combining the verdicts of
//! the parts of a compound construct takes the maximum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A totally ordered three-valued verdict
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ThreeState {
    #[default]
    No,
    Unsure,
    Yes,
}

impl ThreeState {
    /// Combine two verdicts of sibling parts
    #[must_use]
    pub fn merge(self, other: ThreeState) -> ThreeState {
        self.max(other)
    }

    /// Combine any number of verdicts; an empty sequence is `No`
    pub fn combine<I>(verdicts: I) -> ThreeState
    where
        I: IntoIterator<Item = ThreeState>,
    {
        verdicts.into_iter().fold(ThreeState::No, ThreeState::merge)
    }

    pub fn from_bool(value: bool) -> ThreeState {
        if value {
            ThreeState::Yes
        } else {
            ThreeState::No
        }
    }

    pub fn is_no(self) -> bool {
        self == ThreeState::No
    }

    pub fn is_yes(self) -> bool {
        self == ThreeState::Yes
    }

    /// `Unsure` and `Yes` both mean "the property may hold"
    pub fn may_hold(self) -> bool {
        self != ThreeState::No
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThreeState::No => "no",
            ThreeState::Unsure => "unsure",
            ThreeState::Yes => "yes",
        }
    }
}

impl fmt::Display for ThreeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_state() -> impl Strategy<Value = ThreeState> {
        prop_oneof![
            Just(ThreeState::No),
            Just(ThreeState::Unsure),
            Just(ThreeState::Yes)
        ]
    }

    #[test]
    fn test_ordering() {
        assert!(ThreeState::No < ThreeState::Unsure);
        assert!(ThreeState::Unsure < ThreeState::Yes);
    }

    #[test]
    fn test_combine_empty_is_no() {
        assert_eq!(ThreeState::combine(Vec::new()), ThreeState::No);
        assert_eq!(
            ThreeState::combine([ThreeState::No, ThreeState::Unsure]),
            ThreeState::Unsure
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ThreeState::Unsure).unwrap();
        assert_eq!(json, "\"unsure\"");
    }

    proptest! {
        #[test]
        fn prop_merge_never_weakens(a in any_state(), b in any_state()) {
            let merged = a.merge(b);
            prop_assert!(merged >= a);
            prop_assert!(merged >= b);
            prop_assert_eq!(merged, b.merge(a));
        }

        #[test]
        fn prop_no_only_when_all_no(states in proptest::collection::vec(any_state(), 0..8)) {
            let combined = ThreeState::combine(states.clone());
            prop_assert_eq!(combined.is_no(), states.iter().all(|s| s.is_no()));
        }
    }
}
