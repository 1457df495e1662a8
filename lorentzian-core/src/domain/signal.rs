//! Tri-state direction shared by training labels and emitted signals.

use serde::{Deserialize, Serialize};

/// Direction of a label or a signal. The integer value is what the
/// classifier sums over its neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDirection {
    Long,
    Short,
    #[default]
    Neutral,
}

impl SignalDirection {
    pub fn value(self) -> i64 {
        match self {
            Self::Long => 1,
            Self::Short => -1,
            Self::Neutral => 0,
        }
    }

    pub fn is_long(self) -> bool {
        self == Self::Long
    }

    pub fn is_short(self) -> bool {
        self == Self::Short
    }
}

impl From<SignalDirection> for i64 {
    fn from(d: SignalDirection) -> Self {
        d.value()
    }
}
