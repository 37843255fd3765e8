//! Mapping from classifier output to leakage categories.

use std::fmt;

use serde::Serialize;

/// Leakage category shown to the user.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LeakageClass {
    None,
    Weak,
    Severe,
}

impl LeakageClass {
    /// Resolve a class index. Anything other than 0 or 1 is `Severe`,
    /// including indices the classifier should never emit.
    pub fn from_index(class_index: i64) -> Self {
        match class_index {
            0 => Self::None,
            1 => Self::Weak,
            _ => Self::Severe,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "No Leakage",
            Self::Weak => "Weak Leakage",
            Self::Severe => "Severe Leakage",
        }
    }
}

impl fmt::Display for LeakageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label text for a raw class index.
pub fn leakage_label(class_index: i64) -> &'static str {
    LeakageClass::from_index(class_index).label()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_indices() {
        assert_eq!(leakage_label(0), "No Leakage");
        assert_eq!(leakage_label(1), "Weak Leakage");
        assert_eq!(leakage_label(2), "Severe Leakage");
    }

    #[test]
    fn out_of_range_indices_fall_back_to_severe() {
        for idx in [-1, 3, 5, i64::MIN, i64::MAX] {
            assert_eq!(LeakageClass::from_index(idx), LeakageClass::Severe);
        }
    }
}
