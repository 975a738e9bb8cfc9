//! Classification axes attached to a test case.
//!
//! Each axis is a closed vocabulary. Labels are the SCREAMING_SNAKE_CASE
//! names used in reports (`CRITICAL`, `P0`, `BLACK_BOX`), and parsing is
//! lenient about case and about `-`/space separators.

use crate::error::ProtoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! classification {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, default = $default:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant, )+];

            /// Returns the report label for this value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ProtoError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = normalize_label(s);
                match normalized.as_str() {
                    $( $label => Ok($name::$variant), )+
                    _ => Err(ProtoError::UnknownValue {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

/// Uppercases and folds `-` and spaces into `_`.
fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

classification! {
    /// Impact if the behaviour under test is broken.
    Severity, "severity", default = Medium {
        Critical => "CRITICAL",
        High => "HIGH",
        Medium => "MEDIUM",
        Low => "LOW",
        Trivial => "TRIVIAL",
    }
}

classification! {
    /// Urgency of fixing a failure.
    Priority, "priority", default = P2 {
        P0 => "P0",
        P1 => "P1",
        P2 => "P2",
        P3 => "P3",
        P4 => "P4",
    }
}

classification! {
    /// Scope of the test.
    TestLevel, "test level", default = Unit {
        Unit => "UNIT",
        Integration => "INTEGRATION",
        System => "SYSTEM",
        Acceptance => "ACCEPTANCE",
    }
}

classification! {
    /// Purpose of the test.
    TestType, "test type", default = Functional {
        Functional => "FUNCTIONAL",
        Performance => "PERFORMANCE",
        Security => "SECURITY",
        Usability => "USABILITY",
        Compatibility => "COMPATIBILITY",
    }
}

classification! {
    /// Design technique used to derive the test.
    TestMethodology, "test methodology", default = BlackBox {
        BlackBox => "BLACK_BOX",
        WhiteBox => "WHITE_BOX",
        GrayBox => "GRAY_BOX",
        Positive => "POSITIVE",
        Negative => "NEGATIVE",
        BoundaryValue => "BOUNDARY_VALUE",
        EquivalencePartitioning => "EQUIVALENCE_PARTITIONING",
        StateTransition => "STATE_TRANSITION",
    }
}
