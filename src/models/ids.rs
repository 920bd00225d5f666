//! Strongly-typed ID wrappers for the store's surrogate keys
//!
//! Both tables use integer identities handed out by the store. Wrapping them
//! keeps a patient key from being passed where a vital key is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate integer ID newtype wrappers
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw key
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the raw key
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Store-assigned keys start at 1; zero and below mean "not assigned"
            pub const fn is_assigned(&self) -> bool {
                self.0 > 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

define_id!(PatientId);
define_id!(VitalId);
