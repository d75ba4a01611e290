#![forbid(unsafe_code)]

//! Runtime mode definitions for Strict and Hardened descriptor validation.

use serde::{Deserialize, Serialize};

/// Operational mode governing how much validation runs on a descriptor.
///
/// - **Strict**: apply exactly the layout rules the execution library
///   enforces; anything those rules accept is accepted.
/// - **Hardened**: additionally reject descriptors whose storage types
///   disagree with the transform kind, or whose output layout writes the
///   same element twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeMode {
    #[default]
    Strict,
    Hardened,
}

impl RuntimeMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Hardened => "hardened",
        }
    }

    #[must_use]
    pub const fn is_hardened(self) -> bool {
        matches!(self, Self::Hardened)
    }
}

impl std::str::FromStr for RuntimeMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "hardened" => Ok(Self::Hardened),
            other => Err(format!("unknown runtime mode `{other}`")),
        }
    }
}
