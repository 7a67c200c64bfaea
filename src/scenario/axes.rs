//! Value domains of the six scenario axes
//!
//! Every axis value has a short code used in scenario names and filenames
//! (`2p6`, `Tech`, `L`, `Mkt`, ...). Parsing is case-insensitive and also
//! accepts the long names, so `"Market-driven"`, `"market"` and `"Mkt"` all give
//! [`Allocation::Market`]. Serialized values always use the code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnsembleError;

/// Defines a closed axis enum with its code, aliases and string conversions
macro_rules! axis {
    (
        $(#[$meta:meta])*
        $name:ident ($axis:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $code:literal $(| $alias:literal)*
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )*
        }

        impl $name {
            /// Every value of this axis, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Short code used in scenario names
            pub fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code,)*
                }
            }
        }

        impl FromStr for $name {
            type Err = EnsembleError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s.trim().to_ascii_lowercase();
                $(
                    if value == $code.to_ascii_lowercase() $(|| value == $alias)* {
                        return Ok($name::$variant);
                    }
                )*
                Err(EnsembleError::invalid_param($axis, s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }

        impl TryFrom<String> for $name {
            type Error = EnsembleError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.code().to_string()
            }
        }
    };
}

axis! {
    /// Representative Concentration Pathway (radiative forcing target, W/m²)
    Rcp ("RCP") {
        Rcp2p6 => "2p6" | "2.6" | "rcp2.6" | "rcp2p6",
        Rcp4p5 => "4p5" | "4.5" | "rcp4.5" | "rcp4p5",
        Rcp6p0 => "6p0" | "6.0" | "6" | "rcp6.0" | "rcp6p0",
        Rcp8p5 => "8p5" | "8.5" | "rcp8.5" | "rcp8p5",
        /// No forcing target
        Baseline => "Baseline" | "base" | "reference",
    }
}

axis! {
    /// Technology level
    Technology ("technology") {
        Basic => "Basic",
        Advanced => "Tech" | "advanced",
    }
}

axis! {
    /// Supply capacity
    Supply ("supply") {
        Low => "L" | "low",
        Medium => "M" | "medium",
        High => "H" | "high",
    }
}

axis! {
    /// Allocation regime
    Allocation ("allocation") {
        Market => "Mkt" | "market" | "market-driven",
        Regulatory => "Reg" | "regulatory",
    }
}

impl Rcp {
    /// Whether this pathway has no policy target
    pub fn is_baseline(self) -> bool {
        self == Rcp::Baseline
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SSP
// ─────────────────────────────────────────────────────────────────────────────

/// Shared Socioeconomic Pathway identifier
///
/// The standard narratives are `SSP1`..`SSP5` ([`Ssp::ALL`]). Any positive id
/// parses; composing an id that has no loaded fragment is a merge error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ssp(u8);

impl Ssp {
    pub const SSP1: Ssp = Ssp(1);
    pub const SSP2: Ssp = Ssp(2);
    pub const SSP3: Ssp = Ssp(3);
    pub const SSP4: Ssp = Ssp(4);
    pub const SSP5: Ssp = Ssp(5);

    /// The five standard pathways
    pub const ALL: &'static [Ssp] = &[Ssp::SSP1, Ssp::SSP2, Ssp::SSP3, Ssp::SSP4, Ssp::SSP5];

    /// Create an SSP id, rejecting zero
    pub fn new(id: u8) -> Result<Self, EnsembleError> {
        if id == 0 {
            return Err(EnsembleError::invalid_param("SSP", id.to_string()));
        }
        Ok(Self(id))
    }

    /// Numeric id
    pub fn id(self) -> u8 {
        self.0
    }

    /// Whether this is one of the five standard pathways
    pub fn is_standard(self) -> bool {
        (1..=5).contains(&self.0)
    }
}

impl FromStr for Ssp {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let digits = match value.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("ssp") => &value[3..],
            _ => value,
        };
        let id = digits
            .parse::<u8>()
            .map_err(|_| EnsembleError::invalid_param("SSP", s))?;
        Ssp::new(id).map_err(|_| EnsembleError::invalid_param("SSP", s))
    }
}

impl fmt::Display for Ssp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SSP{}", self.0)
    }
}

impl TryFrom<String> for Ssp {
    type Error = EnsembleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ssp> for String {
    fn from(value: Ssp) -> Self {
        value.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Policy rate
// ─────────────────────────────────────────────────────────────────────────────

/// Policy adoption rate in percent (0..=100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PolicyRate(pub(super) u8);

impl PolicyRate {
    pub const MAX: u8 = 100;

    /// Create a rate, rejecting values above 100
    pub fn new(percent: u8) -> Result<Self, EnsembleError> {
        if percent > Self::MAX {
            return Err(EnsembleError::invalid_param(
                "policy rate",
                percent.to_string(),
            ));
        }
        Ok(Self(percent))
    }

    /// Rate in percent
    pub fn percent(self) -> u8 {
        self.0
    }
}

impl FromStr for PolicyRate {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let digits = match value.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case("pr") => &value[2..],
            _ => value,
        };
        let percent = digits
            .parse::<u8>()
            .map_err(|_| EnsembleError::invalid_param("policy rate", s))?;
        PolicyRate::new(percent)
    }
}

/// Displays as the bare number; scenario names add the `PR` prefix
impl fmt::Display for PolicyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for PolicyRate {
    type Error = EnsembleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PolicyRate::new(value)
    }
}

impl From<PolicyRate> for u8 {
    fn from(value: PolicyRate) -> Self {
        value.0
    }
}
