//! Production and injection specifications for wells and groups.
//!
//! These are value records built by the caller from deck data. Control modes
//! round-trip through their deck keyword spelling via [`FromStr`] and
//! [`Display`](fmt::Display):
//!
//! ```
//! use twine_wells::models::wells::spec::ProductionControlMode;
//!
//! let mode: ProductionControlMode = "LRAT".parse().unwrap();
//! assert_eq!(mode, ProductionControlMode::Lrat);
//! assert_eq!(mode.to_string(), "LRAT");
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::support::{
    constraint::{Constrained, ConstraintError, NonNegative},
    phases::Phase,
};

/// Error returned when a deck keyword does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} keyword `{keyword}`")]
pub struct ParseKeywordError {
    /// What was being parsed (e.g., "production control mode").
    pub kind: &'static str,
    /// The rejected input.
    pub keyword: String,
}

macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $keyword:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),*
        }

        impl $name {
            /// Deck keyword spelling of this variant.
            #[must_use]
            pub const fn keyword(self) -> &'static str {
                match self {
                    $( Self::$variant => $keyword ),*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.keyword())
            }
        }

        impl FromStr for $name {
            type Err = ParseKeywordError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $keyword => Ok(Self::$variant), )*
                    _ => Err(ParseKeywordError {
                        kind: $kind,
                        keyword: s.to_owned(),
                    }),
                }
            }
        }
    };
}

keyword_enum! {
    /// Quantity a production target is expressed in.
    pub enum ProductionControlMode: "production control mode" {
        None => "NONE",
        /// Surface oil rate.
        Orat => "ORAT",
        /// Surface water rate.
        Wrat => "WRAT",
        /// Surface gas rate.
        Grat => "GRAT",
        /// Surface liquid (oil + water) rate.
        Lrat => "LRAT",
        Crat => "CRAT",
        /// Reservoir volume rate summed over active phases.
        Resv => "RESV",
        Prbl => "PRBL",
        Bhp => "BHP",
        Thp => "THP",
        /// Controlled by the parent group.
        Grup => "GRUP",
        /// Following a target pushed down by the parent.
        Fld => "FLD",
    }
}

keyword_enum! {
    /// Quantity an injection target is expressed in.
    pub enum InjectionControlMode: "injection control mode" {
        None => "NONE",
        /// Surface rate summed over active phases.
        Rate => "RATE",
        /// Reservoir volume rate summed over active phases.
        Resv => "RESV",
        Bhp => "BHP",
        Thp => "THP",
        /// Reinjection of a fraction of produced surface volume.
        Rein => "REIN",
        /// Voidage replacement.
        Vrep => "VREP",
        Grup => "GRUP",
        Fld => "FLD",
    }
}

keyword_enum! {
    /// Action taken when a group production target is exceeded.
    pub enum Procedure: "violation procedure" {
        /// Record the violation and do nothing else.
        None => "NONE",
        /// Shut the worst offending well in the group.
        Well => "WELL",
        /// Rescale every child to meet the target.
        Rate => "RATE",
    }
}

/// Either kind of control mode, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlMode {
    Production(ProductionControlMode),
    Injection(InjectionControlMode),
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production(mode) => write!(f, "production {mode}"),
            Self::Injection(mode) => write!(f, "injection {mode}"),
        }
    }
}

impl From<ProductionControlMode> for ControlMode {
    fn from(mode: ProductionControlMode) -> Self {
        Self::Production(mode)
    }
}

impl From<InjectionControlMode> for ControlMode {
    fn from(mode: InjectionControlMode) -> Self {
        Self::Injection(mode)
    }
}

/// Phase injected by an injection well or group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InjectorType {
    #[default]
    Water,
    Oil,
    Gas,
}

impl InjectorType {
    /// The phase this injector type injects.
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Self::Water => Phase::Water,
            Self::Oil => Phase::Oil,
            Self::Gas => Phase::Gas,
        }
    }
}

impl fmt::Display for InjectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Water => "WATER",
            Self::Oil => "OIL",
            Self::Gas => "GAS",
        })
    }
}

/// Parses an injector type from its first letter (`W`, `O` or `G`).
impl FromStr for InjectorType {
    type Err = ParseKeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes().first() {
            Some(b'W') => Ok(Self::Water),
            Some(b'O') => Ok(Self::Oil),
            Some(b'G') => Ok(Self::Gas),
            _ => Err(ParseKeywordError {
                kind: "injector type",
                keyword: s.to_owned(),
            }),
        }
    }
}

/// Returns the target if it is defined, i.e. present and non-negative.
#[must_use]
pub fn defined(target: Option<f64>) -> Option<f64> {
    target.filter(|value| *value >= 0.0)
}

/// Production targets and settings of a well or group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionSpecification {
    pub control_mode: ProductionControlMode,
    pub procedure: Procedure,
    pub oil_max_rate: Option<f64>,
    pub water_max_rate: Option<f64>,
    pub gas_max_rate: Option<f64>,
    pub liquid_max_rate: Option<f64>,
    pub reservoir_flow_max_rate: Option<f64>,
    pub bhp_limit: Option<f64>,
    pub guide_rate: Constrained<f64, NonNegative>,
}

impl Default for ProductionSpecification {
    fn default() -> Self {
        Self {
            control_mode: ProductionControlMode::None,
            procedure: Procedure::None,
            oil_max_rate: None,
            water_max_rate: None,
            gas_max_rate: None,
            liquid_max_rate: None,
            reservoir_flow_max_rate: None,
            bhp_limit: None,
            guide_rate: NonNegative::one(),
        }
    }
}

impl ProductionSpecification {
    /// Sets the guide rate.
    ///
    /// # Errors
    ///
    /// Returns an error if `guide_rate` is negative or `NaN`.
    pub fn with_guide_rate(mut self, guide_rate: f64) -> Result<Self, ConstraintError> {
        self.guide_rate = NonNegative::new(guide_rate)?;
        Ok(self)
    }
}

/// Injection targets and settings of a well or group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InjectionSpecification {
    pub injector_type: InjectorType,
    pub control_mode: InjectionControlMode,
    pub surface_flow_max_rate: Option<f64>,
    pub reservoir_flow_max_rate: Option<f64>,
    pub bhp_limit: Option<f64>,
    pub reinjection_fraction_target: Constrained<f64, NonNegative>,
    pub voidage_replacement_fraction: Constrained<f64, NonNegative>,
    pub guide_rate: Constrained<f64, NonNegative>,
}

impl Default for InjectionSpecification {
    fn default() -> Self {
        Self {
            injector_type: InjectorType::Water,
            control_mode: InjectionControlMode::None,
            surface_flow_max_rate: None,
            reservoir_flow_max_rate: None,
            bhp_limit: None,
            reinjection_fraction_target: NonNegative::zero(),
            voidage_replacement_fraction: NonNegative::zero(),
            guide_rate: NonNegative::one(),
        }
    }
}

impl InjectionSpecification {
    /// Sets the guide rate.
    ///
    /// # Errors
    ///
    /// Returns an error if `guide_rate` is negative or `NaN`.
    pub fn with_guide_rate(mut self, guide_rate: f64) -> Result<Self, ConstraintError> {
        self.guide_rate = NonNegative::new(guide_rate)?;
        Ok(self)
    }
}

/// The production and injection specifications of one tree node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeSpecs {
    pub production: ProductionSpecification,
    pub injection: InjectionSpecification,
}

impl NodeSpecs {
    #[must_use]
    pub fn new(production: ProductionSpecification, injection: InjectionSpecification) -> Self {
        Self {
            production,
            injection,
        }
    }

    /// Specs of a producing well; the injection guide rate is zeroed.
    #[must_use]
    pub fn producer_well(production: ProductionSpecification) -> Self {
        Self {
            production,
            injection: InjectionSpecification {
                guide_rate: NonNegative::zero(),
                ..InjectionSpecification::default()
            },
        }
    }

    /// Specs of an injecting well; the production guide rate is zeroed.
    #[must_use]
    pub fn injector_well(injection: InjectionSpecification) -> Self {
        Self {
            production: ProductionSpecification {
                guide_rate: NonNegative::zero(),
                ..ProductionSpecification::default()
            },
            injection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_modes_round_trip_through_keywords() {
        for keyword in [
            "NONE", "ORAT", "WRAT", "GRAT", "LRAT", "CRAT", "RESV", "PRBL", "BHP", "THP", "GRUP",
            "FLD",
        ] {
            let mode: ProductionControlMode = keyword.parse().unwrap();
            assert_eq!(mode.to_string(), keyword);
        }
    }

    #[test]
    fn unknown_keyword_is_rejected() {
        let err = "XRAT".parse::<InjectionControlMode>().unwrap_err();
        assert_eq!(err.keyword, "XRAT");
        assert_eq!(err.kind, "injection control mode");
        assert!("well".parse::<Procedure>().is_err());
    }

    #[test]
    fn injector_type_uses_first_letter() {
        assert_eq!("WATER".parse::<InjectorType>(), Ok(InjectorType::Water));
        assert_eq!("GAS".parse::<InjectorType>(), Ok(InjectorType::Gas));
        assert_eq!("OIL".parse::<InjectorType>(), Ok(InjectorType::Oil));
        assert!("".parse::<InjectorType>().is_err());
    }

    #[test]
    fn defaults() {
        let prod = ProductionSpecification::default();
        assert_eq!(prod.control_mode, ProductionControlMode::None);
        assert_eq!(prod.procedure, Procedure::None);
        assert_eq!(prod.guide_rate.get(), 1.0);
        assert_eq!(prod.oil_max_rate, None);

        let inj = InjectionSpecification::default();
        assert_eq!(inj.injector_type, InjectorType::Water);
        assert_eq!(inj.guide_rate.get(), 1.0);
        assert_eq!(inj.reinjection_fraction_target.get(), 0.0);
    }

    #[test]
    fn well_specs_zero_the_unused_guide_rate() {
        let producer = NodeSpecs::producer_well(ProductionSpecification::default());
        assert_eq!(producer.production.guide_rate.get(), 1.0);
        assert_eq!(producer.injection.guide_rate.get(), 0.0);

        let injector = NodeSpecs::injector_well(InjectionSpecification::default());
        assert_eq!(injector.production.guide_rate.get(), 0.0);
    }

    #[test]
    fn negative_targets_are_undefined() {
        assert_eq!(defined(Some(10.0)), Some(10.0));
        assert_eq!(defined(Some(0.0)), Some(0.0));
        assert_eq!(defined(Some(-1.0)), None);
        assert_eq!(defined(None), None);
    }
}
