//! Definition model: prefixes, units and dimensions
//!
//! Definitions are immutable once built. Every constructor validates its
//! inputs, so a value of any of these types always satisfies:
//! - a unit's reference is either all dimensions (base unit) or all units
//! - a dimension's reference is empty (base dimension) or all dimensions

use std::fmt;
use std::str::FromStr;
use serde::Serialize;
use unitdef_core::UnitError;
use crate::{Converter, UnitsContainer};

/// Name, optional symbol and aliases shared by every definition kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Names {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<String>,
    aliases: Vec<String>,
}

impl Names {
    fn new(name: String, symbol: Option<String>, aliases: Vec<String>) -> Result<Self, UnitError> {
        if name.is_empty() {
            return Err(UnitError::syntax("definition name is empty"));
        }
        if aliases.iter().any(|a| a.is_empty()) {
            return Err(UnitError::syntax(format!("empty alias in definition of '{}'", name)));
        }
        // An empty symbol means "no symbol"
        let symbol = symbol.filter(|s| !s.is_empty());
        Ok(Names { name, symbol, aliases })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol, falling back to the name
    pub fn symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or(&self.name)
    }

    pub fn has_symbol(&self) -> bool {
        self.symbol.is_some()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

// ============ prefix ============

/// A prefix such as `kilo-` or `m-`, always a pure scale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefixDefinition {
    #[serde(flatten)]
    names: Names,
    converter: Converter,
}

impl PrefixDefinition {
    /// Trailing `-` markers are stripped from the name, symbol and aliases.
    pub fn new(
        name: &str,
        symbol: Option<&str>,
        aliases: &[&str],
        converter: Converter,
    ) -> Result<Self, UnitError> {
        let strip = |s: &str| s.trim_end_matches('-').to_string();
        let names = Names::new(
            strip(name),
            symbol.map(strip),
            aliases.iter().copied().map(strip).collect(),
        )?;
        Ok(PrefixDefinition { names, converter })
    }

    pub fn names(&self) -> &Names {
        &self.names
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }
}

// ============ unit ============

/// A unit defined against base dimensions (base unit) or other units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitDefinition {
    #[serde(flatten)]
    names: Names,
    converter: Converter,
    reference: UnitsContainer,
    is_base: bool,
}

impl UnitDefinition {
    /// Build a unit. `is_base` is derived from `reference`; mixing
    /// dimension and unit names is a consistency error.
    pub fn new(
        name: &str,
        symbol: Option<&str>,
        aliases: &[&str],
        converter: Converter,
        reference: UnitsContainer,
    ) -> Result<Self, UnitError> {
        let is_base = if reference.all_dimensions() {
            true
        } else if !reference.any_dimension() {
            false
        } else {
            return Err(UnitError::consistency(format!(
                "cannot mix dimensions and units in the definition of '{}' ({})",
                name, reference
            ))
            .with_suggestion(
                "Base units must be referenced only to dimensions; \
                 derived units must be referenced only to units",
            ));
        };

        let names = Names::new(
            name.to_string(),
            symbol.map(str::to_string),
            aliases.iter().map(|a| a.to_string()).collect(),
        )?;
        Ok(UnitDefinition { names, converter, reference, is_base })
    }

    pub fn names(&self) -> &Names {
        &self.names
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn reference(&self) -> &UnitsContainer {
        &self.reference
    }

    pub fn is_base(&self) -> bool {
        self.is_base
    }
}

// ============ dimension ============

/// A dimension such as `[length]` (base) or `[speed] = [length]/[time]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionDefinition {
    #[serde(flatten)]
    names: Names,
    reference: UnitsContainer,
    is_base: bool,
}

impl DimensionDefinition {
    /// Build a dimension. An empty reference marks a base dimension; any
    /// non-dimension name in it is a consistency error.
    pub fn new(
        name: &str,
        symbol: Option<&str>,
        aliases: &[&str],
        reference: UnitsContainer,
    ) -> Result<Self, UnitError> {
        if !reference.all_dimensions() {
            return Err(UnitError::consistency(format!(
                "dimension '{}' must be referenced only to dimensions, got {}",
                name, reference
            ))
            .with_suggestion("Base dimensions have no reference; derived dimensions use only [names]"));
        }

        let names = Names::new(
            name.to_string(),
            symbol.map(str::to_string),
            aliases.iter().map(|a| a.to_string()).collect(),
        )?;
        let is_base = reference.is_empty();
        Ok(DimensionDefinition { names, reference, is_base })
    }

    pub fn names(&self) -> &Names {
        &self.names
    }

    pub fn reference(&self) -> &UnitsContainer {
        &self.reference
    }

    pub fn is_base(&self) -> bool {
        self.is_base
    }
}

// ============ definition ============

/// Any parsed definition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Definition {
    Prefix(PrefixDefinition),
    Unit(UnitDefinition),
    Dimension(DimensionDefinition),
}

impl Definition {
    pub fn names(&self) -> &Names {
        match self {
            Definition::Prefix(d) => d.names(),
            Definition::Unit(d) => d.names(),
            Definition::Dimension(d) => d.names(),
        }
    }

    pub fn name(&self) -> &str {
        self.names().name()
    }

    pub fn symbol(&self) -> &str {
        self.names().symbol()
    }

    pub fn has_symbol(&self) -> bool {
        self.names().has_symbol()
    }

    pub fn aliases(&self) -> &[String] {
        self.names().aliases()
    }

    /// Dimensions carry no converter
    pub fn converter(&self) -> Option<&Converter> {
        match self {
            Definition::Prefix(d) => Some(d.converter()),
            Definition::Unit(d) => Some(d.converter()),
            Definition::Dimension(_) => None,
        }
    }

    /// Dimensions are a pure product of other dimensions, so they count
    /// as multiplicative.
    pub fn is_multiplicative(&self) -> bool {
        self.converter().map_or(true, Converter::is_multiplicative)
    }

    /// Reference composition (units and dimensions only)
    pub fn reference(&self) -> Option<&UnitsContainer> {
        match self {
            Definition::Prefix(_) => None,
            Definition::Unit(d) => Some(d.reference()),
            Definition::Dimension(d) => Some(d.reference()),
        }
    }

    /// Base flag (units and dimensions only)
    pub fn is_base(&self) -> Option<bool> {
        match self {
            Definition::Prefix(_) => None,
            Definition::Unit(d) => Some(d.is_base()),
            Definition::Dimension(d) => Some(d.is_base()),
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Definition {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse_definition(s)
    }
}

impl From<PrefixDefinition> for Definition {
    fn from(d: PrefixDefinition) -> Self {
        Definition::Prefix(d)
    }
}

impl From<UnitDefinition> for Definition {
    fn from(d: UnitDefinition) -> Self {
        Definition::Unit(d)
    }
}

impl From<DimensionDefinition> for Definition {
    fn from(d: DimensionDefinition) -> Self {
        Definition::Dimension(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unitdef_core::ErrorKind;

    #[test]
    fn test_prefix_strips_markers() {
        let c = Converter::scale(1e3).unwrap();
        let p = PrefixDefinition::new("kilo-", Some("k-"), &["anotherk-"], c).unwrap();
        assert_eq!(p.names().name(), "kilo");
        assert_eq!(p.names().symbol(), "k");
        assert_eq!(p.names().aliases(), ["anotherk"]);
    }

    #[test]
    fn test_symbol_defaults_to_name() {
        let d = DimensionDefinition::new("[time]", Some(""), &[], UnitsContainer::new()).unwrap();
        assert_eq!(d.names().symbol(), "[time]");
        assert!(!d.names().has_symbol());
        assert!(d.is_base());
    }

    #[test]
    fn test_unit_is_base() {
        let base = UnitDefinition::new(
            "meter", Some("m"), &[], Converter::Identity,
            UnitsContainer::single("[length]"),
        ).unwrap();
        assert!(base.is_base());

        let derived = UnitDefinition::new(
            "coulomb", Some("C"), &[], Converter::Identity,
            UnitsContainer::from([("ampere", 1.0), ("second", 1.0)]),
        ).unwrap();
        assert!(!derived.is_base());
    }

    #[test]
    fn test_unit_rejects_mixed_reference() {
        let err = UnitDefinition::new(
            "x", None, &[], Converter::Identity,
            UnitsContainer::from([("[time]", 1.0), ("meter", 1.0)]),
        ).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Consistency);
    }

    #[test]
    fn test_dimension_rejects_units() {
        let err = DimensionDefinition::new(
            "[x]", None, &[], UnitsContainer::from([("[time]", 1.0), ("meter", 1.0)]),
        ).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Consistency);
    }

    #[test]
    fn test_empty_names_rejected() {
        let c = Converter::scale(2.0).unwrap();
        assert_eq!(PrefixDefinition::new("-", None, &[], c).unwrap_err().kind, ErrorKind::Syntax);
        assert_eq!(
            UnitDefinition::new("y", None, &["a", ""], c, UnitsContainer::new()).unwrap_err().kind,
            ErrorKind::Syntax
        );
    }

    #[test]
    fn test_definition_accessors() {
        let dim: Definition = DimensionDefinition::new(
            "[speed]", None, &[], UnitsContainer::from([("[length]", 1.0), ("[time]", -1.0)]),
        ).unwrap().into();
        assert!(dim.converter().is_none());
        assert!(dim.is_multiplicative());
        assert_eq!(dim.is_base(), Some(false));
        assert_eq!(dim.to_string(), "[speed]");

        let prefix: Definition = PrefixDefinition::new(
            "milli-", Some("m-"), &[], Converter::scale(1e-3).unwrap(),
        ).unwrap().into();
        assert!(prefix.reference().is_none());
        assert!(prefix.is_base().is_none());
        assert!(prefix.has_symbol());
        assert!(prefix.is_multiplicative());
    }

    #[test]
    fn test_serialize() {
        let unit: Definition = UnitDefinition::new(
            "degF", None, &["fahrenheit"],
            Converter::offset(9.0 / 5.0, 255.372222).unwrap(),
            UnitsContainer::single("kelvin"),
        ).unwrap().into();

        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["type"], "unit");
        assert_eq!(json["name"], "degF");
        assert!(json.get("symbol").is_none());
        assert_eq!(json["aliases"][0], "fahrenheit");
        assert_eq!(json["converter"]["kind"], "offset");
        assert_eq!(json["reference"]["kelvin"], 1.0);
        assert_eq!(json["is_base"], false);
    }
}
