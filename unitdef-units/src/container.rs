//! Compositions of named units or dimensions
//!
//! A `UnitsContainer` maps names to exponents and represents their product,
//! e.g. `{meter: 1, second: -1}` is meters per second. Bracketed names such
//! as `[length]` are dimensions; everything else is a unit.

use std::collections::BTreeMap;
use std::fmt;
use serde::{de, Deserialize, Deserializer, Serialize};

/// True if `name` denotes a dimension (`[length]`, `[time]`, ...)
pub fn is_dimension(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('[') && name.ends_with(']')
}

/// Product of powers of named units or dimensions.
/// Zero exponents are never stored, so equality ignores them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UnitsContainer {
    exponents: BTreeMap<String, f64>,
}

impl UnitsContainer {
    /// Empty composition (dimensionless)
    pub fn new() -> Self {
        Self::default()
    }

    /// Composition of a single name with exponent 1
    pub fn single(name: impl Into<String>) -> Self {
        let mut c = Self::new();
        c.add(name, 1.0);
        c
    }

    /// Exponent of `name`, zero if absent
    pub fn get(&self, name: &str) -> f64 {
        self.exponents.get(name).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.exponents.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.exponents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exponents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.exponents.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.exponents.keys().map(|k| k.as_str())
    }

    /// True if every key is a dimension (vacuously true when empty)
    pub fn all_dimensions(&self) -> bool {
        self.keys().all(is_dimension)
    }

    /// True if at least one key is a dimension
    pub fn any_dimension(&self) -> bool {
        self.keys().any(is_dimension)
    }

    /// Multiply compositions (add exponents)
    pub fn multiply(&self, other: &UnitsContainer) -> UnitsContainer {
        let mut result = self.clone();
        for (name, exp) in other.iter() {
            result.add(name, exp);
        }
        result
    }

    /// Divide compositions (subtract exponents)
    pub fn divide(&self, other: &UnitsContainer) -> UnitsContainer {
        let mut result = self.clone();
        for (name, exp) in other.iter() {
            result.add(name, -exp);
        }
        result
    }

    /// Raise to a power (multiply exponents)
    pub fn power(&self, exp: f64) -> UnitsContainer {
        self.iter().map(|(name, e)| (name, e * exp)).collect()
    }

    /// Invert (negate exponents)
    pub fn invert(&self) -> UnitsContainer {
        self.power(-1.0)
    }

    fn add(&mut self, name: impl Into<String>, exp: f64) {
        let name = name.into();
        let total = self.get(&name) + exp;
        if total == 0.0 {
            self.exponents.remove(&name);
        } else {
            self.exponents.insert(name, total);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for UnitsContainer {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut c = UnitsContainer::new();
        for (name, exp) in iter {
            c.add(name, exp);
        }
        c
    }
}

impl<K: Into<String>, const N: usize> From<[(K, f64); N]> for UnitsContainer {
    fn from(items: [(K, f64); N]) -> Self {
        items.into_iter().collect()
    }
}

// Rebuilt through `add` so zeros are dropped
impl<'de> Deserialize<'de> for UnitsContainer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let exponents = BTreeMap::<String, f64>::deserialize(deserializer)?;
        if let Some((name, exp)) = exponents.iter().find(|(_, e)| !e.is_finite()) {
            return Err(de::Error::custom(format!(
                "exponent of '{}' must be finite, got {}", name, exp
            )));
        }
        Ok(exponents.into_iter().collect())
    }
}

fn fmt_exponent(exp: f64) -> String {
    if exp.fract() == 0.0 {
        format!("{}", exp as i64)
    } else {
        format!("{}", exp)
    }
}

fn fmt_factors<'a>(factors: impl Iterator<Item = (&'a str, f64)>) -> String {
    factors
        .map(|(name, exp)| {
            if exp == 1.0 {
                name.to_string()
            } else {
                format!("{} ** {}", name, fmt_exponent(exp))
            }
        })
        .collect::<Vec<_>>()
        .join(" * ")
}

impl fmt::Display for UnitsContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numerator = fmt_factors(self.iter().filter(|(_, e)| *e > 0.0));
        let denominator = fmt_factors(
            self.iter().filter(|(_, e)| *e < 0.0).map(|(n, e)| (n, -e)),
        );

        match (numerator.is_empty(), denominator.is_empty()) {
            (true, true) => write!(f, "dimensionless"),
            (false, true) => write!(f, "{}", numerator),
            (true, false) => write!(f, "1 / {}", denominator),
            (false, false) => write!(f, "{} / {}", numerator, denominator),
        }
    }
}
