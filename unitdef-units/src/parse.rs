//! Definition line parsing
//!
//! Grammar:
//!
//! ```text
//! <name> = <value-expr> [ = <symbol> [ = <alias> ]* ]
//! <value-expr> := <expr> [ ; <key>: <value> ]*
//! ```
//!
//! Names starting with `[` are dimensions, names ending with `-` are
//! prefixes, anything else is a unit. Modifier values and prefix values are
//! evaluated with the restricted arithmetic language from `unitdef-core`.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::{debug, trace};
use unitdef_core::prelude::*;
use crate::{Converter, Definition, DimensionDefinition, PrefixDefinition, UnitDefinition};
use crate::resolve::parse_expression;

/// Modifier keys understood by unit definitions
pub const MODIFIER_KEYS: [&str; 3] = ["offset", "logbase", "factor"];

/// Accepted on unit definitions as free text; never evaluated
pub const REFERENCE_KEY: &str = "reference";

/// What to do with a modifier key that is not in `MODIFIER_KEYS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierPolicy {
    /// Fail with a syntax error
    #[default]
    Reject,
    /// Skip it without evaluating its value
    Ignore,
}

/// Parser configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub unknown_modifiers: ModifierPolicy,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_modifiers(mut self, policy: ModifierPolicy) -> Self {
        self.unknown_modifiers = policy;
        self
    }
}

/// Parses definition lines into `Definition`s
#[derive(Debug, Clone, Default)]
pub struct DefinitionParser {
    options: ParseOptions,
}

/// Parse a definition line with default options
pub fn parse_definition(line: &str) -> Result<Definition, UnitError> {
    DefinitionParser::new().parse(line)
}

/// The pieces of a definition line before any interpretation
#[derive(Debug, Clone, PartialEq)]
struct RawDefinition<'a> {
    name: &'a str,
    value: &'a str,
    symbol: Option<&'a str>,
    aliases: Vec<&'a str>,
}

impl DefinitionParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse one definition line. Errors carry the offending line.
    pub fn parse(&self, line: &str) -> Result<Definition, UnitError> {
        self.parse_inner(line).map_err(|e| e.with_line(line.trim()))
    }

    fn parse_inner(&self, line: &str) -> Result<Definition, UnitError> {
        let raw = split_definition(line)?;
        trace!(name = raw.name, value = raw.value, symbol = ?raw.symbol, aliases = ?raw.aliases, "split definition");

        let definition: Definition = if raw.name.starts_with('[') {
            self.parse_dimension(&raw)?.into()
        } else if raw.name.ends_with('-') {
            self.parse_prefix(&raw)?.into()
        } else {
            self.parse_unit(&raw)?.into()
        };

        debug!(
            name = definition.name(),
            symbol = definition.symbol(),
            converter = ?definition.converter(),
            "parsed definition"
        );
        Ok(definition)
    }

    fn parse_prefix(&self, raw: &RawDefinition<'_>) -> Result<PrefixDefinition, UnitError> {
        let scale = eval_number(raw.value)
            .map_err(|e| UnitError::value(format!("prefix value '{}': {}", raw.value, e)))?;
        let converter = Converter::scale(scale)?;
        PrefixDefinition::new(raw.name, raw.symbol, &raw.aliases, converter)
    }

    fn parse_unit(&self, raw: &RawDefinition<'_>) -> Result<UnitDefinition, UnitError> {
        let (expr, modifiers) = match raw.value.split_once(';') {
            Some((expr, clause)) => (expr, self.parse_modifiers(clause)?),
            None => (raw.value, BTreeMap::new()),
        };
        trace!(expr, modifiers = ?modifiers, "unit value");

        let parsed = parse_expression(expr)?;
        let converter = select_converter(parsed.scale, &modifiers)?;
        UnitDefinition::new(raw.name, raw.symbol, &raw.aliases, converter, parsed.units)
    }

    fn parse_dimension(&self, raw: &RawDefinition<'_>) -> Result<DimensionDefinition, UnitError> {
        if !raw.name.ends_with(']') {
            return Err(UnitError::syntax(format!("unterminated dimension name '{}'", raw.name)));
        }
        if raw.value.contains(';') {
            return Err(UnitError::syntax("dimension definitions take no modifiers"));
        }

        let parsed = parse_expression(raw.value)?;
        // Check names before the factor so "[x] = 2 * meter" reports the unit
        let definition = DimensionDefinition::new(raw.name, raw.symbol, &raw.aliases, parsed.units)?;
        if parsed.scale != 1.0 {
            return Err(UnitError::consistency(format!(
                "dimension '{}' cannot carry a numeric factor ({})", raw.name, parsed.scale
            )));
        }
        Ok(definition)
    }

    /// Parse `key: value; key: value` into evaluated numbers. Keys are
    /// checked before values, so a rejected or skipped key never evaluates.
    fn parse_modifiers(&self, clause: &str) -> Result<BTreeMap<String, f64>, UnitError> {
        let mut modifiers = BTreeMap::new();
        let mut reference: Option<&str> = None;

        for part in clause.split(';') {
            let part = part.trim();
            if part.is_empty() {
                return Err(UnitError::syntax("empty modifier"));
            }

            let (key, value) = part.split_once(':').ok_or_else(|| {
                UnitError::syntax(format!("modifier '{}' is not of the form 'key: value'", part))
            })?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() {
                return Err(UnitError::syntax(format!("modifier '{}' has no key", part)));
            }

            if key == REFERENCE_KEY {
                if value.is_empty() {
                    return Err(UnitError::syntax("modifier 'reference' has no value"));
                }
                if reference.replace(value).is_some() {
                    return Err(UnitError::syntax("duplicate modifier 'reference'"));
                }
                trace!(reference = value, "reference modifier kept unevaluated");
                continue;
            }

            if !MODIFIER_KEYS.contains(&key) {
                match self.options.unknown_modifiers {
                    ModifierPolicy::Reject => {
                        return Err(UnitError::syntax(format!("unknown modifier '{}'", key))
                            .with_suggestion(format!(
                                "Known modifiers: {}, {}",
                                MODIFIER_KEYS.join(", "),
                                REFERENCE_KEY
                            )));
                    }
                    ModifierPolicy::Ignore => {
                        trace!(key, value, "ignoring unknown modifier");
                        continue;
                    }
                }
            }

            if modifiers.contains_key(key) {
                return Err(UnitError::syntax(format!("duplicate modifier '{}'", key)));
            }
            let number = eval_number(value)
                .map_err(|e| UnitError::value(format!("modifier '{}': {}", key, e)))?;
            modifiers.insert(key.to_string(), number);
        }

        Ok(modifiers)
    }
}

/// Pick the converter variant from the declared modifiers
fn select_converter(scale: f64, modifiers: &BTreeMap<String, f64>) -> Result<Converter, UnitError> {
    let offset = modifiers.get("offset").copied().unwrap_or(0.0);
    if offset != 0.0 {
        return Converter::offset(scale, offset);
    }

    let logbase = modifiers.get("logbase").copied().unwrap_or(1.0);
    if logbase != 1.0 {
        let factor = modifiers.get("factor").copied().ok_or_else(|| {
            UnitError::syntax("logarithmic units need a 'factor' modifier")
                .with_suggestion("Add e.g. '; factor: 10' for power quantities")
        })?;
        return Converter::logarithmic(scale, logbase, factor);
    }

    Converter::scale(scale)
}

/// Split `name = value = symbol = alias...` into its parts
fn split_definition(line: &str) -> Result<RawDefinition<'_>, UnitError> {
    let (name, rest) = line
        .split_once('=')
        .ok_or_else(|| UnitError::syntax("missing '=' in definition"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(UnitError::syntax("definition name is empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(UnitError::syntax(format!("definition name '{}' contains whitespace", name)));
    }

    let mut parts = rest.split('=').map(str::trim);
    // split always yields at least one item
    let value = parts.next().unwrap_or_default();
    let symbol = parts.next();
    let aliases: Vec<&str> = parts.collect();

    Ok(RawDefinition { name, value, symbol, aliases })
}
