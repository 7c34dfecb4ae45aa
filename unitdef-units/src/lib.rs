//! Unitdef Units - Unit, prefix and dimension definitions
//!
//! Parses definition lines such as
//!
//! ```text
//! m- = 1e-3
//! meter = [length] = m = metre
//! degF = 9 / 5 * kelvin; offset: 255.372222
//! dBW = 1 W; logbase: 10; factor: 10
//! [speed] = [length]/[time]
//! ```
//!
//! into typed definitions, each owning a converter between the unit's
//! native values and its reference (base) values:
//! - Scale (linear), Offset (affine), Logarithmic (decibel-style)
//! - Dimensions carry a reference composition only

mod container;
mod converter;
mod definition;
mod parse;
mod resolve;

pub use container::{UnitsContainer, is_dimension};
pub use converter::Converter;
pub use definition::{Definition, Names, PrefixDefinition, UnitDefinition, DimensionDefinition};
pub use parse::{parse_definition, DefinitionParser, ParseOptions, ModifierPolicy, MODIFIER_KEYS, REFERENCE_KEY};
pub use resolve::{parse_expression, ParsedExpression};

pub use unitdef_core::{UnitError, ErrorKind};
