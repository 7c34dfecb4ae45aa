//! Converters between a unit's native values and its reference values
//!
//! Each variant is a pair of mutually inverse transforms:
//!
//! | variant     | to_reference(v)                 | from_reference(v)                   |
//! |-------------|---------------------------------|-------------------------------------|
//! | Identity    | v                               | v                                   |
//! | Scale       | v * scale                       | v / scale                           |
//! | Offset      | v * scale + offset              | (v - offset) / scale                |
//! | Logarithmic | scale * logbase ** (v / factor) | factor * log_logbase(v / scale)     |

use std::fmt;
use serde::{de, Deserialize, Deserializer, Serialize};
use unitdef_core::UnitError;

/// Deserialization goes through the validating constructors, so a
/// deserialized converter satisfies the same invariants as a built one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Converter {
    #[default]
    Identity,
    Scale {
        scale: f64,
    },
    Offset {
        scale: f64,
        offset: f64,
    },
    Logarithmic {
        /// Linear reference value at the zero point of the logarithmic scale
        scale: f64,
        logbase: f64,
        /// Multiplier applied to the logarithm (10 for dB of power, 20 for dB of amplitude)
        factor: f64,
    },
}

fn check_scale(scale: f64) -> Result<(), UnitError> {
    if scale == 0.0 || !scale.is_finite() {
        return Err(UnitError::value(format!("scale must be finite and non-zero, got {}", scale)));
    }
    Ok(())
}

impl Converter {
    /// Linear converter; `scale` must be finite and non-zero
    pub fn scale(scale: f64) -> Result<Self, UnitError> {
        check_scale(scale)?;
        Ok(Converter::Scale { scale })
    }

    /// Affine converter; `scale` must be finite and non-zero
    pub fn offset(scale: f64, offset: f64) -> Result<Self, UnitError> {
        check_scale(scale)?;
        if !offset.is_finite() {
            return Err(UnitError::value(format!("offset must be finite, got {}", offset)));
        }
        Ok(Converter::Offset { scale, offset })
    }

    /// Logarithmic converter; `logbase` must be positive and not 1, `factor` non-zero
    pub fn logarithmic(scale: f64, logbase: f64, factor: f64) -> Result<Self, UnitError> {
        check_scale(scale)?;
        if logbase.is_nan() || logbase <= 0.0 || logbase == 1.0 || logbase.is_infinite() {
            return Err(UnitError::value(format!(
                "logbase must be positive and different from 1, got {}", logbase
            )));
        }
        if factor == 0.0 || !factor.is_finite() {
            return Err(UnitError::value(format!("factor must be finite and non-zero, got {}", factor)));
        }
        Ok(Converter::Logarithmic { scale, logbase, factor })
    }

    /// True iff the transform is a pure scale
    pub fn is_multiplicative(&self) -> bool {
        match self {
            Converter::Identity | Converter::Scale { .. } => true,
            Converter::Offset { offset, .. } => *offset == 0.0,
            Converter::Logarithmic { .. } => false,
        }
    }

    /// Map a native value to the reference scale
    pub fn to_reference(&self, value: f64) -> f64 {
        match *self {
            Converter::Identity => value,
            Converter::Scale { scale } => value * scale,
            Converter::Offset { scale, offset } => value * scale + offset,
            Converter::Logarithmic { scale, logbase, factor } => {
                scale * logbase.powf(value / factor)
            }
        }
    }

    /// Map a reference value back to the native scale.
    ///
    /// Only the logarithmic variant can fail: `value / scale` must be
    /// positive and finite.
    pub fn from_reference(&self, value: f64) -> Result<f64, UnitError> {
        match *self {
            Converter::Identity => Ok(value),
            Converter::Scale { scale } => Ok(value / scale),
            Converter::Offset { scale, offset } => Ok((value - offset) / scale),
            Converter::Logarithmic { scale, logbase, factor } => {
                let ratio = check_log_domain(value, scale)?;
                Ok(factor * ratio.ln() / logbase.ln())
            }
        }
    }

    /// In-place variant of `to_reference` over a buffer
    pub fn to_reference_in_place(&self, values: &mut [f64]) {
        for v in values.iter_mut() {
            *v = self.to_reference(*v);
        }
    }

    /// In-place variant of `from_reference` over a buffer.
    /// On error the buffer is left untouched.
    pub fn from_reference_in_place(&self, values: &mut [f64]) -> Result<(), UnitError> {
        if let Converter::Logarithmic { scale, .. } = *self {
            for &v in values.iter() {
                check_log_domain(v, scale)?;
            }
        }
        for v in values.iter_mut() {
            *v = self.from_reference(*v)?;
        }
        Ok(())
    }
}

fn check_log_domain(value: f64, scale: f64) -> Result<f64, UnitError> {
    let ratio = value / scale;
    if ratio.is_nan() || ratio <= 0.0 || ratio.is_infinite() {
        return Err(UnitError::domain(format!(
            "logarithmic conversion needs value / reference > 0, got {} / {}", value, scale
        )));
    }
    Ok(ratio)
}

impl fmt::Display for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converter::Identity => write!(f, "identity"),
            Converter::Scale { scale } => write!(f, "scale({})", scale),
            Converter::Offset { scale, offset } => {
                write!(f, "offset(scale: {}, offset: {})", scale, offset)
            }
            Converter::Logarithmic { scale, logbase, factor } => {
                write!(f, "logarithmic(scale: {}, logbase: {}, factor: {})", scale, logbase, factor)
            }
        }
    }
}

/// Unchecked wire form of `Converter`
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawConverter {
    Identity,
    Scale { scale: f64 },
    Offset { scale: f64, offset: f64 },
    Logarithmic { scale: f64, logbase: f64, factor: f64 },
}

impl TryFrom<RawConverter> for Converter {
    type Error = UnitError;

    fn try_from(raw: RawConverter) -> Result<Self, Self::Error> {
        match raw {
            RawConverter::Identity => Ok(Converter::Identity),
            RawConverter::Scale { scale } => Converter::scale(scale),
            RawConverter::Offset { scale, offset } => Converter::offset(scale, offset),
            RawConverter::Logarithmic { scale, logbase, factor } => {
                Converter::logarithmic(scale, logbase, factor)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Converter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawConverter::deserialize(deserializer)?;
        Converter::try_from(raw).map_err(de::Error::custom)
    }
}
