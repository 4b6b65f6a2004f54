//! Unit normalization for activity quantities
//!
//! Converts heterogeneous input units into the canonical unit an emission
//! factor is defined against. Ratios come from a closed conversion table;
//! nothing is inferred. Converting a unit to itself is always the identity,
//! even for unit keys the table does not know (count-like units such as
//! "impression" have no cross conversions at all).
//!
//! All functions here are pure.

use crate::error::{EmistatError, Result};
use crate::types::Unit;

/// Fixed conversion ratios: 1 `from` = `ratio` × `to`.
///
/// The table is symmetric by construction of [`conversion_ratio`]: a lookup
/// in the reverse direction uses the reciprocal. Every supported pair is
/// listed explicitly, including transitive ones (mb -> tb), so a conversion
/// either exists in this table or is rejected.
const CONVERSION_TABLE: &[(&str, &str, f64)] = &[
    // data transfer (gb is the canonical unit of the factor set)
    ("mb", "gb", 0.001),
    ("gb", "tb", 0.001),
    ("mb", "tb", 0.000001),
    // distance (km canonical)
    ("mile", "km", 1.60934),
    ("m", "km", 0.001),
    ("mile", "m", 1609.34),
    // energy (kwh canonical)
    ("wh", "kwh", 0.001),
    ("kwh", "mwh", 0.001),
    ("wh", "mwh", 0.000001),
    // volume (litre canonical)
    ("ml", "litre", 0.001),
    ("gallon", "litre", 3.78541),
    ("ml", "gallon", 0.000264172),
    // duration (hour canonical)
    ("minute", "hour", 1.0 / 60.0),
    // mass (kg canonical)
    ("g", "kg", 0.001),
    ("tonne", "kg", 1000.0),
    ("g", "tonne", 0.000001),
];

/// Resolve the fixed ratio converting `from` into `to`.
///
/// # Errors
///
/// Returns [`EmistatError::UnsupportedUnit`] when the pair has no entry in
/// the conversion table and the units are not already equal.
///
/// # Examples
/// ```
/// use emistat::types::Unit;
/// use emistat::units::conversion_ratio;
///
/// let ratio = conversion_ratio(&Unit::new("mile"), &Unit::new("km")).unwrap();
/// assert_eq!(ratio, 1.60934);
///
/// // Identity holds even for units without any table entry
/// let one = conversion_ratio(&Unit::new("impression"), &Unit::new("impression")).unwrap();
/// assert_eq!(one, 1.0);
/// ```
pub fn conversion_ratio(from: &Unit, to: &Unit) -> Result<f64> {
    if from == to {
        return Ok(1.0);
    }

    for (a, b, ratio) in CONVERSION_TABLE {
        if from.as_str() == *a && to.as_str() == *b {
            return Ok(*ratio);
        }
        if from.as_str() == *b && to.as_str() == *a {
            return Ok(1.0 / ratio);
        }
    }

    Err(EmistatError::UnsupportedUnit {
        from: from.clone(),
        to: to.clone(),
    })
}

/// Convert a quantity from one unit into another.
///
/// # Errors
///
/// Returns [`EmistatError::UnsupportedUnit`] when no conversion is defined.
pub fn normalize(quantity: f64, from: &Unit, to: &Unit) -> Result<f64> {
    Ok(quantity * conversion_ratio(from, to)?)
}
