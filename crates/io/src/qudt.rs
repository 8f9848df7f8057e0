//! QUDT vocabulary adapter (Turtle).
//!
//! QUDT encodes dimensional analysis in dimension-vector resources
//! whose local names carry the exponents (`A0E0L1I0M0H0T-2D0`); the
//! decoder below turns those codes into `DimensionVector` records so
//! the engine can run exponent equality instead of trusting labels.

use std::collections::BTreeMap;

use metrodb_core::{DimensionVector, EntityType, ExternalEntity};

use crate::error::IoError;
use crate::turtle::{self, TurtleBlock};

pub fn parse(text: &str, source: &str) -> Result<BTreeMap<EntityType, Vec<ExternalEntity>>, IoError> {
    let blocks = turtle::parse(text, source)?;

    let mut out: BTreeMap<EntityType, Vec<ExternalEntity>> = BTreeMap::new();
    for block in &blocks {
        let Some(entity_type) = classify(block) else {
            continue;
        };
        out.entry(entity_type)
            .or_default()
            .push(to_entity(block, entity_type));
    }
    Ok(out)
}

fn classify(block: &TurtleBlock) -> Option<EntityType> {
    for class in block.types().map(turtle::local_name) {
        let ty = match class {
            "Unit" | "DerivedUnit" | "BaseUnit" => Some(EntityType::Unit),
            "Prefix" | "DecimalPrefix" | "BinaryPrefix" => Some(EntityType::Prefix),
            "QuantityKind" => Some(EntityType::Quantity),
            "QuantityKindDimensionVector" | "DimensionVector" => Some(EntityType::Dimension),
            "SystemOfUnits" => Some(EntityType::UnitSystem),
            _ => None,
        };
        if ty.is_some() {
            return ty;
        }
    }
    None
}

fn to_entity(block: &TurtleBlock, entity_type: EntityType) -> ExternalEntity {
    let local = turtle::local_name(&block.subject);

    let label = block
        .literal("label", Some("en"))
        .unwrap_or(local)
        .to_string();

    let dimension_exponents = match entity_type {
        // the vector resource itself encodes its exponents in its name
        EntityType::Dimension => decode_dimension_code(local),
        // units point at their vector resource
        EntityType::Unit => block
            .objects("hasDimensionVector")
            .filter_map(|o| o.as_iri())
            .find_map(|iri| decode_dimension_code(turtle::local_name(iri))),
        _ => None,
    };

    let multiplier = if entity_type == EntityType::Prefix {
        block
            .literal("prefixMultiplier", None)
            .and_then(|v| v.parse::<f64>().ok())
    } else {
        None
    };

    ExternalEntity {
        uri: block.subject.clone(),
        label,
        alt_label: block
            .literal("altLabel", Some("en"))
            .or_else(|| block.literal("abbreviation", Some("en")))
            .map(String::from),
        symbol: block.literal("symbol", None).map(String::from),
        dimension_exponents,
        multiplier,
    }
}

/// Decode a QUDT dimension-vector code such as `A0E0L1I0M0H0T-2D0`.
///
/// Letters map to the SI base dimensions (`H` is thermodynamic
/// temperature, `D` is QUDT's dimensionless marker and is ignored).
/// Codes with fractional exponents (`pt` notation) are not
/// representable and yield `None`.
pub fn decode_dimension_code(code: &str) -> Option<DimensionVector> {
    let mut vector = DimensionVector::default();
    let mut chars = code.chars().peekable();
    let mut seen_axes = 0;

    while let Some(axis) = chars.next() {
        if !axis.is_ascii_uppercase() {
            return None;
        }
        let mut num = String::new();
        if chars.peek() == Some(&'-') {
            num.push('-');
            chars.next();
        }
        while let Some(c) = chars.peek() {
            if c.is_ascii_digit() {
                num.push(*c);
                chars.next();
            } else if *c == 'p' {
                // fractional exponent ("pt5"); not representable
                return None;
            } else {
                break;
            }
        }
        let exponent: i32 = num.parse().ok()?;

        match axis {
            'L' => vector.length = exponent,
            'M' => vector.mass = exponent,
            'T' => vector.time = exponent,
            'E' => vector.electric_current = exponent,
            'H' => vector.thermodynamic_temperature = exponent,
            'A' => vector.amount_of_substance = exponent,
            'I' => vector.luminous_intensity = exponent,
            'D' => {}
            _ => return None,
        }
        seen_axes += 1;
    }

    if seen_axes == 0 {
        return None;
    }
    Some(vector)
}
