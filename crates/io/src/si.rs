//! SI digital framework adapter (Turtle).

use std::collections::BTreeMap;

use metrodb_core::{EntityType, ExternalEntity};

use crate::error::IoError;
use crate::turtle::{self, TurtleBlock};

/// Parse an SI reference point Turtle file into typed entity lists.
/// Subjects with no recognized class are ignored, not errors.
pub fn parse(text: &str, source: &str) -> Result<BTreeMap<EntityType, Vec<ExternalEntity>>, IoError> {
    let blocks = turtle::parse(text, source)?;

    let mut out: BTreeMap<EntityType, Vec<ExternalEntity>> = BTreeMap::new();
    for block in &blocks {
        let Some(entity_type) = classify(block) else {
            continue;
        };
        out.entry(entity_type).or_default().push(to_entity(block));
    }
    Ok(out)
}

fn classify(block: &TurtleBlock) -> Option<EntityType> {
    let classes: Vec<&str> = block.types().map(turtle::local_name).collect();
    for class in classes {
        let ty = match class {
            "MeasurementUnit" | "Unit" => Some(EntityType::Unit),
            "SIPrefix" | "Prefix" | "DecimalPrefix" | "BinaryPrefix" => Some(EntityType::Prefix),
            "Quantity" | "QuantityKind" => Some(EntityType::Quantity),
            "Dimension" => Some(EntityType::Dimension),
            "SystemOfUnits" | "UnitSystem" => Some(EntityType::UnitSystem),
            _ => None,
        };
        if ty.is_some() {
            return ty;
        }
    }
    None
}

fn to_entity(block: &TurtleBlock) -> ExternalEntity {
    let label = block
        .literal("label", Some("en"))
        .or_else(|| block.literal("prefLabel", Some("en")))
        .unwrap_or_else(|| turtle::local_name(&block.subject))
        .to_string();

    let symbol = block
        .literal("hasSymbol", None)
        .or_else(|| block.literal("hasUnitSymbol", None))
        .or_else(|| block.literal("symbol", None))
        .map(String::from);

    let multiplier = block
        .literal("hasScalingFactor", None)
        .or_else(|| block.literal("multiplier", None))
        .and_then(|v| v.parse::<f64>().ok());

    ExternalEntity {
        uri: block.subject.clone(),
        label,
        alt_label: block.literal("altLabel", Some("en")).map(String::from),
        symbol,
        dimension_exponents: None,
        multiplier,
    }
}
