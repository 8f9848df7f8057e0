//! UCUM essence file adapter (XML).
//!
//! Reads `<prefix>`, `<base-unit>` and `<unit>` elements from the
//! ucum-essence XML. The case-sensitive `Code` attribute becomes the
//! uri fragment; `<name>` and `<printSymbol>` fill label and symbol;
//! a prefix's `<value value="…">` is its scale multiplier.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use metrodb_core::{EntityType, ExternalEntity};

use crate::error::IoError;

const URI_BASE: &str = "https://ucum.org/ucum#";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Capture {
    Name,
    PrintSymbol,
}

pub fn parse(xml: &str, source: &str) -> Result<BTreeMap<EntityType, Vec<ExternalEntity>>, IoError> {
    let xml_err = |detail: String| IoError::VocabParse {
        source: source.to_string(),
        detail,
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut out: BTreeMap<EntityType, Vec<ExternalEntity>> = BTreeMap::new();
    let mut current: Option<(EntityType, ExternalEntity)> = None;
    let mut capture: Option<Capture> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"prefix" | b"base-unit" | b"unit" => {
                    let entity_type = if e.name().as_ref() == b"prefix" {
                        EntityType::Prefix
                    } else {
                        EntityType::Unit
                    };
                    current = element_code(e).map(|code| (entity_type, entity_for(&code)));
                }
                b"name" if current.is_some() && capture.is_none() => {
                    capture = Some(Capture::Name);
                }
                b"printSymbol" if current.is_some() => {
                    capture = Some(Capture::PrintSymbol);
                }
                b"value" => {
                    store_value(e, &mut current);
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"value" => {
                    store_value(e, &mut current);
                }
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                if let (Some(field), Some((_, entity))) = (capture, current.as_mut()) {
                    let text = t
                        .unescape()
                        .map_err(|e| xml_err(format!("bad text content: {e}")))?;
                    append_text(entity, field, &text);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"prefix" | b"base-unit" | b"unit" => {
                    if let Some((entity_type, entity)) = current.take() {
                        out.entry(entity_type).or_default().push(entity);
                    }
                    capture = None;
                }
                b"name" | b"printSymbol" => capture = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_err(format!("XML parse error: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

fn entity_for(code: &str) -> ExternalEntity {
    ExternalEntity {
        uri: format!("{URI_BASE}{code}"),
        ..Default::default()
    }
}

fn element_code(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"Code" {
            let code = String::from_utf8_lossy(&attr.value).to_string();
            if !code.is_empty() {
                return Some(code);
            }
        }
    }
    None
}

/// `<value value="…">` carries the numeric scale; only prefixes use it
/// as a multiplier.
fn store_value(
    e: &quick_xml::events::BytesStart<'_>,
    current: &mut Option<(EntityType, ExternalEntity)>,
) {
    let Some((EntityType::Prefix, entity)) = current.as_mut() else {
        return;
    };
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"value" {
            let raw = String::from_utf8_lossy(&attr.value).to_string();
            entity.multiplier = raw.parse::<f64>().ok();
        }
    }
}

/// First `<name>` is the label, the second the alt label; symbol text
/// accumulates across markup children (`<i>`, `<sub>`, …).
fn append_text(entity: &mut ExternalEntity, field: Capture, text: &str) {
    match field {
        Capture::Name => {
            if entity.label.is_empty() {
                entity.label = text.to_string();
            } else if entity.alt_label.is_none() {
                entity.alt_label = Some(text.to_string());
            }
        }
        Capture::PrintSymbol => match entity.symbol.as_mut() {
            Some(symbol) => symbol.push_str(text),
            None => entity.symbol = Some(text.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root xmlns="http://unitsofmeasure.org/ucum-essence">
  <prefix Code="k" CODE="K">
    <name>kilo</name>
    <printSymbol>k</printSymbol>
    <value value="1e3">1 &#215; 10<sup>3</sup></value>
  </prefix>
  <base-unit Code="m" CODE="M" dim="L">
    <name>meter</name>
    <printSymbol>m</printSymbol>
    <property>length</property>
  </base-unit>
  <unit Code="N" CODE="N" isMetric="yes" class="si">
    <name>newton</name>
    <printSymbol>N</printSymbol>
    <property>force</property>
    <value Unit="kg.m/s2" UNIT="KG.M/S2" value="1">1</value>
  </unit>
  <unit Code="cel" CODE="CEL" isMetric="yes" isSpecial="yes" class="si">
    <name>degree Celsius</name>
    <printSymbol>&#176;C</printSymbol>
    <property>temperature</property>
  </unit>
</root>
"#;

    #[test]
    fn prefixes_and_units_separated() {
        let out = parse(SAMPLE, "ucum-essence.xml").unwrap();
        assert_eq!(out[&EntityType::Prefix].len(), 1);
        assert_eq!(out[&EntityType::Unit].len(), 3);
    }

    #[test]
    fn prefix_gets_multiplier() {
        let out = parse(SAMPLE, "ucum-essence.xml").unwrap();
        let kilo = &out[&EntityType::Prefix][0];
        assert_eq!(kilo.uri, "https://ucum.org/ucum#k");
        assert_eq!(kilo.label, "kilo");
        assert_eq!(kilo.symbol.as_deref(), Some("k"));
        assert_eq!(kilo.multiplier, Some(1000.0));
    }

    #[test]
    fn unit_value_is_not_a_multiplier() {
        let out = parse(SAMPLE, "ucum-essence.xml").unwrap();
        let newton = out[&EntityType::Unit]
            .iter()
            .find(|u| u.label == "newton")
            .unwrap();
        assert_eq!(newton.multiplier, None);
        assert_eq!(newton.symbol.as_deref(), Some("N"));
    }

    #[test]
    fn codes_are_case_sensitive_in_uris() {
        let out = parse(SAMPLE, "ucum-essence.xml").unwrap();
        let cel = out[&EntityType::Unit]
            .iter()
            .find(|u| u.label == "degree Celsius")
            .unwrap();
        assert_eq!(cel.uri, "https://ucum.org/ucum#cel");
        assert_eq!(cel.symbol.as_deref(), Some("°C"));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = parse("<unit Code=\"m\"><name>meter</unit>", "bad.xml").unwrap_err();
        assert!(matches!(err, IoError::VocabParse { .. }), "got {err:?}");
    }
}
