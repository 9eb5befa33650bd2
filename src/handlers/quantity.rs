use regex::Regex;
use std::sync::OnceLock;

use super::{mismatch, ValueError, ValueHandler, ValueNode, ValueResult};
use crate::core::vocabulary::xsd;
use crate::core::Vocabulary;
use crate::model::{DataValue, QuantityValue};
use crate::sink::RdfObject;

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").expect("decimal pattern is valid"))
}

/// Lexical `xsd:decimal` form: explicit `+` dropped
fn decimal(lexical: &str) -> ValueResult<String> {
    let lexical = lexical.trim();
    if !decimal_pattern().is_match(lexical) {
        return Err(ValueError::Malformed(format!("invalid decimal: {}", lexical)));
    }
    Ok(lexical.trim_start_matches('+').to_string())
}

pub struct QuantityHandler;

impl QuantityHandler {
    fn quantity(value: &DataValue) -> ValueResult<&QuantityValue> {
        match value {
            DataValue::Quantity(q) => Ok(q),
            other => Err(mismatch("quantity", other)),
        }
    }
}

impl ValueHandler for QuantityHandler {
    fn simple_value(&self, value: &DataValue, _vocabulary: &Vocabulary) -> ValueResult<RdfObject> {
        let quantity = Self::quantity(value)?;
        Ok(RdfObject::typed(decimal(&quantity.amount)?, xsd::DECIMAL))
    }

    fn value_node(&self, value: &DataValue, vocabulary: &Vocabulary) -> ValueResult<Option<ValueNode>> {
        let quantity = Self::quantity(value)?;

        let mut node = ValueNode::new("QuantityValue")
            .with("quantityAmount", RdfObject::typed(decimal(&quantity.amount)?, xsd::DECIMAL));
        if let Some(upper) = &quantity.upper_bound {
            node = node.with("quantityUpperBound", RdfObject::typed(decimal(upper)?, xsd::DECIMAL));
        }
        if let Some(lower) = &quantity.lower_bound {
            node = node.with("quantityLowerBound", RdfObject::typed(decimal(lower)?, xsd::DECIMAL));
        }

        if quantity.unit == "1" {
            if let Some(unitless) = vocabulary.unitless_unit() {
                node = node.with("quantityUnit", RdfObject::iri(unitless));
            }
        } else {
            let unit = url::Url::parse(&quantity.unit)
                .map_err(|e| ValueError::Malformed(format!("invalid unit {}: {}", quantity.unit, e)))?;
            node = node.with("quantityUnit", RdfObject::iri(unit.as_str()));
            if let Some(id) = vocabulary.entity_id_for_uri(&quantity.unit) {
                node = node.mentioning(id);
            }
        }

        Ok(Some(node))
    }
}
