use super::BuildContext;
use crate::core::error::{ExportError, ExportResult};
use crate::core::flags::ProducerFlag;
use crate::core::vocabulary::{rdf, PropertyNamespace};
use crate::handlers::ValueError;
use crate::model::hash::content_hash;
use crate::model::{EntityId, Snak};

/// Dedupe namespace of full value nodes
pub const VALUE_NAMESPACE: &str = "V";

/// Where a snak appears, which selects its predicate family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakRole {
    /// Truthy triple on the entity itself; always the simple value
    Direct,
    Statement,
    Qualifier,
    Reference,
}

impl SnakRole {
    pub fn simple_namespace(self) -> PropertyNamespace {
        match self {
            SnakRole::Direct => PropertyNamespace::Direct,
            SnakRole::Statement => PropertyNamespace::Statement,
            SnakRole::Qualifier => PropertyNamespace::Qualifier,
            SnakRole::Reference => PropertyNamespace::Reference,
        }
    }

    pub fn value_namespace(self) -> Option<PropertyNamespace> {
        match self {
            SnakRole::Direct => None,
            SnakRole::Statement => Some(PropertyNamespace::StatementValue),
            SnakRole::Qualifier => Some(PropertyNamespace::QualifierValue),
            SnakRole::Reference => Some(PropertyNamespace::ReferenceValue),
        }
    }
}

fn value_error(property: &EntityId, error: ValueError) -> ExportError {
    match error {
        ValueError::Export(e) => e,
        other => ExportError::InvalidValue {
            property: property.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Emit the triples for one snak on `subject`.
///
/// Every IRI and value is computed before the first triple is written, so a
/// failing snak leaves no partial output behind.
pub fn add_snak(ctx: &mut BuildContext<'_>, subject: &str, snak: &Snak, role: SnakRole) -> ExportResult<()> {
    match snak {
        Snak::NoValue { property } => {
            let class = ctx.vocabulary.property_uri(PropertyNamespace::NoValue, property)?;
            ctx.link(subject, rdf::TYPE, &class);
        }
        Snak::SomeValue { property } => {
            let predicate = ctx.vocabulary.property_uri(role.simple_namespace(), property)?;
            let genid = ctx
                .vocabulary
                .genid_uri(&content_hash(format!("{}\n{}", subject, snak.hash()).as_bytes()));
            ctx.link(subject, &predicate, &genid);
        }
        Snak::Value {
            property,
            datatype,
            datavalue,
        } => {
            let handler = ctx.handlers.get(datatype).ok_or_else(|| ExportError::UnsupportedDatatype {
                property: property.to_string(),
                datatype: datatype.clone(),
            })?;

            let predicate = ctx.vocabulary.property_uri(role.simple_namespace(), property)?;
            let object = handler
                .simple_value(datavalue, ctx.vocabulary)
                .map_err(|e| value_error(property, e))?;

            let full = match role.value_namespace() {
                Some(ns) if ctx.has(ProducerFlag::FullValues) => {
                    match handler
                        .value_node(datavalue, ctx.vocabulary)
                        .map_err(|e| value_error(property, e))?
                    {
                        Some(node) => Some((ctx.vocabulary.property_uri(ns, property)?, node)),
                        None => None,
                    }
                }
                _ => None,
            };

            ctx.emit(subject, &predicate, object);
            let mentioned = handler.mentioned_entities(datavalue, ctx.vocabulary);
            ctx.mentioned.extend(mentioned);

            if let Some((value_predicate, node)) = full {
                ctx.mentioned.extend(node.mentioned);
                let hash = datavalue.hash();
                let node_iri = ctx.vocabulary.value_uri(&hash);
                ctx.link(subject, &value_predicate, &node_iri);

                if !ctx.dedupe.already_seen(&hash, VALUE_NAMESPACE) {
                    ctx.link(&node_iri, rdf::TYPE, &node.class);
                    for (node_predicate, node_object) in node.properties {
                        ctx.emit(&node_iri, &node_predicate, node_object);
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::testing::Fixture;
    use crate::core::flags::ProducerPolicy;
    use crate::model::{DataValue, EntityIdValue, QuantityValue};

    const SUBJECT: &str = "http://www.wikidata.org/entity/statement/Q1-abc";

    fn pid(s: &str) -> EntityId {
        EntityId::parse(s).unwrap()
    }

    fn quantity_snak(property: &str) -> Snak {
        Snak::value(
            pid(property),
            "quantity",
            DataValue::Quantity(QuantityValue {
                amount: "+5".to_string(),
                unit: "http://www.wikidata.org/entity/Q11573".to_string(),
                upper_bound: None,
                lower_bound: None,
            }),
        )
    }

    #[test]
    fn test_direct_snak_is_simple() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::all());
        add_snak(&mut ctx, "http://www.wikidata.org/entity/Q1", &quantity_snak("P2"), SnakRole::Direct).unwrap();
        assert!(ctx.mentioned.is_empty());
        drop(ctx);

        assert_eq!(
            fixture.ntriples(),
            vec![
                "<http://www.wikidata.org/entity/Q1> <http://www.wikidata.org/prop/direct/P2> \"5\"^^<http://www.w3.org/2001/XMLSchema#decimal> ."
            ]
        );
    }

    #[test]
    fn test_full_value_node_emitted_once() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::all());
        add_snak(&mut ctx, SUBJECT, &quantity_snak("P2"), SnakRole::Statement).unwrap();
        let mentioned = ctx.mentioned.clone();
        drop(ctx);

        // simple + link + type + amount + unit
        assert_eq!(fixture.output.len(), 5);
        assert_eq!(mentioned, vec![pid("Q11573")]);

        let mut ctx = fixture.context(ProducerPolicy::all());
        add_snak(&mut ctx, SUBJECT, &quantity_snak("P3"), SnakRole::Qualifier).unwrap();
        drop(ctx);

        // same value again: simple + link only
        assert_eq!(fixture.output.len(), 7);
        let links: Vec<_> = fixture
            .output
            .triples()
            .iter()
            .filter(|t| t.predicate.contains("/value/P"))
            .collect();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].object, links[1].object);
    }

    #[test]
    fn test_full_values_flag_off_emits_simple_only() {
        let mut fixture = Fixture::new();
        let policy = ProducerPolicy::all().without(ProducerFlag::FullValues);
        let mut ctx = fixture.context(policy);
        add_snak(&mut ctx, SUBJECT, &quantity_snak("P2"), SnakRole::Statement).unwrap();
        assert!(ctx.mentioned.is_empty());
        drop(ctx);
        assert_eq!(fixture.output.len(), 1);
    }

    #[test]
    fn test_sentinel_snaks() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::all());
        add_snak(&mut ctx, SUBJECT, &Snak::NoValue { property: pid("P2") }, SnakRole::Statement).unwrap();
        add_snak(&mut ctx, SUBJECT, &Snak::SomeValue { property: pid("P2") }, SnakRole::Statement).unwrap();
        drop(ctx);

        let lines = fixture.ntriples();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("<http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.wikidata.org/prop/novalue/P2> ."));
        assert!(lines[1].contains("<http://www.wikidata.org/prop/statement/P2> <http://www.wikidata.org/.well-known/genid/"));
        assert!(fixture.dedupe.is_empty());
    }

    #[test]
    fn test_unsupported_datatype_emits_nothing() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::all());
        let snak = Snak::value(pid("P2"), "musical-notation", DataValue::String("c d e".to_string()));
        let err = add_snak(&mut ctx, SUBJECT, &snak, SnakRole::Statement).unwrap_err();
        drop(ctx);

        assert!(matches!(err, ExportError::UnsupportedDatatype { .. }));
        assert!(fixture.output.is_empty());
    }

    #[test]
    fn test_mismatched_value_is_invalid() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::all());
        let snak = Snak::value(
            pid("P2"),
            "string",
            DataValue::EntityId(EntityIdValue { id: pid("Q5") }),
        );
        let err = add_snak(&mut ctx, SUBJECT, &snak, SnakRole::Statement).unwrap_err();
        drop(ctx);

        assert!(matches!(err, ExportError::InvalidValue { .. }));
        assert!(fixture.output.is_empty());
    }
}
