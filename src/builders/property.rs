use super::statements::add_statements;
use super::terms::{add_aliases, add_descriptions, add_labels};
use super::{add_identity, BuildContext, EntityTypeBuilder};
use crate::core::flags::ProducerFlag;
use crate::core::vocabulary::{owl, rdf, wikibase, PropertyNamespace};
use crate::model::{EntityDocument, EntityKind};

pub struct PropertyRdfBuilder;

/// `wikibase-item` → `WikibaseItem`, `commonsMedia` → `CommonsMedia`
pub fn property_type_name(datatype: &str) -> String {
    datatype
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

impl PropertyRdfBuilder {
    fn add_property_type(&self, entity: &EntityDocument, entity_iri: &str, ctx: &mut BuildContext<'_>) {
        if let Some(datatype) = &entity.datatype {
            ctx.link(entity_iri, wikibase::PROPERTY_TYPE, &wikibase::term(&property_type_name(datatype)));
        }
    }

    /// Predicate family links and their OWL typing
    fn add_declarations(&self, entity: &EntityDocument, entity_iri: &str, ctx: &mut BuildContext<'_>) {
        let object_valued = entity
            .datatype
            .as_deref()
            .and_then(|datatype| ctx.handlers.get(datatype))
            .map(|handler| handler.is_object_valued())
            .unwrap_or(false);

        let mut declared = Vec::with_capacity(PropertyNamespace::ALL.len());
        for ns in PropertyNamespace::ALL {
            match ctx.vocabulary.property_uri(ns, &entity.id) {
                Ok(iri) => declared.push((ns, iri)),
                Err(e) => return ctx.skip(entity.id.to_string(), &e),
            }
        }

        for (ns, iri) in &declared {
            ctx.link(entity_iri, &wikibase::term(ns.declaration()), iri);
        }

        for (ns, iri) in &declared {
            let class = match ns {
                PropertyNamespace::NoValue => owl::CLASS,
                PropertyNamespace::Claim
                | PropertyNamespace::StatementValue
                | PropertyNamespace::QualifierValue
                | PropertyNamespace::ReferenceValue => owl::OBJECT_PROPERTY,
                _ if object_valued => owl::OBJECT_PROPERTY,
                _ => owl::DATATYPE_PROPERTY,
            };
            ctx.link(iri, rdf::TYPE, class);
        }
    }
}

impl EntityTypeBuilder for PropertyRdfBuilder {
    fn add_entity(&self, entity: &EntityDocument, entity_iri: &str, ctx: &mut BuildContext<'_>, stubbed: bool) {
        if !stubbed {
            add_identity(ctx, entity_iri, EntityKind::Property);
        }

        if ctx.has(ProducerFlag::Terms) {
            if !stubbed {
                add_labels(ctx, entity_iri, &entity.labels);
            }
            add_descriptions(ctx, entity_iri, &entity.descriptions);
            add_aliases(ctx, entity_iri, &entity.aliases);
        }

        if ctx.has(ProducerFlag::Properties) {
            if !stubbed {
                self.add_property_type(entity, entity_iri, ctx);
            }
            self.add_declarations(entity, entity_iri, ctx);
        }

        add_statements(ctx, entity, entity_iri);
    }

    fn add_stub(&self, entity: &EntityDocument, entity_iri: &str, ctx: &mut BuildContext<'_>) {
        add_identity(ctx, entity_iri, EntityKind::Property);
        if ctx.has(ProducerFlag::Terms) {
            add_labels(ctx, entity_iri, &entity.labels);
        }
        if ctx.has(ProducerFlag::Properties) {
            self.add_property_type(entity, entity_iri, ctx);
        }
    }
}
