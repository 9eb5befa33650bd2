use super::sitelinks::add_sitelinks;
use super::statements::add_statements;
use super::terms::{add_aliases, add_descriptions, add_labels};
use super::{add_identity, BuildContext, EntityTypeBuilder};
use crate::core::flags::ProducerFlag;
use crate::model::{EntityDocument, EntityKind};

pub struct ItemRdfBuilder;

impl EntityTypeBuilder for ItemRdfBuilder {
    fn add_entity(&self, entity: &EntityDocument, entity_iri: &str, ctx: &mut BuildContext<'_>, stubbed: bool) {
        if !stubbed {
            add_identity(ctx, entity_iri, EntityKind::Item);
        }

        if ctx.has(ProducerFlag::Terms) {
            if !stubbed {
                add_labels(ctx, entity_iri, &entity.labels);
            }
            add_descriptions(ctx, entity_iri, &entity.descriptions);
            add_aliases(ctx, entity_iri, &entity.aliases);
        }

        add_statements(ctx, entity, entity_iri);

        if ctx.has(ProducerFlag::Sitelinks) {
            add_sitelinks(ctx, entity, entity_iri);
        }
    }

    fn add_stub(&self, entity: &EntityDocument, entity_iri: &str, ctx: &mut BuildContext<'_>) {
        add_identity(ctx, entity_iri, EntityKind::Item);
        if ctx.has(ProducerFlag::Terms) {
            add_labels(ctx, entity_iri, &entity.labels);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::testing::Fixture;
    use crate::core::flags::ProducerPolicy;
    use crate::core::vocabulary::{rdf, wikibase};
    use crate::model::{DataValue, EntityId, Snak, Statement};

    const Q1: &str = "http://www.wikidata.org/entity/Q1";

    fn universe() -> EntityDocument {
        EntityDocument::new(EntityId::parse("Q1").unwrap())
            .with_label("en", "universe")
            .with_description("en", "totality")
            .with_statement(Statement::new(Snak::value(
                EntityId::parse("P2").unwrap(),
                "string",
                DataValue::String("x".to_string()),
            )))
            .with_sitelink("enwiki", "Universe", vec![])
    }

    #[test]
    fn test_identity_only_without_flags() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::NONE);
        ItemRdfBuilder.add_entity(&universe(), Q1, &mut ctx, false);
        drop(ctx);

        assert_eq!(
            fixture.ntriples(),
            vec![format!("<{}> <{}> <{}> .", Q1, rdf::TYPE, wikibase::term("Item"))]
        );
    }

    #[test]
    fn test_full_after_stub_adds_no_duplicates() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::all());
        ItemRdfBuilder.add_stub(&universe(), Q1, &mut ctx);
        ItemRdfBuilder.add_entity(&universe(), Q1, &mut ctx, true);
        drop(ctx);
        let after_stub = fixture.ntriples();

        let mut fresh = Fixture::new();
        let mut ctx = fresh.context(ProducerPolicy::all());
        ItemRdfBuilder.add_entity(&universe(), Q1, &mut ctx, false);
        drop(ctx);
        let direct = fresh.ntriples();

        let mut a = after_stub.clone();
        let mut b = direct.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(after_stub.len(), direct.len());
    }

    #[test]
    fn test_stub_is_identity_and_labels() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::all());
        ItemRdfBuilder.add_stub(&universe(), Q1, &mut ctx);
        drop(ctx);
        assert_eq!(fixture.output.len(), 4);
    }

    #[test]
    fn test_stub_labels_follow_terms_flag() {
        let policy = ProducerPolicy::from(ProducerFlag::TruthyStatements);

        let mut stub_first = Fixture::new();
        let mut ctx = stub_first.context(policy);
        ItemRdfBuilder.add_stub(&universe(), Q1, &mut ctx);
        ItemRdfBuilder.add_entity(&universe(), Q1, &mut ctx, true);
        drop(ctx);

        let mut full_only = Fixture::new();
        let mut ctx = full_only.context(policy);
        ItemRdfBuilder.add_entity(&universe(), Q1, &mut ctx, false);
        drop(ctx);

        let mut a = stub_first.ntriples();
        let mut b = full_only.ntriples();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }
}
