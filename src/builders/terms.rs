use std::collections::BTreeMap;

use super::BuildContext;
use crate::core::vocabulary::{rdfs, schema, skos};
use crate::sink::RdfObject;

/// Each label is written under all three label predicates
pub const LABEL_PREDICATES: [&str; 3] = [rdfs::LABEL, skos::PREF_LABEL, schema::NAME];

pub fn add_labels(ctx: &mut BuildContext<'_>, entity_iri: &str, labels: &BTreeMap<String, String>) {
    for (language, text) in labels {
        for predicate in LABEL_PREDICATES {
            ctx.emit(entity_iri, predicate, RdfObject::lang(text.as_str(), language.as_str()));
        }
    }
}

pub fn add_descriptions(ctx: &mut BuildContext<'_>, entity_iri: &str, descriptions: &BTreeMap<String, String>) {
    for (language, text) in descriptions {
        ctx.emit(entity_iri, schema::DESCRIPTION, RdfObject::lang(text.as_str(), language.as_str()));
    }
}

pub fn add_aliases(ctx: &mut BuildContext<'_>, entity_iri: &str, aliases: &BTreeMap<String, Vec<String>>) {
    for (language, texts) in aliases {
        for text in texts {
            ctx.emit(entity_iri, skos::ALT_LABEL, RdfObject::lang(text.as_str(), language.as_str()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::testing::Fixture;
    use crate::core::flags::ProducerPolicy;
    use crate::model::{EntityDocument, EntityId};

    const Q1: &str = "http://www.wikidata.org/entity/Q1";

    #[test]
    fn test_terms() {
        let doc = EntityDocument::new(EntityId::parse("Q1").unwrap())
            .with_label("en", "universe")
            .with_label("de", "Universum")
            .with_description("en", "totality of space")
            .with_alias("en", "cosmos")
            .with_alias("en", "everything");

        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::all());
        add_labels(&mut ctx, Q1, &doc.labels);
        add_descriptions(&mut ctx, Q1, &doc.descriptions);
        add_aliases(&mut ctx, Q1, &doc.aliases);
        drop(ctx);

        let lines = fixture.ntriples();
        assert_eq!(lines.len(), 9);
        // languages in sorted order
        assert_eq!(lines[0], format!("<{}> <{}> \"Universum\"@de .", Q1, rdfs::LABEL));
        assert_eq!(lines[5], format!("<{}> <{}> \"universe\"@en .", Q1, schema::NAME));
        assert_eq!(lines[6], format!("<{}> <{}> \"totality of space\"@en .", Q1, schema::DESCRIPTION));
        assert_eq!(lines[8], format!("<{}> <{}> \"everything\"@en .", Q1, skos::ALT_LABEL));
    }
}
