use super::BuildContext;
use crate::core::error::ExportError;
use crate::core::vocabulary::{rdf, schema, wikibase};
use crate::model::EntityDocument;
use crate::sink::RdfObject;

/// Dedupe namespace of site root descriptions
pub const SITE_NAMESPACE: &str = "S";

/// One `schema:Article` description per linked page
pub fn add_sitelinks(ctx: &mut BuildContext<'_>, entity: &EntityDocument, entity_iri: &str) {
    for (site_id, link) in &entity.sitelinks {
        let Some(site) = ctx.sites.site(site_id) else {
            ctx.skip(
                entity.id.to_string(),
                &ExportError::Lookup(format!("unknown site {} for sitelink {}", site_id, link.title)),
            );
            continue;
        };

        let page = site.page_url_for(&link.title);
        let root = site.root_url().to_string();
        let language = site.language.clone();
        let group = site.group.clone();

        let mut badges = Vec::with_capacity(link.badges.len());
        for badge in &link.badges {
            match ctx.vocabulary.entity_uri(badge) {
                Ok(iri) => badges.push(iri),
                Err(e) => ctx.skip(entity.id.to_string(), &e),
            }
        }

        ctx.link(&page, rdf::TYPE, schema::ARTICLE);
        ctx.link(&page, schema::ABOUT, entity_iri);
        ctx.emit(&page, schema::IN_LANGUAGE, RdfObject::plain(language.as_str()));
        ctx.link(&page, schema::IS_PART_OF, &root);
        ctx.emit(&page, schema::NAME, RdfObject::lang(link.title.as_str(), language.as_str()));
        for badge in badges {
            ctx.link(&page, wikibase::BADGE, &badge);
        }

        if !ctx.dedupe.already_seen(site_id, SITE_NAMESPACE) {
            ctx.emit(&root, wikibase::WIKI_GROUP, RdfObject::plain(group));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::testing::Fixture;
    use crate::core::flags::ProducerPolicy;
    use crate::model::EntityId;

    fn qid(s: &str) -> EntityId {
        EntityId::parse(s).unwrap()
    }

    #[test]
    fn test_sitelink_triples() {
        let doc = EntityDocument::new(qid("Q1")).with_sitelink("enwiki", "Big Bang", vec![qid("Q17437796")]);
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::all());
        add_sitelinks(&mut ctx, &doc, "http://www.wikidata.org/entity/Q1");
        drop(ctx);

        let page = "https://en.wikipedia.org/wiki/Big_Bang";
        let lines = fixture.ntriples();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], format!("<{}> <{}> <{}> .", page, rdf::TYPE, schema::ARTICLE));
        assert_eq!(lines[2], format!("<{}> <{}> \"en\" .", page, schema::IN_LANGUAGE));
        assert_eq!(lines[3], format!("<{}> <{}> <https://en.wikipedia.org/> .", page, schema::IS_PART_OF));
        assert_eq!(lines[4], format!("<{}> <{}> \"Big Bang\"@en .", page, schema::NAME));
        assert_eq!(
            lines[5],
            format!("<{}> <{}> <http://www.wikidata.org/entity/Q17437796> .", page, wikibase::BADGE)
        );
        assert_eq!(
            lines[6],
            format!("<https://en.wikipedia.org/> <{}> \"wikipedia\" .", wikibase::WIKI_GROUP)
        );
    }

    #[test]
    fn test_site_root_written_once() {
        let first = EntityDocument::new(qid("Q1")).with_sitelink("enwiki", "Universe", vec![]);
        let second = EntityDocument::new(qid("Q2")).with_sitelink("enwiki", "Earth", vec![]);
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::all());
        add_sitelinks(&mut ctx, &first, "http://www.wikidata.org/entity/Q1");
        add_sitelinks(&mut ctx, &second, "http://www.wikidata.org/entity/Q2");
        drop(ctx);

        let groups = fixture
            .output
            .triples()
            .iter()
            .filter(|t| t.predicate == wikibase::WIKI_GROUP)
            .count();
        assert_eq!(groups, 1);
    }

    #[test]
    fn test_unknown_site_is_skipped() {
        let doc = EntityDocument::new(qid("Q1")).with_sitelink("xxwiki", "Nothing", vec![]);
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(ProducerPolicy::all());
        add_sitelinks(&mut ctx, &doc, "http://www.wikidata.org/entity/Q1");
        let skipped = ctx.skipped.len();
        drop(ctx);

        assert_eq!(skipped, 1);
        assert!(fixture.output.is_empty());
    }
}
