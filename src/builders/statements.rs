use std::collections::{HashMap, HashSet};

use super::snak::{add_snak, SnakRole};
use super::BuildContext;
use crate::core::flags::ProducerFlag;
use crate::core::vocabulary::{prov, rdf, wikibase, PropertyNamespace};
use crate::model::{EntityDocument, EntityId, Rank, Reference, Statement};

/// Dedupe namespace of reference nodes
pub const REFERENCE_NAMESPACE: &str = "R";

/// Indexes of the statements carrying the best rank of their property.
///
/// Preferred wins over normal; a deprecated statement is never best.
pub fn best_rank_indices(statements: &[Statement]) -> HashSet<usize> {
    let mut best: HashMap<&EntityId, Rank> = HashMap::new();
    for statement in statements {
        let rank = statement.rank;
        if rank == Rank::Deprecated {
            continue;
        }
        best.entry(statement.property())
            .and_modify(|current| {
                if rank == Rank::Preferred {
                    *current = Rank::Preferred;
                }
            })
            .or_insert(rank);
    }

    statements
        .iter()
        .enumerate()
        .filter(|(_, s)| best.get(s.property()) == Some(&s.rank))
        .map(|(i, _)| i)
        .collect()
}

/// Emit truthy and full statements of `entity` as the policy selects
pub fn add_statements(ctx: &mut BuildContext<'_>, entity: &EntityDocument, entity_iri: &str) {
    let truthy = ctx.has(ProducerFlag::TruthyStatements);
    let full = ctx.has(ProducerFlag::AllStatements);
    if !truthy && !full {
        return;
    }

    let best = best_rank_indices(&entity.claims);
    for (index, statement) in entity.claims.iter().enumerate() {
        let is_best = best.contains(&index);
        if truthy && is_best {
            add_truthy_statement(ctx, entity, entity_iri, statement);
        }
        if full {
            add_full_statement(ctx, entity, entity_iri, statement, is_best);
        }
    }
}

fn add_truthy_statement(ctx: &mut BuildContext<'_>, entity: &EntityDocument, entity_iri: &str, statement: &Statement) {
    if let Err(e) = add_snak(ctx, entity_iri, &statement.mainsnak, SnakRole::Direct) {
        ctx.skip(entity.id.to_string(), &e);
    }
}

fn add_full_statement(
    ctx: &mut BuildContext<'_>,
    entity: &EntityDocument,
    entity_iri: &str,
    statement: &Statement,
    is_best: bool,
) {
    let claim = match ctx.vocabulary.property_uri(PropertyNamespace::Claim, statement.property()) {
        Ok(iri) => iri,
        Err(e) => return ctx.skip(entity.id.to_string(), &e),
    };
    let node_name = statement.node_name(&entity.id);
    let statement_iri = ctx.vocabulary.statement_uri(&node_name);

    ctx.link(entity_iri, &claim, &statement_iri);
    ctx.link(&statement_iri, rdf::TYPE, wikibase::STATEMENT);
    if is_best {
        ctx.link(&statement_iri, rdf::TYPE, wikibase::BEST_RANK);
    }
    ctx.link(&statement_iri, wikibase::RANK, &wikibase::term(statement.rank.ontology_name()));

    if let Err(e) = add_snak(ctx, &statement_iri, &statement.mainsnak, SnakRole::Statement) {
        ctx.skip(node_name.clone(), &e);
    }

    if ctx.has(ProducerFlag::Qualifiers) {
        for qualifier in statement.grouped_qualifiers() {
            if let Err(e) = add_snak(ctx, &statement_iri, qualifier, SnakRole::Qualifier) {
                ctx.skip(node_name.clone(), &e);
            }
        }
    }

    if ctx.has(ProducerFlag::References) {
        for reference in &statement.references {
            add_reference(ctx, &statement_iri, reference);
        }
    }
}

/// Link a statement to a reference; the reference body is written once per dedupe bag
fn add_reference(ctx: &mut BuildContext<'_>, statement_iri: &str, reference: &Reference) {
    let hash = reference.hash();
    let reference_iri = ctx.vocabulary.reference_uri(&hash);
    ctx.link(statement_iri, prov::WAS_DERIVED_FROM, &reference_iri);

    if ctx.dedupe.already_seen(&hash, REFERENCE_NAMESPACE) {
        return;
    }

    ctx.link(&reference_iri, rdf::TYPE, wikibase::REFERENCE);
    for snak in reference.grouped_snaks() {
        if let Err(e) = add_snak(ctx, &reference_iri, snak, SnakRole::Reference) {
            ctx.skip(reference_subject(&hash), &e);
        }
    }
}

fn reference_subject(hash: &str) -> String {
    format!("reference {}", hash)
}
