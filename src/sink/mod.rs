use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Object position of a triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RdfObject {
    Iri {
        iri: String,
    },
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl RdfObject {
    pub fn iri(iri: impl Into<String>) -> Self {
        RdfObject::Iri { iri: iri.into() }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        RdfObject::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: &str) -> Self {
        RdfObject::Literal {
            value: value.into(),
            datatype: Some(datatype.to_string()),
            language: None,
        }
    }

    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        RdfObject::Literal {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            RdfObject::Iri { iri } => Some(iri),
            RdfObject::Literal { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RdfTriple {
    pub subject: String,
    pub predicate: String,
    pub object: RdfObject,
}

impl RdfTriple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: RdfObject) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }

    /// Triple whose object is an IRI
    pub fn link(subject: impl Into<String>, predicate: impl Into<String>, object: impl Into<String>) -> Self {
        Self::new(subject, predicate, RdfObject::iri(object))
    }

    /// Borrowed `rio_api` view of this triple, used by the formatters
    pub fn as_rio(&self) -> rio_api::model::Triple<'_> {
        use rio_api::model::{Literal, NamedNode, Subject, Term, Triple};

        let object = match &self.object {
            RdfObject::Iri { iri } => Term::NamedNode(NamedNode { iri }),
            RdfObject::Literal { value, datatype: Some(datatype), .. } => Term::Literal(Literal::Typed {
                value,
                datatype: NamedNode { iri: datatype },
            }),
            RdfObject::Literal { value, language: Some(language), .. } => {
                Term::Literal(Literal::LanguageTaggedString { value, language })
            }
            RdfObject::Literal { value, .. } => Term::Literal(Literal::Simple { value }),
        };

        Triple {
            subject: Subject::NamedNode(NamedNode { iri: &self.subject }),
            predicate: NamedNode { iri: &self.predicate },
            object,
        }
    }

    pub fn to_ntriple(&self) -> String {
        format!("{} .", self.as_rio())
    }
}

/// Destination for emitted triples; insertion order is preserved
pub trait TripleSink {
    fn emit(&mut self, triple: RdfTriple);

    fn prefix(&mut self, _prefix: &str, _iri: &str) {}
}

/// In-memory triple destination
#[derive(Debug, Default, Clone)]
pub struct TripleCollector {
    triples: Vec<RdfTriple>,
    prefixes: IndexMap<String, String>,
}

impl TripleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triples(&self) -> &[RdfTriple] {
        &self.triples
    }

    pub fn prefixes(&self) -> &IndexMap<String, String> {
        &self.prefixes
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Take every triple collected so far, keeping the prefixes
    pub fn drain(&mut self) -> Vec<RdfTriple> {
        std::mem::take(&mut self.triples)
    }

    pub fn clear(&mut self) {
        self.triples.clear();
        self.prefixes.clear();
    }

    pub fn get_statistics(&self) -> TripleStats {
        TripleStats::of(&self.triples)
    }
}

impl TripleSink for TripleCollector {
    fn emit(&mut self, triple: RdfTriple) {
        self.triples.push(triple);
    }

    fn prefix(&mut self, prefix: &str, iri: &str) {
        self.prefixes.insert(prefix.to_string(), iri.to_string());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripleStats {
    pub total_triples: usize,
    pub unique_subjects: usize,
    pub unique_predicates: usize,
    pub unique_objects: usize,
}

impl TripleStats {
    pub fn of(triples: &[RdfTriple]) -> Self {
        let mut unique_subjects = HashSet::new();
        let mut unique_predicates = HashSet::new();
        let mut unique_objects = HashSet::new();

        for triple in triples {
            unique_subjects.insert(&triple.subject);
            unique_predicates.insert(&triple.predicate);
            unique_objects.insert(&triple.object);
        }

        TripleStats {
            total_triples: triples.len(),
            unique_subjects: unique_subjects.len(),
            unique_predicates: unique_predicates.len(),
            unique_objects: unique_objects.len(),
        }
    }
}

impl std::fmt::Display for TripleStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,
            "Export Statistics:\n\
             Total Triples: {}\n\
             Unique Subjects: {}\n\
             Unique Predicates: {}\n\
             Unique Objects: {}",
            self.total_triples,
            self.unique_subjects,
            self.unique_predicates,
            self.unique_objects
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_ntriple() {
        let link = RdfTriple::link("http://ex.org/a", "http://ex.org/p", "http://ex.org/b");
        assert_eq!(link.to_ntriple(), "<http://ex.org/a> <http://ex.org/p> <http://ex.org/b> .");

        let label = RdfTriple::new("http://ex.org/a", "http://ex.org/p", RdfObject::lang("say \"hi\"", "en"));
        assert_eq!(label.to_ntriple(), r#"<http://ex.org/a> <http://ex.org/p> "say \"hi\""@en ."#);

        let typed = RdfTriple::new(
            "http://ex.org/a",
            "http://ex.org/p",
            RdfObject::typed("5", "http://www.w3.org/2001/XMLSchema#integer"),
        );
        assert_eq!(
            typed.to_ntriple(),
            "<http://ex.org/a> <http://ex.org/p> \"5\"^^<http://www.w3.org/2001/XMLSchema#integer> ."
        );
    }

    #[test]
    fn test_collector_preserves_order_and_drains() {
        let mut collector = TripleCollector::new();
        collector.prefix("ex", "http://ex.org/");
        collector.emit(RdfTriple::link("http://ex.org/b", "http://ex.org/p", "http://ex.org/c"));
        collector.emit(RdfTriple::link("http://ex.org/a", "http://ex.org/p", "http://ex.org/c"));

        assert_eq!(collector.triples()[0].subject, "http://ex.org/b");
        let drained = collector.drain();
        assert_eq!(drained.len(), 2);
        assert!(collector.is_empty());
        assert_eq!(collector.prefixes()["ex"], "http://ex.org/");
    }

    #[test]
    fn test_statistics() {
        let triples = vec![
            RdfTriple::link("http://ex.org/a", "http://ex.org/p", "http://ex.org/c"),
            RdfTriple::link("http://ex.org/b", "http://ex.org/p", "http://ex.org/c"),
            RdfTriple::new("http://ex.org/a", "http://ex.org/q", RdfObject::plain("x")),
        ];
        let stats = TripleStats::of(&triples);
        assert_eq!(stats.total_triples, 3);
        assert_eq!(stats.unique_subjects, 2);
        assert_eq!(stats.unique_predicates, 2);
        assert_eq!(stats.unique_objects, 2);
    }
}
