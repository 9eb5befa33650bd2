use anyhow::{Context, Result};
use indexmap::IndexMap;
use rio_api::formatter::TriplesFormatter;
use rio_turtle::{NTriplesFormatter, TurtleFormatter};

use crate::config::OutputFormat;
use crate::sink::{RdfObject, RdfTriple};

pub struct RdfSerializer;

impl RdfSerializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(
        &self,
        triples: &[RdfTriple],
        format: &OutputFormat,
        prefixes: &IndexMap<String, String>,
    ) -> Result<String> {
        match format {
            OutputFormat::Turtle => self.serialize_turtle(triples, prefixes),
            OutputFormat::NTriples => self.serialize_ntriples(triples),
            OutputFormat::Json => self.serialize_json(triples),
        }
    }

    fn serialize_turtle(&self, triples: &[RdfTriple], prefixes: &IndexMap<String, String>) -> Result<String> {
        let mut output = String::new();

        for (prefix, iri) in prefixes {
            output.push_str(&format!("@prefix {}: <{}> .\n", prefix, iri));
        }
        if !prefixes.is_empty() {
            output.push('\n');
        }

        let mut formatter = TurtleFormatter::new(Vec::new());
        for triple in triples {
            formatter
                .format(&triple.as_rio())
                .context("Failed to format Turtle triple")?;
        }
        let body = formatter.finish().context("Failed to finish Turtle output")?;
        output.push_str(&String::from_utf8(body).context("Turtle output is not UTF-8")?);

        Ok(output)
    }

    fn serialize_ntriples(&self, triples: &[RdfTriple]) -> Result<String> {
        let mut formatter = NTriplesFormatter::new(Vec::new());
        for triple in triples {
            formatter
                .format(&triple.as_rio())
                .context("Failed to format N-Triples line")?;
        }
        let body = formatter.finish().context("Failed to finish N-Triples output")?;
        String::from_utf8(body).context("N-Triples output is not UTF-8")
    }

    fn serialize_json(&self, triples: &[RdfTriple]) -> Result<String> {
        serde_json::to_string_pretty(triples)
            .context("Failed to serialize to JSON")
    }
}

impl Default for RdfSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural problems that would make the output unreadable to RDF parsers
pub fn validate_rdf_triples(triples: &[RdfTriple]) -> Vec<String> {
    let mut issues = Vec::new();

    for (i, triple) in triples.iter().enumerate() {
        if url::Url::parse(&triple.subject).is_err() {
            issues.push(format!("Triple {}: Invalid subject IRI: {}", i, triple.subject));
        }

        if url::Url::parse(&triple.predicate).is_err() {
            issues.push(format!("Triple {}: Invalid predicate IRI: {}", i, triple.predicate));
        }

        match &triple.object {
            RdfObject::Iri { iri } if url::Url::parse(iri).is_err() => {
                issues.push(format!("Triple {}: Invalid object IRI: {}", i, iri));
            }
            RdfObject::Literal { datatype: Some(datatype), .. } if url::Url::parse(datatype).is_err() => {
                issues.push(format!("Triple {}: Invalid datatype IRI: {}", i, datatype));
            }
            RdfObject::Literal { language: Some(language), .. } if language.is_empty() => {
                issues.push(format!("Triple {}: Empty language tag", i));
            }
            _ => {}
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocabulary::{rdfs, xsd};
    use rio_api::parser::TriplesParser;
    use rio_turtle::TurtleParser;

    fn sample() -> Vec<RdfTriple> {
        vec![
            RdfTriple::new(
                "http://www.wikidata.org/entity/Q42",
                rdfs::LABEL,
                RdfObject::lang("Douglas \"DNA\" Adams", "en"),
            ),
            RdfTriple::new(
                "http://www.wikidata.org/entity/Q42",
                "http://www.wikidata.org/prop/direct/P1082",
                RdfObject::typed("42", xsd::DECIMAL),
            ),
            RdfTriple::link(
                "http://www.wikidata.org/entity/Q42",
                "http://www.wikidata.org/prop/direct/P31",
                "http://www.wikidata.org/entity/Q5",
            ),
        ]
    }

    #[test]
    fn test_validate_rdf_triples() {
        let mut triples = sample();
        triples.push(RdfTriple::link("invalid_iri", rdfs::LABEL, "http://example.org/x"));

        let issues = validate_rdf_triples(&triples);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("Invalid subject IRI"));
    }

    #[test]
    fn test_turtle_parses_back() {
        let mut prefixes = IndexMap::new();
        prefixes.insert("wd".to_string(), "http://www.wikidata.org/entity/".to_string());

        let output = RdfSerializer::new()
            .serialize(&sample(), &OutputFormat::Turtle, &prefixes)
            .unwrap();
        assert!(output.starts_with("@prefix wd: <http://www.wikidata.org/entity/> .\n"));

        let mut parsed = 0;
        TurtleParser::new(output.as_bytes(), None)
            .parse_all(&mut |_| -> Result<(), rio_turtle::TurtleError> {
                parsed += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(parsed, 3);
    }

    #[test]
    fn test_ntriples_lines() {
        let output = RdfSerializer::new()
            .serialize(&sample(), &OutputFormat::NTriples, &IndexMap::new())
            .unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], sample()[0].to_ntriple());
        assert!(lines[0].contains("\\\"DNA\\\""));
    }

    #[test]
    fn test_serialize_json() {
        let output = RdfSerializer::new()
            .serialize(&sample(), &OutputFormat::Json, &IndexMap::new())
            .unwrap();
        let back: Vec<RdfTriple> = serde_json::from_str(&output).unwrap();
        assert_eq!(back, sample());
    }
}
