use super::{mismatch, ValueHandler, ValueResult};
use crate::core::Vocabulary;
use crate::lookup::encode_title;
use crate::model::{DataValue, EntityId};
use crate::sink::RdfObject;

/// Strings, external identifiers and formulae: a plain literal
pub struct StringHandler;

impl ValueHandler for StringHandler {
    fn simple_value(&self, value: &DataValue, _vocabulary: &Vocabulary) -> ValueResult<RdfObject> {
        match value {
            DataValue::String(s) => Ok(RdfObject::plain(s.as_str())),
            other => Err(mismatch("string", other)),
        }
    }
}

pub struct UrlHandler;

impl ValueHandler for UrlHandler {
    fn simple_value(&self, value: &DataValue, _vocabulary: &Vocabulary) -> ValueResult<RdfObject> {
        match value {
            DataValue::String(s) => {
                let url = url::Url::parse(s.trim())
                    .map_err(|e| super::ValueError::Malformed(format!("invalid URL {}: {}", s, e)))?;
                Ok(RdfObject::iri(url.as_str()))
            }
            other => Err(mismatch("string", other)),
        }
    }

    fn is_object_valued(&self) -> bool {
        true
    }
}

/// File names and data pages on the shared media repository
pub struct CommonsHandler {
    base: &'static str,
}

impl CommonsHandler {
    pub fn media() -> Self {
        Self {
            base: "http://commons.wikimedia.org/wiki/Special:FilePath/",
        }
    }

    pub fn data() -> Self {
        Self {
            base: "http://commons.wikimedia.org/data/main/",
        }
    }
}

impl ValueHandler for CommonsHandler {
    fn simple_value(&self, value: &DataValue, _vocabulary: &Vocabulary) -> ValueResult<RdfObject> {
        match value {
            DataValue::String(title) if !title.trim().is_empty() => {
                Ok(RdfObject::iri(format!("{}{}", self.base, encode_title(title))))
            }
            DataValue::String(_) => Err(super::ValueError::Malformed("empty page title".to_string())),
            other => Err(mismatch("string", other)),
        }
    }

    fn is_object_valued(&self) -> bool {
        true
    }
}

pub struct MonolingualTextHandler;

impl ValueHandler for MonolingualTextHandler {
    fn simple_value(&self, value: &DataValue, _vocabulary: &Vocabulary) -> ValueResult<RdfObject> {
        match value {
            DataValue::MonolingualText(text) if text.language.trim().is_empty() => {
                Err(super::ValueError::Malformed(format!("missing language for text {:?}", text.text)))
            }
            DataValue::MonolingualText(text) => Ok(RdfObject::lang(text.text.as_str(), text.language.trim())),
            other => Err(mismatch("monolingualtext", other)),
        }
    }
}

/// Item and property references; the target becomes a mentioned entity
pub struct EntityIdHandler;

impl ValueHandler for EntityIdHandler {
    fn simple_value(&self, value: &DataValue, vocabulary: &Vocabulary) -> ValueResult<RdfObject> {
        match value {
            DataValue::EntityId(target) => Ok(RdfObject::iri(vocabulary.entity_uri(&target.id)?)),
            other => Err(mismatch("wikibase-entityid", other)),
        }
    }

    fn mentioned_entities(&self, value: &DataValue, _vocabulary: &Vocabulary) -> Vec<EntityId> {
        match value {
            DataValue::EntityId(target) => vec![target.id.clone()],
            _ => Vec::new(),
        }
    }

    fn is_object_valued(&self) -> bool {
        true
    }
}
