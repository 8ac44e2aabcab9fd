//! Entity classification over a generic document tree.
//!
//! Mapping keys that name an entity group (`things`, `sensors`, ...) yield one
//! record per element of their sequence; any other key is descended into.
//! Traversal uses an explicit stack, so document depth is not bounded by the
//! call stack, and yields records in document order.

use serde_json::Value;
use tracing::warn;

use crate::entity::{EntityRecord, EntityType};

enum Work<'a> {
    Visit(&'a Value),
    Group(EntityType, &'a Value),
    Record(EntityType, &'a Value),
}

/// Lazy iterator over the `(type, record)` pairs of a document.
pub struct Classifier<'a> {
    stack: Vec<Work<'a>>,
}

/// Classify `document`, yielding records in document order.
#[must_use]
pub fn classify(document: &Value) -> Classifier<'_> {
    Classifier {
        stack: vec![Work::Visit(document)],
    }
}

impl<'a> Iterator for Classifier<'a> {
    type Item = (EntityType, EntityRecord);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(work) = self.stack.pop() {
            match work {
                Work::Record(resource, Value::Object(record)) => {
                    return Some((resource, record.clone()));
                }
                Work::Record(resource, other) => {
                    warn!(resource = %resource, value = %other, "skipping non-mapping entry");
                }
                Work::Group(resource, Value::Array(items)) => {
                    self.stack
                        .extend(items.iter().rev().map(|item| Work::Record(resource, item)));
                }
                Work::Group(_, Value::Null) => {}
                Work::Group(resource, _) => {
                    warn!(group = resource.group_key(), "entity group is not a sequence, skipping");
                }
                Work::Visit(Value::Object(map)) => {
                    // Reverse push so the first key is processed first.
                    self.stack.extend(map.iter().rev().map(|(key, value)| {
                        match EntityType::from_group_key(key) {
                            Some(resource) => Work::Group(resource, value),
                            None => Work::Visit(value),
                        }
                    }));
                }
                Work::Visit(Value::Array(items)) => {
                    self.stack.extend(items.iter().rev().map(Work::Visit));
                }
                Work::Visit(_) => {}
            }
        }
        None
    }
}
