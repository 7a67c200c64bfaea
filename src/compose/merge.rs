//! Merging an SSP fragment into the template
//!
//! Elements are matched on their merge key, the tag name plus the `name`
//! attribute. The k-th fragment element with a given key replaces the k-th
//! base child with that key; when the base has fewer, the rest are appended.
//! Comments are appended. Base children without a counterpart stay in place,
//! so a merge never removes anything from the template.

use std::collections::HashMap;

use crate::template::SspFragment;
use crate::xml::{Element, Node};

/// What a merge did to the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub replaced: usize,
    pub appended: usize,
}

type Key = (String, Option<String>);

fn key_of(element: &Element) -> Key {
    let (tag, name) = element.merge_key();
    (tag.to_string(), name.map(str::to_string))
}

pub fn merge_fragment(target: &mut Element, fragment: &SspFragment) -> MergeStats {
    // Positions of the base children by key, taken before anything is appended
    let mut base: HashMap<Key, Vec<usize>> = HashMap::new();
    for (index, node) in target.children.iter().enumerate() {
        if let Node::Element(element) = node {
            base.entry(key_of(element)).or_default().push(index);
        }
    }

    let mut seen: HashMap<Key, usize> = HashMap::new();
    let mut stats = MergeStats::default();

    for node in fragment.nodes() {
        match node {
            Node::Element(element) => {
                let key = key_of(element);
                let occurrence = seen.entry(key.clone()).or_insert(0);
                let slot = base.get(&key).and_then(|indices| indices.get(*occurrence));
                *occurrence += 1;

                match slot {
                    Some(&index) => {
                        target.children[index] = Node::Element(element.clone());
                        stats.replaced += 1;
                    }
                    None => {
                        target.children.push(Node::Element(element.clone()));
                        stats.appended += 1;
                    }
                }
            }
            Node::Comment(_) => {
                target.children.push(node.clone());
                stats.appended += 1;
            }
            Node::Text(_) => {}
        }
    }

    stats
}
