use std::{collections::HashMap, rc::Rc};

use async_graphql_parser::{
    types::{Field, FragmentDefinition, Selection, SelectionSet},
    Pos, Positioned,
};
use async_graphql_value::Name;
use fxhash::{FxHashMap, FxHashSet};
use indexmap::IndexMap;

use crate::{operation::is_included, Schema, Variables};

/// Every field node of a selection set sharing the same response key.
#[derive(Debug)]
pub(crate) struct MergedField<'a> {
    pub key: &'a str,
    pub name: &'a str,
    pub nodes: Vec<&'a Positioned<Field>>,
}

impl<'a> MergedField<'a> {
    /// The first occurrence provides the arguments, merged fields are required to agree on them.
    pub fn node(&self) -> &'a Positioned<Field> {
        self.nodes[0]
    }

    pub fn pos(&self) -> Pos {
        self.node().pos
    }
}

pub(crate) type MergedSelectionSet<'a> = Rc<[Rc<MergedField<'a>>]>;

/// Merges selection sets for a concrete object type, memoizing the result for the lifetime of
/// the query.
pub(crate) struct SelectionMerger<'a> {
    schema: &'a Schema,
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    variables: &'a Variables,
    // (addresses of the merged selection sets, object type), stable for as long as the document
    cache: FxHashMap<(Vec<usize>, &'a str), MergedSelectionSet<'a>>,
}

impl<'a> SelectionMerger<'a> {
    pub fn new(
        schema: &'a Schema,
        fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
        variables: &'a Variables,
    ) -> Self {
        Self {
            schema,
            fragments,
            variables,
            cache: FxHashMap::default(),
        }
    }

    pub fn root(
        &mut self,
        selection_set: &'a Positioned<SelectionSet>,
        object_type: &'a str,
    ) -> MergedSelectionSet<'a> {
        self.merge(std::iter::once(selection_set), object_type)
    }

    /// Sub-selections of a field, the union of those of every merged node.
    pub fn children(&mut self, field: &MergedField<'a>, object_type: &'a str) -> MergedSelectionSet<'a> {
        self.merge(field.nodes.iter().copied().map(|node| &node.node.selection_set), object_type)
    }

    fn merge(
        &mut self,
        selection_sets: impl Iterator<Item = &'a Positioned<SelectionSet>> + Clone,
        object_type: &'a str,
    ) -> MergedSelectionSet<'a> {
        let key = (
            selection_sets
                .clone()
                .map(|selection_set| std::ptr::from_ref(selection_set) as usize)
                .collect::<Vec<_>>(),
            object_type,
        );
        if let Some(merged) = self.cache.get(&key) {
            return Rc::clone(merged);
        }

        let mut fields = IndexMap::new();
        let mut visited_fragments = FxHashSet::default();
        for selection_set in selection_sets {
            self.collect_fields(&selection_set.node, object_type, &mut fields, &mut visited_fragments);
        }
        let merged: MergedSelectionSet<'a> = fields.into_values().map(Rc::new).collect();
        tracing::trace!(object_type, fields = merged.len(), "Merged selection set");

        self.cache.insert(key, Rc::clone(&merged));
        merged
    }

    fn collect_fields(
        &self,
        selection_set: &'a SelectionSet,
        object_type: &str,
        fields: &mut IndexMap<&'a str, MergedField<'a>>,
        visited_fragments: &mut FxHashSet<&'a str>,
    ) {
        for selection in &selection_set.items {
            if !is_included(selection.node.directives(), self.variables) {
                continue;
            }
            match &selection.node {
                Selection::Field(field) => {
                    let key = field.node.response_key().node.as_str();
                    fields
                        .entry(key)
                        .or_insert_with(|| MergedField {
                            key,
                            name: field.node.name.node.as_str(),
                            nodes: Vec::new(),
                        })
                        .nodes
                        .push(field);
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    if !visited_fragments.insert(name) {
                        continue;
                    }
                    let Some(fragment) = self.fragments.get(name) else {
                        continue;
                    };
                    if self.applies(fragment.node.type_condition.node.on.node.as_str(), object_type) {
                        self.collect_fields(&fragment.node.selection_set.node, object_type, fields, visited_fragments);
                    }
                }
                Selection::InlineFragment(fragment) => {
                    let applies = fragment
                        .node
                        .type_condition
                        .as_ref()
                        .map_or(true, |condition| self.applies(condition.node.on.node.as_str(), object_type));
                    if applies {
                        self.collect_fields(&fragment.node.selection_set.node, object_type, fields, visited_fragments);
                    }
                }
            }
        }
    }

    fn applies(&self, type_condition: &str, object_type: &str) -> bool {
        type_condition == object_type || self.schema.is_possible_type(type_condition, object_type)
    }
}
