use std::collections::HashSet;

use async_graphql_parser::{
    types::{FragmentDefinition, OperationType, Selection, SelectionSet},
    Positioned,
};
use graphql_interpreter_error::{ErrorCode, GraphqlError};

use crate::operation::{is_included, Operation, Variables};

/// Static check run on the selected operation before anything executes. An error rejects the
/// query, the response then has no `data`.
pub trait QueryAnalyzer: Send + Sync + 'static {
    fn analyze(&self, operation: &OperationView<'_>) -> Result<(), GraphqlError>;
}

/// Read-only view of an operation about to be executed.
pub struct OperationView<'a> {
    operation: &'a Operation,
}

impl<'a> OperationView<'a> {
    pub(crate) fn new(operation: &'a Operation) -> Self {
        Self { operation }
    }

    pub fn name(&self) -> Option<&'a str> {
        self.operation.name.as_deref()
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation.ty
    }

    pub fn root_type(&self) -> &'a str {
        &self.operation.root_type
    }

    pub fn selection_set(&self) -> &'a Positioned<SelectionSet> {
        &self.operation.selection_set
    }

    pub fn fragment(&self, name: &str) -> Option<&'a FragmentDefinition> {
        self.operation.fragments.get(name).map(|fragment| &fragment.node)
    }

    pub fn variables(&self) -> &'a Variables {
        &self.operation.variables
    }

    /// Deepest field nesting, fragments expanded and skipped fields ignored. Root fields have
    /// a depth of 1.
    pub fn depth(&self) -> usize {
        self.depth_of(&self.operation.selection_set.node, &mut Vec::new())
    }

    /// Number of fields, fragments expanded once per spread.
    pub fn field_count(&self) -> usize {
        self.count_fields(&self.operation.selection_set.node, &mut HashSet::new())
    }

    fn depth_of(&self, selection_set: &'a SelectionSet, spreads: &mut Vec<&'a str>) -> usize {
        let mut depth = 0;
        for selection in &selection_set.items {
            if !is_included(selection.node.directives(), &self.operation.variables) {
                continue;
            }
            let selection_depth = match &selection.node {
                Selection::Field(field) => 1 + self.depth_of(&field.node.selection_set.node, spreads),
                Selection::InlineFragment(fragment) => self.depth_of(&fragment.node.selection_set.node, spreads),
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    // Cycles are rejected by validation, this only guards against infinite recursion.
                    match self.operation.fragments.get(name) {
                        Some(fragment) if !spreads.contains(&name) => {
                            spreads.push(name);
                            let fragment_depth = self.depth_of(&fragment.node.selection_set.node, spreads);
                            spreads.pop();
                            fragment_depth
                        }
                        _ => 0,
                    }
                }
            };
            depth = depth.max(selection_depth);
        }
        depth
    }

    fn count_fields(&self, selection_set: &'a SelectionSet, spreads: &mut HashSet<&'a str>) -> usize {
        selection_set
            .items
            .iter()
            .map(|selection| match &selection.node {
                Selection::Field(field) => 1 + self.count_fields(&field.node.selection_set.node, spreads),
                Selection::InlineFragment(fragment) => self.count_fields(&fragment.node.selection_set.node, spreads),
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    match self.operation.fragments.get(name) {
                        Some(fragment) if spreads.insert(name) => {
                            let count = self.count_fields(&fragment.node.selection_set.node, spreads);
                            spreads.remove(name);
                            count
                        }
                        _ => 0,
                    }
                }
            })
            .sum()
    }
}

/// Checks the operation against the configured limit and every registered analyzer, in order.
pub(crate) fn analyze(
    operation: &Operation,
    max_depth: Option<usize>,
    analyzers: &[Box<dyn QueryAnalyzer>],
) -> Result<(), GraphqlError> {
    let view = OperationView::new(operation);
    if let Some(max_depth) = max_depth {
        let depth = view.depth();
        if depth > max_depth {
            return Err(GraphqlError::new(
                format!("Query has depth of {depth}, which exceeds max depth of {max_depth}"),
                ErrorCode::OperationTooDeep,
            ));
        }
    }
    for analyzer in analyzers {
        analyzer.analyze(&view)?;
    }
    Ok(())
}
