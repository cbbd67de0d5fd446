//! Detection of reference cycles that would never consume any part of the instance.
//!
//! `{"$ref": "#"}` or `{"allOf": [{"$ref": "#"}]}` hand the very same instance back to
//! themselves, so validating against them could not terminate. Cycles that pass through
//! `properties`, `items` and similar keywords are fine: they descend into the instance.
use crate::{
    error::SchemaError,
    schema::{NodeId, NodeKind, SchemaNode},
};

/// Nodes that validate the same instance as `node`.
fn same_instance_edges(node: &SchemaNode) -> Vec<NodeId> {
    match node.kind() {
        NodeKind::Reference(reference) => reference.target().into_iter().collect(),
        NodeKind::Combined(combined) => combined.subschemas.clone(),
        NodeKind::Not(not) => vec![not.schema],
        NodeKind::Conditional(conditional) => [conditional.if_, conditional.then_, conditional.else_]
            .into_iter()
            .flatten()
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

pub(super) fn check(nodes: &[SchemaNode]) -> Result<(), SchemaError> {
    let mut marks = vec![Mark::Unvisited; nodes.len()];
    for start in 0..nodes.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        let mut stack = vec![(start, same_instance_edges(&nodes[start]), 0_usize)];
        marks[start] = Mark::OnStack;
        while let Some((current, edges, next)) = stack.last_mut() {
            let Some(edge) = edges.get(*next).copied() else {
                marks[*current] = Mark::Done;
                stack.pop();
                continue;
            };
            *next += 1;
            match marks[edge.0] {
                Mark::Done => {}
                Mark::OnStack => {
                    let position = stack
                        .iter()
                        .position(|(idx, _, _)| *idx == edge.0)
                        .unwrap_or(0);
                    return Err(cycle_error(nodes, &stack[position..]));
                }
                Mark::Unvisited => {
                    marks[edge.0] = Mark::OnStack;
                    stack.push((edge.0, same_instance_edges(&nodes[edge.0]), 0));
                }
            }
        }
    }
    Ok(())
}

fn cycle_error(nodes: &[SchemaNode], cycle: &[(usize, Vec<NodeId>, usize)]) -> SchemaError {
    // Every such cycle contains a reference, nodes are otherwise created after their children
    let reference = cycle.iter().find_map(|(idx, _, _)| match nodes[*idx].kind() {
        NodeKind::Reference(reference) => Some((*idx, reference.reference())),
        _ => None,
    });
    let (idx, reference) = reference.unwrap_or((cycle[0].0, "#"));
    SchemaError::circular_reference(nodes[idx].meta().location().clone(), reference)
}
