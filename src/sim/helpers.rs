//! Small graph mutations shared by several systems.

use crate::model::{NodeIdx, WorldGraph};

/// Move up to `amount` of wealth between two classes. The transfer is capped
/// at the payer's wealth so nobody goes negative. Returns the amount moved.
pub fn transfer_wealth(graph: &mut WorldGraph, from: NodeIdx, to: NodeIdx, amount: f64) -> f64 {
    let Some(payer) = graph.class_mut(from) else {
        return 0.0;
    };
    let moved = amount.min(payer.wealth).max(0.0);
    if moved == 0.0 {
        return 0.0;
    }
    payer.wealth -= moved;
    match graph.class_mut(to) {
        Some(payee) => payee.wealth += moved,
        // Not a class: give it back.
        None => {
            if let Some(payer) = graph.class_mut(from) {
                payer.wealth += moved;
            }
            return 0.0;
        }
    }
    moved
}

/// Whether both endpoints are active classes.
pub fn both_active_classes(graph: &WorldGraph, a: NodeIdx, b: NodeIdx) -> bool {
    let active = |idx| graph.class(idx).is_some_and(|c| c.active);
    active(a) && active(b)
}

/// Mean tension over every edge in the graph; 0.0 for an edgeless graph.
pub fn mean_edge_tension(graph: &WorldGraph) -> f64 {
    let n = graph.edge_count();
    if n == 0 {
        return 0.0;
    }
    graph.edges().map(|(_, e)| e.attrs.tension).sum::<f64>() / n as f64
}
