//! Activation set tracking
//!
//! Pure functions that turn a timeline and an elapsed time into the set of
//! live targets, and two consecutive sets into the commands that move the
//! hardware from one to the other.

use range_api::{Session, TargetCommand};
use range_util::NodeId;
use std::collections::BTreeSet;

/// Nodes that are currently live, iterated in ascending order
pub type ActiveSet = BTreeSet<NodeId>;

/// Commands needed to move from one active set to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSetDiff {
    /// Nodes that became live, ascending
    pub to_activate: Vec<NodeId>,
    /// Nodes that went down, ascending
    pub to_deactivate: Vec<NodeId>,
}

impl ActiveSetDiff {
    pub fn is_empty(&self) -> bool {
        self.to_activate.is_empty() && self.to_deactivate.is_empty()
    }

    /// Activations first, then deactivations
    pub fn commands(&self) -> Vec<TargetCommand> {
        self.to_activate
            .iter()
            .map(|&id| TargetCommand::activate(id))
            .chain(self.to_deactivate.iter().map(|&id| TargetCommand::deactivate(id)))
            .collect()
    }
}

/// Nodes with at least one window covering `elapsed_seconds`
pub fn compute_active_set(session: &Session, elapsed_seconds: u64) -> ActiveSet {
    session
        .windows()
        .iter()
        .filter(|w| w.contains(elapsed_seconds))
        .map(|w| w.node_id())
        .collect()
}

/// Minimal change set from `previous` to `next`
pub fn diff(previous: &ActiveSet, next: &ActiveSet) -> ActiveSetDiff {
    ActiveSetDiff {
        to_activate: next.difference(previous).copied().collect(),
        to_deactivate: previous.difference(next).copied().collect(),
    }
}

/// Seconds until `node_id` goes down, or 0 if it is not live
///
/// With overlapping windows the earliest-ending matching window wins.
pub fn remaining_seconds_for_node(
    session: &Session,
    active: &ActiveSet,
    node_id: NodeId,
    elapsed_seconds: u64,
) -> u64 {
    if !active.contains(&node_id) {
        return 0;
    }

    session
        .windows()
        .iter()
        .filter(|w| w.node_id() == node_id && w.contains(elapsed_seconds))
        .map(|w| w.end_seconds - elapsed_seconds)
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use range_api::{ActivationWindow, TargetRef};

    fn window(node: u32, start: u64, end: u64) -> ActivationWindow {
        ActivationWindow::new(TargetRef::new(NodeId::new(node), 25.0, 1), start, end)
    }

    fn set(ids: &[u32]) -> ActiveSet {
        ids.iter().map(|&id| NodeId::new(id)).collect()
    }

    fn nodes(ids: &[u32]) -> Vec<NodeId> {
        ids.iter().map(|&id| NodeId::new(id)).collect()
    }

    #[test]
    fn boundaries_are_half_open() {
        let session = Session::new("s", "S", 10, vec![window(5, 2, 6)]).unwrap();

        assert_eq!(compute_active_set(&session, 1), set(&[]));
        assert_eq!(compute_active_set(&session, 2), set(&[5]));
        assert_eq!(compute_active_set(&session, 5), set(&[5]));
        assert_eq!(compute_active_set(&session, 6), set(&[]));
    }

    #[test]
    fn matches_exactly_the_covering_windows() {
        let session = Session::new(
            "s",
            "S",
            20,
            vec![window(1, 0, 5), window(2, 3, 8), window(3, 10, 20)],
        )
        .unwrap();

        for elapsed in 0..20 {
            let expected: ActiveSet = session
                .windows()
                .iter()
                .filter(|w| w.start_seconds <= elapsed && elapsed < w.end_seconds)
                .map(|w| w.node_id())
                .collect();
            assert_eq!(compute_active_set(&session, elapsed), expected, "elapsed={elapsed}");
        }
    }

    #[test]
    fn overlapping_windows_report_node_once() {
        let session =
            Session::new("s", "S", 10, vec![window(4, 0, 5), window(4, 3, 8)]).unwrap();

        let active = compute_active_set(&session, 4);
        assert_eq!(active, set(&[4]));
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn diff_of_equal_sets_is_empty() {
        let a = set(&[1, 3, 9]);
        let d = diff(&a, &a);
        assert!(d.is_empty());
        assert_eq!(d, ActiveSetDiff::default());
    }

    #[test]
    fn diff_from_and_to_empty() {
        let d = diff(&set(&[]), &set(&[1, 2]));
        assert_eq!(d.to_activate, nodes(&[1, 2]));
        assert!(d.to_deactivate.is_empty());

        let d = diff(&set(&[1, 2]), &set(&[]));
        assert!(d.to_activate.is_empty());
        assert_eq!(d.to_deactivate, nodes(&[1, 2]));
    }

    #[test]
    fn diff_is_ascending_and_commands_keep_order() {
        let d = diff(&set(&[8, 2, 5]), &set(&[5, 11, 1]));
        assert_eq!(d.to_activate, nodes(&[1, 11]));
        assert_eq!(d.to_deactivate, nodes(&[2, 8]));

        assert_eq!(
            d.commands(),
            vec![
                TargetCommand::activate(NodeId::new(1)),
                TargetCommand::activate(NodeId::new(11)),
                TargetCommand::deactivate(NodeId::new(2)),
                TargetCommand::deactivate(NodeId::new(8)),
            ]
        );
    }

    #[test]
    fn remaining_uses_earliest_matching_end() {
        let session =
            Session::new("s", "S", 10, vec![window(4, 0, 8), window(4, 2, 5)]).unwrap();

        let active = compute_active_set(&session, 1);
        assert_eq!(remaining_seconds_for_node(&session, &active, NodeId::new(4), 1), 7);

        let active = compute_active_set(&session, 3);
        assert_eq!(remaining_seconds_for_node(&session, &active, NodeId::new(4), 3), 2);

        let active = compute_active_set(&session, 6);
        assert_eq!(remaining_seconds_for_node(&session, &active, NodeId::new(4), 6), 2);
    }

    #[test]
    fn remaining_is_zero_for_inactive_node() {
        let session = Session::new("s", "S", 10, vec![window(5, 2, 6)]).unwrap();

        let active = compute_active_set(&session, 0);
        assert_eq!(remaining_seconds_for_node(&session, &active, NodeId::new(5), 0), 0);

        // Not in the supplied set, even though a window covers the time
        assert_eq!(remaining_seconds_for_node(&session, &set(&[]), NodeId::new(5), 3), 0);

        let active = compute_active_set(&session, 3);
        assert_eq!(remaining_seconds_for_node(&session, &active, NodeId::new(99), 3), 0);
    }
}
