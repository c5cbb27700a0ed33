//! Target controller line protocol
//!
//! One command per line: `<node_id>,<true|false>\n`.

use range_util::NodeId;

/// Encode one target command as a protocol line
pub fn encode_command(node_id: NodeId, active: bool) -> String {
    format!("{},{}\n", node_id, if active { "true" } else { "false" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_activation() {
        assert_eq!(encode_command(NodeId::new(5), true), "5,true\n");
    }

    #[test]
    fn encodes_deactivation() {
        assert_eq!(encode_command(NodeId::new(12), false), "12,false\n");
    }
}
