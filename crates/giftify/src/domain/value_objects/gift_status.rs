//! GiftStatus - Lifecycle states of a gift

use serde::{Deserialize, Serialize};

/// Gift lifecycle status
///
/// ```text
/// PENDING -> AGENT_PICKING -> AWAITING_APPROVAL -> ORDERED -> SHIPPED -> DELIVERED
///                          \________________________/
/// CANCELLED is reachable from AGENT_PICKING, AWAITING_APPROVAL and ORDERED.
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GiftStatus {
    #[default]
    Pending,
    AgentPicking,
    AwaitingApproval,
    Ordered,
    Shipped,
    Delivered,
    Cancelled,
}

impl GiftStatus {
    /// No mutation is permitted once a gift reaches a terminal status
    pub fn is_terminal(self) -> bool {
        matches!(self, GiftStatus::Delivered | GiftStatus::Cancelled)
    }

    /// Whether `self -> next` is an edge of the lifecycle graph
    pub fn can_transition_to(self, next: GiftStatus) -> bool {
        use GiftStatus::*;
        matches!(
            (self, next),
            (Pending, AgentPicking)
                | (AgentPicking, AwaitingApproval)
                | (AgentPicking, Ordered)
                | (AgentPicking, Cancelled)
                | (AwaitingApproval, Ordered)
                | (AwaitingApproval, Cancelled)
                | (Ordered, Shipped)
                | (Ordered, Cancelled)
                | (Shipped, Delivered)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GiftStatus::Pending => "pending",
            GiftStatus::AgentPicking => "agent_picking",
            GiftStatus::AwaitingApproval => "awaiting_approval",
            GiftStatus::Ordered => "ordered",
            GiftStatus::Shipped => "shipped",
            GiftStatus::Delivered => "delivered",
            GiftStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for GiftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GiftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(GiftStatus::Pending),
            "agent_picking" => Ok(GiftStatus::AgentPicking),
            "awaiting_approval" => Ok(GiftStatus::AwaitingApproval),
            "ordered" => Ok(GiftStatus::Ordered),
            "shipped" => Ok(GiftStatus::Shipped),
            "delivered" => Ok(GiftStatus::Delivered),
            "cancelled" => Ok(GiftStatus::Cancelled),
            _ => Err(format!("Unknown gift status: {}", s)),
        }
    }
}
