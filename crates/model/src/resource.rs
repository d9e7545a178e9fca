use crate::schema::{self, ResourceSchema};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The helpdesk entities extracted by a run, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Tickets,
    TicketFields,
    AgentGroups,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Tickets,
        ResourceKind::TicketFields,
        ResourceKind::AgentGroups,
    ];

    /// Path of the list endpoint, relative to the API base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ResourceKind::Tickets => "tickets",
            ResourceKind::TicketFields => "ticket_form_fields",
            ResourceKind::AgentGroups => "groups",
        }
    }

    /// Key of the JSON array wrapping the records in a page response.
    pub fn envelope_key(&self) -> &'static str {
        match self {
            ResourceKind::Tickets => "tickets",
            ResourceKind::TicketFields => "ticket_fields",
            ResourceKind::AgentGroups => "groups",
        }
    }

    /// Object name stem in the stage.
    pub fn stem(&self) -> &'static str {
        match self {
            ResourceKind::Tickets => "TICKETS",
            ResourceKind::TicketFields => "TICKET_FIELDS",
            ResourceKind::AgentGroups => "AGENTGROUPS",
        }
    }

    /// Only tickets are extracted incrementally. Ticket fields and agent
    /// groups are small and fully re-fetched on every run.
    pub fn is_incremental(&self) -> bool {
        matches!(self, ResourceKind::Tickets)
    }

    pub fn schema(&self) -> &'static ResourceSchema {
        match self {
            ResourceKind::Tickets => &schema::tickets::SCHEMA,
            ResourceKind::TicketFields => &schema::ticket_fields::SCHEMA,
            ResourceKind::AgentGroups => &schema::agent_groups::SCHEMA,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Tickets => "tickets",
            ResourceKind::TicketFields => "ticket-fields",
            ResourceKind::AgentGroups => "agent-groups",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "tickets" | "ticket" => Ok(ResourceKind::Tickets),
            "ticket-fields" | "ticket-form-fields" => Ok(ResourceKind::TicketFields),
            "agent-groups" | "groups" | "agentgroups" => Ok(ResourceKind::AgentGroups),
            other => Err(format!("Unknown resource: {other}")),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
