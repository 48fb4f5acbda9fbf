use chrono::{DateTime, Utc};

/// Lifecycle status of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    Pending,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Pending => "pending",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TicketStatus::Open),
            "pending" => Some(TicketStatus::Pending),
            "resolved" => Some(TicketStatus::Resolved),
            "closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }
}

/// A support ticket as seen by the auto-close engine.
#[derive(Debug, Clone)]
pub struct SupportTicket {
    pub id: String,
    pub status: TicketStatus,
    /// When the ticket entered `Resolved`.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Most recent patient response, if any.
    pub last_patient_response_at: Option<DateTime<Utc>>,
}

impl SupportTicket {
    /// The instant inactivity is measured from: the last patient
    /// response, or the resolution time when no later response exists.
    pub fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        match (self.last_patient_response_at, self.resolved_at) {
            (Some(response), Some(resolved)) => Some(response.max(resolved)),
            (response, resolved) => response.or(resolved),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, 0, 0).unwrap()
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TicketStatus::Open,
            TicketStatus::Pending,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TicketStatus::parse("archived"), None);
    }

    #[test]
    fn test_last_activity_prefers_later_response() {
        let ticket = SupportTicket {
            id: "t1".to_string(),
            status: TicketStatus::Resolved,
            resolved_at: Some(at(8)),
            last_patient_response_at: Some(at(10)),
        };
        assert_eq!(ticket.last_activity_at(), Some(at(10)));
    }

    #[test]
    fn test_last_activity_falls_back_to_resolution() {
        // A response older than the resolution does not count as later
        // activity.
        let ticket = SupportTicket {
            id: "t1".to_string(),
            status: TicketStatus::Resolved,
            resolved_at: Some(at(10)),
            last_patient_response_at: Some(at(8)),
        };
        assert_eq!(ticket.last_activity_at(), Some(at(10)));

        let no_response = SupportTicket {
            id: "t2".to_string(),
            status: TicketStatus::Resolved,
            resolved_at: Some(at(9)),
            last_patient_response_at: None,
        };
        assert_eq!(no_response.last_activity_at(), Some(at(9)));
    }
}
