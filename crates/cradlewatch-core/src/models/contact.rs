//! Emergency contact configuration records

use serde::{Deserialize, Serialize};

/// A contact notified when a high-priority alert is raised
///
/// Read-only to the core; owned by configuration and consumed only by the
/// notification dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    /// Display name
    pub name: String,

    /// Phone number
    pub phone: String,

    /// Email address
    pub email: String,
}

impl EmergencyContact {
    /// Hospital defaults used when no contact list is configured
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                name: "Dr. Sarah Johnson".to_string(),
                phone: "+1 (555) 123-4567".to_string(),
                email: "dr.johnson@hospital.com".to_string(),
            },
            Self {
                name: "Nurse Station".to_string(),
                phone: "+1 (555) 987-6543".to_string(),
                email: "nurses@hospital.com".to_string(),
            },
            Self {
                name: "Parents (Emergency)".to_string(),
                phone: "+1 (555) 456-7890".to_string(),
                email: "parents@email.com".to_string(),
            },
        ]
    }
}
