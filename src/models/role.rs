use serde::{Deserialize, Serialize};

/// A named role on a project, billed at a whole-number hourly rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub hourly_rate: u32,
}

impl Role {
    pub fn new(name: impl Into<String>, hourly_rate: u32) -> Self {
        Self {
            name: name.into(),
            hourly_rate,
        }
    }
}
