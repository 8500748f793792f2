use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    Stopped,
    Running,
}

/// What the command surface sees of the current monitoring session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorSession {
    pub state: MonitorState,

    // destination alerts are delivered to while running
    pub owner_channel: Option<String>,
}

impl MonitorSession {
    pub fn stopped() -> Self {
        Self {
            state: MonitorState::Stopped,
            owner_channel: None,
        }
    }
}
