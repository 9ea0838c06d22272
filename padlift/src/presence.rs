/// Pressure pad input edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Something stepped onto or off the pressure pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    PresenceDetected,
    PresenceReleased,
}

impl PresenceEvent {
    /// The pad pulls its input low while loaded
    pub fn from_edge(edge: Edge) -> Self {
        match edge {
            Edge::Falling => PresenceEvent::PresenceDetected,
            Edge::Rising => PresenceEvent::PresenceReleased,
        }
    }
}
