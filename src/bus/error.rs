use thiserror::Error;

/// Errors surfaced by bus operations.
#[derive(Debug, Error)]
pub enum BusError {
    /// The coordination loop has stopped; the bus accepts no further
    /// publishes or registrations.
    #[error("bus closed")]
    Closed,
}
