/// Outcome of a user action handed to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    Ignored(Ignored),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    Blank,
    /// The same kind of request is still in flight.
    Busy,
}
