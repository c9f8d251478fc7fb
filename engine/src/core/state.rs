use std::fmt;

/// Lifecycle of the game loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Not receiving refreshes. Timing state is reset.
    #[default]
    Stopped,
    /// Processing every refresh.
    Running,
    /// Ignoring refreshes while keeping timing state.
    Paused,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Stopped => "Stopped",
            State::Running => "Running",
            State::Paused => "Paused",
        };
        f.write_str(name)
    }
}
