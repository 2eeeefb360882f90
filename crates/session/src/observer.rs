use crate::state::SessionState;

/// Receives the session state after every transition and every progress
/// update. Presentation layers render from this.
pub trait SessionObserver {
    fn on_state(&mut self, state: &SessionState);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionState),
{
    fn on_state(&mut self, state: &SessionState) {
        self(state)
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SessionObserver for NullObserver {
    fn on_state(&mut self, _state: &SessionState) {}
}
