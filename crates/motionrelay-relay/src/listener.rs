use motionrelay_frame::Command;

/// Receives coalesced commands at flush time.
///
/// Called on the scheduler thread once per emitted command. Implementations
/// should hand work off rather than block, since a slow listener delays the
/// next drain.
pub trait CommandListener: Send {
    fn on_command(&mut self, command: Command);
}

impl<F> CommandListener for F
where
    F: FnMut(Command) + Send,
{
    fn on_command(&mut self, command: Command) {
        self(command)
    }
}
