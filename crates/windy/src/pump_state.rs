/// `WM_QUIT`, the message `PostQuitMessage` leaves in the queue.
pub const WM_QUIT: u32 = 0x0012;

/// What a single non-blocking peek at the message queue produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeekOutcome {
    Empty,
    Message(u32),
    Failed,
}

/// Decides whether the pump has seen the end of the application.
///
/// Termination follows the most recently peeked message, so an empty peek
/// keeps whatever was decided before. A failed peek ends the pump for good.
#[derive(Debug, Default, Clone)]
pub struct MessagePumpState {
    last_message: Option<u32>,
    failed: bool,
}

impl MessagePumpState {
    pub fn observe(&mut self, outcome: PeekOutcome) {
        match outcome {
            PeekOutcome::Empty => {}
            PeekOutcome::Message(message) => self.last_message = Some(message),
            PeekOutcome::Failed => self.failed = true,
        }
    }

    pub fn termination_requested(&self) -> bool {
        self.failed || self.last_message == Some(WM_QUIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WM_PAINT: u32 = 0x000F;

    #[test]
    fn fresh_pump_keeps_running() {
        assert!(!MessagePumpState::default().termination_requested());
    }

    #[test]
    fn quit_message_terminates() {
        let mut pump = MessagePumpState::default();
        pump.observe(PeekOutcome::Message(WM_PAINT));
        assert!(!pump.termination_requested());
        pump.observe(PeekOutcome::Message(WM_QUIT));
        assert!(pump.termination_requested());
    }

    #[test]
    fn empty_peeks_keep_the_previous_decision() {
        let mut pump = MessagePumpState::default();
        pump.observe(PeekOutcome::Message(WM_QUIT));
        pump.observe(PeekOutcome::Empty);
        pump.observe(PeekOutcome::Empty);
        assert!(pump.termination_requested());

        let mut pump = MessagePumpState::default();
        pump.observe(PeekOutcome::Message(WM_PAINT));
        pump.observe(PeekOutcome::Empty);
        assert!(!pump.termination_requested());
    }

    #[test]
    fn failed_peek_terminates_even_if_messages_follow() {
        let mut pump = MessagePumpState::default();
        pump.observe(PeekOutcome::Failed);
        pump.observe(PeekOutcome::Message(WM_PAINT));
        assert!(pump.termination_requested());
    }
}
