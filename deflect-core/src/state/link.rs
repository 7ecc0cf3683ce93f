//! Server lifecycle
//!
//! The network bring-up reports access point events; this state machine
//! turns them into start/stop requests for the HTTP server so the telemetry
//! core never sees radio details.

/// HTTP server state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServerState {
    #[default]
    Stopped,
    Running,
}

/// Access point link events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    ApStarted,
    ApStopped,
}

/// Request for the HTTP server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServerAction {
    Start,
    Stop,
}

/// Tracks whether the HTTP server should be running
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerLifecycle {
    state: ServerState,
}

impl ServerLifecycle {
    pub const fn new() -> Self {
        Self {
            state: ServerState::Stopped,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Process an event, returning the action for the server if any
    pub fn handle(&mut self, event: LinkEvent) -> Option<ServerAction> {
        use LinkEvent::*;
        use ServerState::*;

        match (self.state, event) {
            (Stopped, ApStarted) => {
                self.state = Running;
                Some(ServerAction::Start)
            }
            (Running, ApStopped) => {
                self.state = Stopped;
                Some(ServerAction::Stop)
            }
            // Repeated start/stop
            (Running, ApStarted) | (Stopped, ApStopped) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ap_start_starts_server() {
        let mut link = ServerLifecycle::new();
        assert_eq!(link.handle(LinkEvent::ApStarted), Some(ServerAction::Start));
        assert_eq!(link.state(), ServerState::Running);
    }

    #[test]
    fn test_repeated_start_is_ignored() {
        let mut link = ServerLifecycle::new();
        link.handle(LinkEvent::ApStarted);
        assert_eq!(link.handle(LinkEvent::ApStarted), None);
        assert_eq!(link.state(), ServerState::Running);
    }

    #[test]
    fn test_ap_stop_stops_server() {
        let mut link = ServerLifecycle::new();
        link.handle(LinkEvent::ApStarted);

        assert_eq!(link.handle(LinkEvent::ApStopped), Some(ServerAction::Stop));
        assert_eq!(link.state(), ServerState::Stopped);
    }

    #[test]
    fn test_stop_while_stopped_is_ignored() {
        let mut link = ServerLifecycle::new();
        assert_eq!(link.handle(LinkEvent::ApStopped), None);
    }

    #[test]
    fn test_link_drop_and_recovery_restarts_server() {
        let mut link = ServerLifecycle::new();
        let events = [
            LinkEvent::ApStarted,
            LinkEvent::ApStopped,
            LinkEvent::ApStopped,
            LinkEvent::ApStarted,
        ];

        let actions: [Option<ServerAction>; 4] = events.map(|event| link.handle(event));

        assert_eq!(
            actions,
            [
                Some(ServerAction::Start),
                Some(ServerAction::Stop),
                None,
                Some(ServerAction::Start),
            ]
        );
        assert_eq!(link.state(), ServerState::Running);
    }
}
