//! Actions flowing through the app's mpsc channel.

use hostpulse_core::{HostSnapshot, HostSummary, ViewState};

/// Everything that can change app state. Produced by key handlers, the
/// event reader, and the data bridges; consumed by `App::process_action`.
#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    /// Open the detail screen for a host id.
    OpenHost(String),
    /// Leave the detail screen.
    GoBack,
    /// Manual refresh of whichever feed backs the active screen.
    Refresh,
    ToggleHelp,

    OverviewUpdated(ViewState<Vec<HostSummary>>),
    HostUpdated {
        host_id: String,
        state: ViewState<HostSnapshot>,
    },
}
