/// The two screens the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    Overview,
    HostDetail,
}

impl ScreenId {
    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::HostDetail => "Host Detail",
        }
    }
}
