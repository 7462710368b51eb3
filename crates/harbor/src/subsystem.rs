use harbor_domain::FeatureFlags;
use std::error::Error;
use std::fmt::{self, Debug, Display};

pub type SubsystemResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Where a subsystem sits in the construction order.
///
/// Introspection and hooks come up before the command registry; chat and
/// network handlers after it. Teardown runs in the reverse order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubsystemStage {
    Introspection,
    Hooks,
    ChatNetwork,
}

impl Display for SubsystemStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Introspection => "introspection",
            Self::Hooks => "hooks",
            Self::ChatNetwork => "chat-network",
        })
    }
}

/// A collaborator owned by the orchestrator: process introspection, a game
/// hook, a chat or network handler.
pub trait Subsystem: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Flag gating `enable`; `None` means always enabled on start.
    fn required_flag(&self) -> Option<FeatureFlags> {
        None
    }

    fn enable(&self) -> SubsystemResult;

    fn dispose(&self) -> SubsystemResult {
        Ok(())
    }
}
