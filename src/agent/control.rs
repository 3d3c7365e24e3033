//! Control channel.
//!
//! Inbound fire-and-forget commands from the hosting page. Two literal
//! command values are recognized; everything else is ignored without error,
//! and no acknowledgment is ever sent back.

use super::{LifecycleEvent, LifecycleState, SyncAgent};
use crate::error::AgentError;
use crate::fetch::FetchMode;
use crate::store::Namespace;
use std::collections::HashSet;
use tracing::{debug, info};

/// Recognized control commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Immediately activate a waiting install. The caller reloads the page
    /// afterward; already-loaded scripts are not swapped.
    ForceActivate,
    /// Fetch and store every manifest path missing from the content cache.
    PrefetchAll,
}

impl ControlMessage {
    /// Parse a raw message; unrecognized values are `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "force-activate" => Some(Self::ForceActivate),
            "prefetch-all" => Some(Self::PrefetchAll),
            _ => None,
        }
    }
}

impl SyncAgent {
    /// Handle one inbound control message.
    pub async fn handle_message(&self, raw: &str) -> Result<(), AgentError> {
        match ControlMessage::parse(raw) {
            Some(ControlMessage::ForceActivate) => {
                if self.state() == LifecycleState::Installed {
                    self.dispatch(LifecycleEvent::ForceActivate).await
                } else {
                    debug!(state = self.state().as_str(), "force-activate with no waiting install");
                    Ok(())
                }
            }
            Some(ControlMessage::PrefetchAll) => self.prefetch_all().await,
            None => {
                debug!(message = raw, "ignoring unrecognized control message");
                Ok(())
            }
        }
    }

    /// Fetch every manifest path not yet present in the content cache, for
    /// explicit full-offline support. Runs independently of request
    /// interception. The first failed fetch aborts the whole prefetch;
    /// entries stored before the failure remain, each individually valid.
    pub async fn prefetch_all(&self) -> Result<(), AgentError> {
        let cached: HashSet<String> = self.store.keys(Namespace::Content)?.into_iter().collect();
        let missing: Vec<&String> = self
            .manifest
            .paths()
            .filter(|path| !cached.contains(*path))
            .collect();

        info!(missing = missing.len(), "prefetching resources absent from content cache");

        let fetches = missing.into_iter().map(|path| {
            let url = self.resource_url(path);
            async move {
                let fetched = self.fetcher.fetch(&url, FetchMode::Default).await?;
                Ok::<_, AgentError>((path, fetched))
            }
        });

        for (path, fetched) in futures::future::try_join_all(fetches).await? {
            self.store
                .put(Namespace::Content, path, &fetched.into_cached())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognized_literals() {
        assert_eq!(
            ControlMessage::parse("force-activate"),
            Some(ControlMessage::ForceActivate)
        );
        assert_eq!(
            ControlMessage::parse("prefetch-all"),
            Some(ControlMessage::PrefetchAll)
        );
    }

    #[test]
    fn unknown_messages_are_none() {
        assert_eq!(ControlMessage::parse(""), None);
        assert_eq!(ControlMessage::parse("forceActivate"), None);
        assert_eq!(ControlMessage::parse("prefetch-all "), None);
    }
}
