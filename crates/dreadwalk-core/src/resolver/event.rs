//! Event resolver for plugin notifications.
//!
//! The `EventResolver` forwards event outputs to the frame report. Unlike
//! other resolvers, it does not mutate game state; it only records what
//! plugins said happened during the frame.

use tracing::debug;

use crate::arena::Arena;
use crate::output::{Event, OutputEnvelope, OutputKind};
use crate::plugin::FrameContext;

use super::Resolver;

/// Resolver that passes plugin events through to the host.
///
/// Events are returned in sorted output order and logged at debug level
/// with the trace id of the plugin run that raised them.
///
/// # Example
///
/// ```
/// use dreadwalk_core::resolver::EventResolver;
/// use dreadwalk_core::resolver::Resolver;
/// use dreadwalk_core::output::OutputKind;
///
/// let resolver = EventResolver::new();
/// assert!(resolver.handles().contains(&OutputKind::Event));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventResolver;

impl EventResolver {
    /// Creates a new event resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for EventResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Event]
    }

    fn resolve(
        &self,
        _frame: &FrameContext,
        outputs: &[&OutputEnvelope],
        _current: &Arena,
        _next: &mut Arena,
    ) -> Vec<Event> {
        outputs
            .iter()
            .filter_map(|envelope| {
                let event = envelope.output().as_event()?;
                debug!(
                    trace = %envelope.trace_id(),
                    source = %envelope.source(),
                    ?event,
                    "event"
                );
                Some(event.clone())
            })
            .collect()
    }
}
