use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

pub const MAX_DELAY_MS: u64 = 60_000;

/// Attributes an expiry to the emit that scheduled it. The core never
/// cancels a running timer; it ignores expiries whose id is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOperation {
    NotifyAfter { id: TimerId, duration_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOutput {
    Elapsed { id: TimerId },
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
}

impl<Ev> Capability<Ev> for Timer<Ev> {
    type Operation = TimerOperation;
    type MappedSelf<MappedEv> = Timer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Timer::new(self.context.map_event(f))
    }
}

impl<Ev> Timer<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn notify_after<F>(&self, id: TimerId, duration_ms: u64, make_event: F)
    where
        F: FnOnce(TimerOutput) -> Ev + Send + 'static,
    {
        let duration_ms = duration_ms.min(MAX_DELAY_MS);
        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context
                .request_from_shell(TimerOperation::NotifyAfter { id, duration_ms })
                .await;
            context.update_app(make_event(output));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_roundtrips_through_serde() {
        let op = TimerOperation::NotifyAfter {
            id: TimerId(3),
            duration_ms: 3000,
        };
        let bytes = serde_json::to_vec(&op).unwrap();
        let back: TimerOperation = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn test_elapsed_carries_id() {
        let output = TimerOutput::Elapsed { id: TimerId(9) };
        let TimerOutput::Elapsed { id } = output;
        assert_eq!(id, TimerId(9));
    }
}
