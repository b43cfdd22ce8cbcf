//! Dispatch engine — routes messages to registered devices.
//!
//! Two disciplines are offered on top of [`Dispatcher::dispatch_one`]:
//!
//! - [`dispatch_batch`](Dispatcher::dispatch_batch) runs every message in its
//!   own task and waits for all of them (fail-together).
//! - [`dispatch_sequence`](Dispatcher::dispatch_sequence) runs messages in list
//!   order and stops at the first failure (fail-fast).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::Instrument;

use devhub_domain::error::DispatchError;
use devhub_domain::message::Message;
use devhub_domain::reply::DeviceReply;
use devhub_domain::report::{BatchReport, Delivery, MessageFailure};
use devhub_domain::time::now;

use crate::registry::DeviceRegistry;

/// Resolves message targets through the registry and invokes devices.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<DeviceRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher resolving targets in `registry`.
    pub fn new(registry: Arc<DeviceRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver a single message.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownDevice`] when the target is not
    /// registered, or the device's own error (e.g.
    /// [`DispatchError::UnsupportedCommand`]).
    #[tracing::instrument(skip(self, message), fields(target = %message.target(), kind = %message.kind()))]
    pub async fn dispatch_one(&self, message: Message) -> Result<DeviceReply, DispatchError> {
        self.deliver(0, message)
            .await
            .map(|delivery| delivery.reply)
            .map_err(|failure| failure.error)
    }

    /// Deliver every message concurrently and wait for all of them.
    ///
    /// No ordering holds between messages. A failing message never cancels
    /// its siblings: each one is attempted exactly once, and the report
    /// accounts for all of them, ordered by index.
    #[tracing::instrument(skip(self, messages), fields(count = messages.len()))]
    pub async fn dispatch_batch(&self, messages: Vec<Message>) -> BatchReport {
        let mut tasks = JoinSet::new();
        let mut in_flight = HashMap::with_capacity(messages.len());

        for (index, message) in messages.into_iter().enumerate() {
            let dispatcher = self.clone();
            let owned = message.clone();
            let handle = tasks.spawn(
                async move { dispatcher.deliver(index, owned).await }.in_current_span(),
            );
            in_flight.insert(handle.id(), (index, message));
        }

        let mut report = BatchReport::default();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((task_id, Ok(delivery))) => {
                    in_flight.remove(&task_id);
                    report.deliveries.push(delivery);
                }
                Ok((task_id, Err(failure))) => {
                    in_flight.remove(&task_id);
                    report.failures.push(failure);
                }
                Err(err) => {
                    let Some((index, message)) = in_flight.remove(&err.id()) else {
                        continue;
                    };
                    tracing::error!(index, %message, panicked = err.is_panic(), "device task did not complete");
                    report.failures.push(MessageFailure {
                        index,
                        error: DispatchError::HandlerPanicked {
                            target: message.target(),
                        },
                        message,
                    });
                }
            }
        }

        report.sort_by_index();
        tracing::debug!(
            delivered = report.deliveries.len(),
            failed = report.failures.len(),
            "batch complete"
        );
        report
    }

    /// Deliver messages one at a time, in order.
    ///
    /// Each message is awaited before the next one starts. On the first
    /// failure the remaining messages are discarded without being attempted.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SequenceAborted`] carrying the number of
    /// messages completed before the failure and the failing message.
    #[tracing::instrument(skip(self, messages), fields(count = messages.len()))]
    pub async fn dispatch_sequence(
        &self,
        messages: Vec<Message>,
    ) -> Result<Vec<Delivery>, DispatchError> {
        let total = messages.len();
        let mut deliveries = Vec::with_capacity(total);

        for (index, message) in messages.into_iter().enumerate() {
            match self.deliver(index, message).await {
                Ok(delivery) => deliveries.push(delivery),
                Err(failure) => {
                    tracing::warn!(
                        completed = deliveries.len(),
                        skipped = total - index - 1,
                        "sequence aborted"
                    );
                    return Err(DispatchError::SequenceAborted {
                        completed: deliveries.len(),
                        failure: Box::new(failure),
                    });
                }
            }
        }

        Ok(deliveries)
    }

    async fn deliver(&self, index: usize, message: Message) -> Result<Delivery, MessageFailure> {
        let device = match self.registry.resolve(message.target()) {
            Ok(device) => device,
            Err(error) => {
                tracing::warn!(index, %message, %error, "cannot resolve target");
                return Err(MessageFailure {
                    index,
                    message,
                    error,
                });
            }
        };

        let lease = device.acquire().await;
        let started_at = now();
        let result = lease.handle(&message).await;
        let finished_at = now();
        drop(lease);

        match result {
            Ok(reply) => {
                tracing::debug!(index, device = device.name(), kind = %message.kind(), "message delivered");
                Ok(Delivery {
                    index,
                    message,
                    reply,
                    started_at,
                    finished_at,
                })
            }
            Err(error) => {
                tracing::warn!(index, device = device.name(), %error, "message failed");
                Err(MessageFailure {
                    index,
                    message,
                    error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Device;
    use async_trait::async_trait;
    use devhub_domain::id::DeviceId;
    use devhub_domain::message::CommandKind;
    use devhub_domain::reply::PowerState;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    // ── Test doubles ───────────────────────────────────────────────

    type Journal = Arc<Mutex<Vec<String>>>;

    /// Switchable device that sleeps, records every handled message and
    /// tracks how many messages it handles at the same time.
    struct RecordingDevice {
        name: &'static str,
        latency: Duration,
        journal: Journal,
        active: AtomicUsize,
        peak: Arc<AtomicUsize>,
    }

    impl RecordingDevice {
        fn new(name: &'static str, latency_ms: u64, journal: &Journal) -> Self {
            Self {
                name,
                latency: Duration::from_millis(latency_ms),
                journal: Arc::clone(journal),
                active: AtomicUsize::new(0),
                peak: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Device for RecordingDevice {
        fn name(&self) -> &str {
            self.name
        }

        fn supported_commands(&self) -> &'static [CommandKind] {
            &[CommandKind::SwitchOn, CommandKind::SwitchOff]
        }

        async fn handle(&self, message: &Message) -> Result<DeviceReply, DispatchError> {
            let power = match message.kind() {
                CommandKind::SwitchOn => PowerState::On,
                CommandKind::SwitchOff => PowerState::Off,
                other => return Err(self.unsupported(other)),
            };
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now_active, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.journal
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, message.kind()));
            Ok(DeviceReply::empty().with_power(power))
        }
    }

    /// Records the name of the span active while it handles a message.
    #[derive(Default)]
    struct SpanRecorder {
        seen: Arc<Mutex<Vec<Option<&'static str>>>>,
    }

    #[async_trait]
    impl Device for SpanRecorder {
        fn name(&self) -> &str {
            "SpanRecorder"
        }

        fn supported_commands(&self) -> &'static [CommandKind] {
            &[CommandKind::SwitchOn]
        }

        async fn handle(&self, _message: &Message) -> Result<DeviceReply, DispatchError> {
            let name = tracing::Span::current().metadata().map(|m| m.name());
            self.seen.lock().unwrap().push(name);
            Ok(DeviceReply::empty())
        }
    }

    struct PanickingDevice;

    #[async_trait]
    impl Device for PanickingDevice {
        fn name(&self) -> &str {
            "Faulty"
        }

        fn supported_commands(&self) -> &'static [CommandKind] {
            &[CommandKind::SwitchOn]
        }

        async fn handle(&self, _message: &Message) -> Result<DeviceReply, DispatchError> {
            panic!("hardware on fire");
        }
    }

    fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn entries(journal: &Journal) -> Vec<String> {
        journal.lock().unwrap().clone()
    }

    // ── dispatch_one ───────────────────────────────────────────────

    #[tokio::test]
    async fn should_return_device_reply_when_dispatching_one() {
        let registry = Arc::new(DeviceRegistry::new());
        let log = journal();
        let lamp = registry.register(RecordingDevice::new("lamp", 10, &log));
        let dispatcher = Dispatcher::new(registry);

        let reply = dispatcher
            .dispatch_one(Message::new(lamp, CommandKind::SwitchOn))
            .await
            .unwrap();
        assert_eq!(reply.power, Some(PowerState::On));
        assert_eq!(entries(&log), vec!["lamp:SWITCH_ON"]);
    }

    #[tokio::test]
    async fn should_fail_with_unknown_device_when_target_not_registered() {
        let dispatcher = Dispatcher::new(Arc::new(DeviceRegistry::new()));
        let ghost = DeviceId::new();

        let result = dispatcher
            .dispatch_one(Message::new(ghost, CommandKind::SwitchOn))
            .await;
        assert!(matches!(result, Err(DispatchError::UnknownDevice(id)) if id == ghost));
    }

    #[tokio::test]
    async fn should_fail_with_unsupported_command_and_keep_engine_usable() {
        let registry = Arc::new(DeviceRegistry::new());
        let log = journal();
        let lamp = registry.register(RecordingDevice::new("lamp", 10, &log));
        let dispatcher = Dispatcher::new(registry);

        let result = dispatcher
            .dispatch_one(Message::new(lamp, CommandKind::Flush))
            .await;
        assert!(matches!(
            result,
            Err(DispatchError::UnsupportedCommand(ref e)) if e.kind == CommandKind::Flush
        ));

        let again = dispatcher
            .dispatch_one(Message::new(lamp, CommandKind::SwitchOn))
            .await;
        assert!(again.is_ok());
    }

    // ── dispatch_batch ─────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn should_take_about_the_slowest_call_when_dispatching_batch() {
        let registry = Arc::new(DeviceRegistry::new());
        let log = journal();
        let ids = [
            registry.register(RecordingDevice::new("a", 100, &log)),
            registry.register(RecordingDevice::new("b", 300, &log)),
            registry.register(RecordingDevice::new("c", 200, &log)),
        ];
        let dispatcher = Dispatcher::new(registry);
        let messages = ids
            .iter()
            .map(|id| Message::new(*id, CommandKind::SwitchOn))
            .collect();

        let start = Instant::now();
        let report = dispatcher.dispatch_batch(messages).await;
        let elapsed = start.elapsed();

        assert!(report.is_success());
        assert_eq!(report.deliveries.len(), 3);
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(600), "took {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn should_attempt_every_message_when_some_fail_in_batch() {
        let registry = Arc::new(DeviceRegistry::new());
        let log = journal();
        let a = registry.register(RecordingDevice::new("a", 50, &log));
        let b = registry.register(RecordingDevice::new("b", 50, &log));
        let dispatcher = Dispatcher::new(registry);

        let report = dispatcher
            .dispatch_batch(vec![
                Message::new(a, CommandKind::SwitchOn),
                Message::new(b, CommandKind::ChangeColor),
                Message::new(DeviceId::new(), CommandKind::SwitchOn),
                Message::new(b, CommandKind::SwitchOff),
            ])
            .await;

        assert!(!report.is_success());
        assert_eq!(report.len(), 4);
        assert_eq!(report.failed_indices(), vec![1, 2]);
        assert!(matches!(
            report.failures[0].error,
            DispatchError::UnsupportedCommand(_)
        ));
        assert!(matches!(
            report.failures[1].error,
            DispatchError::UnknownDevice(_)
        ));

        let mut handled = entries(&log);
        handled.sort();
        assert_eq!(handled, vec!["a:SWITCH_ON", "b:SWITCH_OFF"]);
    }

    #[tokio::test]
    async fn should_report_panicking_handler_without_losing_siblings() {
        let registry = Arc::new(DeviceRegistry::new());
        let log = journal();
        let lamp = registry.register(RecordingDevice::new("lamp", 10, &log));
        let faulty = registry.register(PanickingDevice);
        let dispatcher = Dispatcher::new(registry);

        let report = dispatcher
            .dispatch_batch(vec![
                Message::new(faulty, CommandKind::SwitchOn),
                Message::new(lamp, CommandKind::SwitchOn),
            ])
            .await;

        assert_eq!(report.deliveries.len(), 1);
        assert_eq!(report.deliveries[0].index, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            DispatchError::HandlerPanicked { target } if target == faulty
        ));
    }

    #[tokio::test]
    async fn should_run_batch_tasks_inside_the_caller_span() {
        let _subscriber = tracing::subscriber::set_default(tracing_subscriber::registry());
        let registry = Arc::new(DeviceRegistry::new());
        let recorder = SpanRecorder::default();
        let seen = Arc::clone(&recorder.seen);
        let id = registry.register(recorder);
        let dispatcher = Dispatcher::new(registry);

        let report = dispatcher
            .dispatch_batch(vec![
                Message::new(id, CommandKind::SwitchOn),
                Message::new(id, CommandKind::SwitchOn),
            ])
            .await;

        assert!(report.is_success());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some("dispatch_batch"), Some("dispatch_batch")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_serialize_messages_targeting_the_same_device() {
        let registry = Arc::new(DeviceRegistry::new());
        let log = journal();
        let device = RecordingDevice::new("speaker", 100, &log);
        let peak = Arc::clone(&device.peak);
        let speaker = registry.register(device);
        let dispatcher = Dispatcher::new(registry);

        let start = Instant::now();
        let report = dispatcher
            .dispatch_batch(vec![
                Message::new(speaker, CommandKind::SwitchOn),
                Message::new(speaker, CommandKind::SwitchOff),
            ])
            .await;

        assert!(report.is_success());
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn should_return_empty_report_for_empty_batch() {
        let dispatcher = Dispatcher::new(Arc::new(DeviceRegistry::new()));
        let report = dispatcher.dispatch_batch(Vec::new()).await;
        assert!(report.is_empty());
        assert!(report.is_success());
    }

    // ── dispatch_sequence ──────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn should_deliver_in_list_order_when_dispatching_sequence() {
        let registry = Arc::new(DeviceRegistry::new());
        let log = journal();
        let slow = registry.register(RecordingDevice::new("slow", 300, &log));
        let fast = registry.register(RecordingDevice::new("fast", 10, &log));
        let dispatcher = Dispatcher::new(registry);

        let start = Instant::now();
        let deliveries = dispatcher
            .dispatch_sequence(vec![
                Message::new(slow, CommandKind::SwitchOn),
                Message::new(fast, CommandKind::SwitchOn),
                Message::new(slow, CommandKind::SwitchOff),
            ])
            .await
            .unwrap();

        assert_eq!(
            entries(&log),
            vec!["slow:SWITCH_ON", "fast:SWITCH_ON", "slow:SWITCH_OFF"]
        );
        let indices: Vec<_> = deliveries.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(start.elapsed() >= Duration::from_millis(610));
    }

    #[tokio::test]
    async fn should_abort_sequence_at_first_failure() {
        let registry = Arc::new(DeviceRegistry::new());
        let log = journal();
        let lamp = registry.register(RecordingDevice::new("lamp", 10, &log));
        let dispatcher = Dispatcher::new(registry);

        let result = dispatcher
            .dispatch_sequence(vec![
                Message::new(lamp, CommandKind::SwitchOn),
                Message::new(lamp, CommandKind::PlaySong),
                Message::new(lamp, CommandKind::SwitchOff),
            ])
            .await;

        match result {
            Err(DispatchError::SequenceAborted { completed, failure }) => {
                assert_eq!(completed, 1);
                assert_eq!(failure.index, 1);
                assert_eq!(failure.message.kind(), CommandKind::PlaySong);
                assert!(matches!(
                    failure.error,
                    DispatchError::UnsupportedCommand(_)
                ));
            }
            other => panic!("expected SequenceAborted, got {other:?}"),
        }
        assert_eq!(entries(&log), vec!["lamp:SWITCH_ON"]);
    }

    #[tokio::test]
    async fn should_abort_sequence_before_anything_when_first_target_unknown() {
        let registry = Arc::new(DeviceRegistry::new());
        let log = journal();
        let lamp = registry.register(RecordingDevice::new("lamp", 10, &log));
        let dispatcher = Dispatcher::new(registry);

        let result = dispatcher
            .dispatch_sequence(vec![
                Message::new(DeviceId::new(), CommandKind::SwitchOn),
                Message::new(lamp, CommandKind::SwitchOn),
            ])
            .await;

        assert!(matches!(
            result,
            Err(DispatchError::SequenceAborted { completed: 0, .. })
        ));
        assert!(entries(&log).is_empty());
    }
}
