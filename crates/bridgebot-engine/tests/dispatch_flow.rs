// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the aggregation/dispatch flow: trigger timing,
//! mutual exclusion, and cache reconciliation under concurrent arrivals.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridgebot_cache::CacheStore;
use bridgebot_config::model::BridgeConfig;
use bridgebot_core::{
    CachedMessage, ChannelId, ChatEvent, MessageEvent, TypingEvent, UserId,
};
use bridgebot_engine::{
    ActivityState, CollectorSettings, ConnectivityProbe, DispatchCoordinator, DispatchOutcome,
    DispatchSettings, Engine, InactivityMonitor, MessageCollector, MonitorSettings, Scrubber,
};
use bridgebot_test_utils::{MockChannel, MockPersona};
use tokio_util::sync::CancellationToken;

const WATCHED: ChannelId = ChannelId(100);
const BOT: UserId = UserId(1);
const HUMAN: UserId = UserId(2);

struct FixedProbe(bool);

#[async_trait]
impl ConnectivityProbe for FixedProbe {
    async fn is_reachable(&self) -> bool {
        self.0
    }
}

fn message(text: &str) -> MessageEvent {
    MessageEvent {
        channel_id: WATCHED,
        sender_id: HUMAN,
        sender_name: "rin".into(),
        display_name: "Rin".into(),
        content: text.into(),
        reply_to: None,
    }
}

fn cached(text: &str) -> CachedMessage {
    CachedMessage {
        username: "rin".into(),
        name: "Rin".into(),
        message: text.into(),
        reply_message: None,
    }
}

/// Everything needed to drive the flow by hand, tick by tick.
struct Harness {
    channel: Arc<MockChannel>,
    persona: Arc<MockPersona>,
    store: Arc<CacheStore>,
    activity: Arc<ActivityState>,
    collector: MessageCollector,
    coordinator: Arc<DispatchCoordinator>,
    monitor: InactivityMonitor,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        CacheStore::open(dir.path().join("cache.json"))
            .await
            .unwrap(),
    );
    let channel = Arc::new(MockChannel::new());
    let persona = Arc::new(MockPersona::new());
    let activity = Arc::new(ActivityState::new());

    let collector = MessageCollector::new(
        channel.clone(),
        store.clone(),
        activity.clone(),
        Scrubber::compile(&[]).unwrap(),
        CollectorSettings {
            watch_channels: vec![WATCHED],
            bot_id: BOT,
            comment_prefixes: vec!["#".into(), "//".into()],
            strip_user_emojis: false,
        },
    );

    let coordinator = Arc::new(DispatchCoordinator::new(
        channel.clone(),
        persona.clone(),
        store.clone(),
        activity.clone(),
        Arc::new(FixedProbe(true)),
        Scrubber::compile(&[]).unwrap(),
        DispatchSettings {
            reply_channel: WATCHED,
            line_by_line: false,
            strip_persona_emojis: false,
        },
    ));

    let monitor = InactivityMonitor::new(
        store.clone(),
        activity.clone(),
        coordinator.clone(),
        MonitorSettings {
            poll_interval: Duration::from_secs(3),
            idle_threshold: Duration::from_secs(7),
            batch_threshold: 5,
        },
    );

    Harness {
        channel,
        persona,
        store,
        activity,
        collector,
        coordinator,
        monitor,
        _dir: dir,
    }
}

/// One message followed by 7+ seconds of silence dispatches via the idle path.
#[tokio::test(start_paused = true)]
async fn idle_silence_triggers_dispatch() {
    let h = harness().await;
    h.collector.accept(message("hello")).await.unwrap();

    // Under the threshold: nothing fires.
    tokio::time::advance(Duration::from_secs(6)).await;
    h.monitor.tick().await.unwrap();
    assert_eq!(h.persona.call_count(), 0);

    // Crossing the threshold fires exactly one dispatch.
    tokio::time::advance(Duration::from_secs(1)).await;
    h.monitor.tick().await.unwrap();
    assert_eq!(h.persona.call_count(), 1);
    assert_eq!(h.channel.sent_count().await, 1);
    assert_eq!(h.store.len().await, 0);
}

/// Five messages within the quiet window dispatch via the count path.
#[tokio::test(start_paused = true)]
async fn batch_threshold_triggers_without_idle() {
    let h = harness().await;

    for i in 0..4 {
        h.collector
            .accept(message(&format!("m{i}")))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        h.monitor.tick().await.unwrap();
        assert_eq!(h.persona.call_count(), 0, "under both thresholds");
    }

    h.collector.accept(message("m4")).await.unwrap();
    h.monitor.tick().await.unwrap();
    assert_eq!(h.persona.call_count(), 1);

    // The whole backlog went out as one batch.
    assert_eq!(h.persona.batches()[0].len(), 5);
    assert_eq!(h.store.len().await, 0);
}

/// Typing keeps deferring the idle path as long as gaps stay under the
/// threshold; the count path is not reached here.
#[tokio::test(start_paused = true)]
async fn typing_resets_the_idle_clock() {
    let h = harness().await;
    h.collector.accept(message("are you there?")).await.unwrap();

    for _ in 0..5 {
        tokio::time::advance(Duration::from_secs(5)).await;
        h.collector
            .on_typing(TypingEvent {
                channel_id: WATCHED,
                user_id: HUMAN,
            })
            .await;
        h.monitor.tick().await.unwrap();
    }
    assert_eq!(h.persona.call_count(), 0, "typing deferred dispatch");

    // Once the typing stops, the idle path fires.
    tokio::time::advance(Duration::from_secs(7)).await;
    h.monitor.tick().await.unwrap();
    assert_eq!(h.persona.call_count(), 1);
}

/// Typing in an unwatched channel does not defer dispatch.
#[tokio::test(start_paused = true)]
async fn unwatched_typing_does_not_defer() {
    let h = harness().await;
    h.collector.accept(message("hello")).await.unwrap();

    tokio::time::advance(Duration::from_secs(7)).await;
    h.collector
        .on_typing(TypingEvent {
            channel_id: ChannelId(999),
            user_id: HUMAN,
        })
        .await;
    h.monitor.tick().await.unwrap();
    assert_eq!(h.persona.call_count(), 1);
}

/// The monitor skips ticks while a response is awaited.
#[tokio::test(start_paused = true)]
async fn monitor_skips_while_awaiting_response() {
    let h = harness().await;
    h.collector.accept(message("hello")).await.unwrap();
    h.activity.set_awaiting_response(true);

    tokio::time::advance(Duration::from_secs(30)).await;
    h.monitor.tick().await.unwrap();
    assert_eq!(h.persona.call_count(), 0);

    h.activity.set_awaiting_response(false);
    h.monitor.tick().await.unwrap();
    assert_eq!(h.persona.call_count(), 1);
}

/// Under simultaneous trigger attempts, exactly one dispatch executes at a
/// time and the backlog is consumed exactly once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dispatch_is_mutually_exclusive() {
    let h = harness().await;
    for i in 0..3 {
        h.store.append(cached(&format!("m{i}"))).await.unwrap();
    }
    h.persona.set_delay(Duration::from_millis(100));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let coordinator = h.coordinator.clone();
        handles.push(tokio::spawn(async move { coordinator.dispatch().await }));
    }

    let mut dispatched = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            DispatchOutcome::Dispatched { delivered } => {
                dispatched += 1;
                assert_eq!(delivered, 1);
            }
            DispatchOutcome::AlreadyInFlight | DispatchOutcome::EmptyCache => {}
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    assert_eq!(dispatched, 1, "exactly one dispatch consumed the backlog");
    assert_eq!(h.persona.max_concurrent(), 1, "no overlapping persona calls");
    assert_eq!(h.store.len().await, 0);
}

/// A message arriving mid-dispatch survives reconciliation verbatim.
#[tokio::test]
async fn reconciliation_preserves_concurrent_arrivals() {
    let h = harness().await;
    h.store.append(cached("m1")).await.unwrap();
    h.store.append(cached("m2")).await.unwrap();
    h.persona.set_delay(Duration::from_millis(150));

    let coordinator = h.coordinator.clone();
    let dispatch = tokio::spawn(async move { coordinator.dispatch().await });

    // Let the dispatch take its snapshot, then land a new message.
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.store.append(cached("m3")).await.unwrap();

    let outcome = dispatch.await.unwrap().unwrap();
    assert!(matches!(outcome, DispatchOutcome::Dispatched { .. }));

    let remaining = h.store.messages().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].message, "m3");

    // The dispatched batch saw only the snapshot.
    assert_eq!(h.persona.batches()[0].len(), 2);
}

/// A dispatch that fails mid-cycle still clears the awaiting flag,
/// refreshes the activity clock, and reconciles the snapshot away.
#[tokio::test(start_paused = true)]
async fn failed_dispatch_still_reconciles() {
    let h = harness().await;
    h.collector.accept(message("hello")).await.unwrap();
    h.persona.fail_generation(true);

    tokio::time::advance(Duration::from_secs(7)).await;
    let err = h.monitor.tick().await.unwrap_err();
    assert!(err.to_string().contains("persona"));

    assert_eq!(h.store.len().await, 0, "snapshot removed despite failure");
    assert!(!h.activity.awaiting_response());
    assert!(h.activity.idle_for().await < Duration::from_secs(1));

    // The next cycle proceeds normally once the persona recovers.
    h.persona.fail_generation(false);
    h.collector.accept(message("retry")).await.unwrap();
    tokio::time::advance(Duration::from_secs(7)).await;
    h.monitor.tick().await.unwrap();
    assert_eq!(h.channel.sent_count().await, 1);
}

/// The assembled engine moves events from the channel to the cache and out
/// through the persona, end to end.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn engine_end_to_end_flow() {
    // Real listener so the TCP connectivity probe succeeds.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let probe_addr = listener.local_addr().unwrap().to_string();

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        CacheStore::open(dir.path().join("cache.json"))
            .await
            .unwrap(),
    );
    let channel = Arc::new(MockChannel::new());
    let persona = Arc::new(MockPersona::new());
    persona.set_reply("engine says hi");

    let mut config = BridgeConfig::default();
    config.discord.watch_channels = vec![WATCHED.0];
    config.batching.batch_threshold = 2;
    config.batching.poll_interval_secs = 1;
    config.runtime.probe_addr = probe_addr;

    let engine = Arc::new(
        Engine::new(channel.clone(), persona.clone(), store.clone(), &config, BOT).unwrap(),
    );

    let cancel = CancellationToken::new();
    let run = {
        let engine = engine.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { engine.run(cancel).await })
    };

    channel
        .inject_event(ChatEvent::Message(message("first")))
        .await;
    channel
        .inject_event(ChatEvent::Message(message("second")))
        .await;

    // Two pending entries hit the batch threshold on the next monitor tick.
    tokio::time::timeout(Duration::from_secs(10), async {
        while channel.sent_count().await == 0 {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await
    .expect("engine should dispatch within the timeout");

    let sent = channel.sent_messages().await;
    assert_eq!(sent[0], (WATCHED, "engine says hi".to_string()));
    assert_eq!(store.len().await, 0);

    cancel.cancel();
    run.await.unwrap().unwrap();
}
