/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! End-to-end binder tests against the in-memory client.

use async_trait::async_trait;
use memory_client::MemoryClient;
use pulsar_binder::{
    ActivationState, Binder, BinderConfig, BinderError, ClientError, ClientProducer, ConsumerSpec,
    DeadLetterSpec, Handler, MapResolver, MessageId, MessagingClient, OutboundMessage, Payload,
    ProducerSpec, Schema,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const ORDERS: &str = "persistent://public/default/orders";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn binder_over(client: &MemoryClient) -> Binder {
    let client: Arc<dyn MessagingClient> = Arc::new(client.clone());
    Binder::new(client, BinderConfig::default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    id: u64,
    item: String,
}

#[tokio::test]
async fn text_message_reaches_handler_and_is_acked() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let name = binder.handlers().register_consumer(
        ConsumerSpec::new("orders"),
        Schema::text(),
        Handler::payload_only(move |text: String| {
            let sink = sink.clone();
            async move {
                sink.lock().expect("lock").push(text);
                Ok(())
            }
        }),
    );
    binder.activate_all().await.expect("activation");
    assert_eq!(
        binder.activation_state(&name).await,
        Some(ActivationState::Subscribed)
    );

    binder
        .producers()
        .register(ProducerSpec::new("orders"))
        .await
        .expect("producer");
    binder.template().send("orders", "hello").await.expect("send");

    assert_eq!(*received.lock().expect("lock"), vec!["hello".to_string()]);
    assert_eq!(client.acked(ORDERS).await.len(), 1);
    assert!(client.nacked(ORDERS).await.is_empty());
}

#[tokio::test]
async fn json_payloads_decode_into_declared_type() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    binder.handlers().register_consumer(
        ConsumerSpec::new("orders"),
        Schema::<Order>::json(),
        Handler::payload_only(move |order: Order| {
            let sink = sink.clone();
            async move {
                sink.lock().expect("lock").push(order);
                Ok(())
            }
        }),
    );
    binder.activate_all().await.expect("activation");

    binder
        .producers()
        .register(ProducerSpec::new("orders"))
        .await
        .expect("producer");
    let order = Order {
        id: 7,
        item: "widget".to_string(),
    };
    binder
        .template()
        .send("orders", Payload::json(&order).expect("encode"))
        .await
        .expect("send");

    assert_eq!(*received.lock().expect("lock"), vec![order]);
}

#[tokio::test]
async fn handler_failure_nacks_without_breaking_the_subscription() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    binder.handlers().register_consumer(
        ConsumerSpec::new("orders"),
        Schema::text(),
        Handler::payload_only(move |text: String| {
            let sink = sink.clone();
            async move {
                if text == "poison" {
                    return Err("unprocessable".into());
                }
                sink.lock().expect("lock").push(text);
                Ok(())
            }
        }),
    );
    binder.activate_all().await.expect("activation");
    binder
        .producers()
        .register(ProducerSpec::new("orders"))
        .await
        .expect("producer");
    let template = binder.template();

    template.send("orders", "poison").await.expect("send");
    template.send("orders", "fine").await.expect("send");

    assert_eq!(*received.lock().expect("lock"), vec!["fine".to_string()]);
    assert_eq!(client.nacked(ORDERS).await.len(), 1);
    assert_eq!(client.acked(ORDERS).await.len(), 1);
}

#[tokio::test]
async fn reregistering_a_topic_closes_the_old_producer_first() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    binder
        .producers()
        .register(ProducerSpec::new("orders").producer_name("first"))
        .await
        .expect("first producer");
    let old = binder
        .producers()
        .get(None, None, "orders")
        .await
        .expect("first handle");

    binder
        .producers()
        .register(ProducerSpec::new("orders").producer_name("second"))
        .await
        .expect("second producer");

    // The displaced handle is unusable; the registry serves the replacement.
    assert!(old.send(OutboundMessage::new(b"late".to_vec())).await.is_err());
    let current = binder
        .producers()
        .get(None, None, "orders")
        .await
        .expect("second handle");
    assert_eq!(current.name(), "second");
    binder.template().send("orders", "ok").await.expect("send");
    assert_eq!(client.sent(ORDERS).await.len(), 1);
}

#[tokio::test]
async fn close_failure_during_replacement_is_fatal() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    binder
        .producers()
        .register(ProducerSpec::new("orders"))
        .await
        .expect("first producer");
    client.fail_close_on(ORDERS);

    let error = binder
        .producers()
        .register(ProducerSpec::new("orders"))
        .await
        .expect_err("replacement must fail");
    assert!(matches!(error, BinderError::CloseFailed { .. }));
}

#[tokio::test]
async fn failed_replacement_keeps_the_old_producer_serving() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    binder
        .producers()
        .register(ProducerSpec::new("orders").producer_name("first"))
        .await
        .expect("first producer");
    client.fail_close_on(ORDERS);

    binder
        .producers()
        .register(ProducerSpec::new("orders").producer_name("second"))
        .await
        .expect_err("replacement must fail");

    // The topic is not stranded: the old handle stays registered and usable.
    let current = binder
        .producers()
        .get(None, None, "orders")
        .await
        .expect("old producer still registered");
    assert_eq!(current.name(), "first");
    binder.template().send("orders", "still works").await.expect("send");
    assert_eq!(client.sent(ORDERS).await.len(), 1);
}

#[tokio::test]
async fn adopted_producer_is_served_under_its_own_topic() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    let external = client
        .create_producer(pulsar_binder::ProducerOptions {
            topic: ORDERS.to_string(),
            producer_name: "external".to_string(),
            send_timeout: None,
            block_if_queue_full: false,
            batching: Default::default(),
        })
        .await
        .expect("external producer");

    let topic = binder.producers().adopt(external).await.expect("adopt");
    assert_eq!(topic, ORDERS);
    binder.template().send("orders", "hi").await.expect("send");
    assert_eq!(client.sent(ORDERS).await.len(), 1);
}

#[tokio::test]
async fn batch_send_checked_returns_one_id_per_payload() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    binder
        .producers()
        .register(ProducerSpec::new("orders"))
        .await
        .expect("producer");

    let ids = binder
        .template()
        .batch_send_checked(
            "orders",
            vec!["a".into(), "b".into(), Payload::Bytes(vec![1, 2, 3])],
        )
        .await
        .expect("batch");

    assert_eq!(ids.len(), 3);
    assert_eq!(client.sent(ORDERS).await.len(), 3);
}

/// Rejects `"bad"` payloads immediately; everything else completes after a
/// short delay and bumps the counter.
struct HalfFailingProducer {
    completed: Arc<AtomicUsize>,
}

#[async_trait]
impl ClientProducer for HalfFailingProducer {
    fn topic(&self) -> &str {
        ORDERS
    }

    fn name(&self) -> &str {
        "half-failing"
    }

    async fn send(&self, message: OutboundMessage) -> Result<MessageId, ClientError> {
        if message.payload == b"bad" {
            return Err(ClientError::new("broker rejected message"));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        let n = self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(MessageId::new(format!("ok-{n}")))
    }

    async fn close(&self) -> Result<(), ClientError> {
        Ok(())
    }
}

#[tokio::test]
async fn checked_batch_failure_still_completes_sibling_sends() {
    init_tracing();
    let binder = binder_over(&MemoryClient::new());

    let completed = Arc::new(AtomicUsize::new(0));
    binder
        .producers()
        .adopt(Arc::new(HalfFailingProducer {
            completed: completed.clone(),
        }))
        .await
        .expect("adopt");

    let error = binder
        .template()
        .batch_send_checked("orders", vec!["slow".into(), "bad".into(), "slow".into()])
        .await
        .expect_err("one send fails");

    assert!(matches!(error, BinderError::Client(_)));
    // The failure surfaces only after the slow siblings have finished.
    assert_eq!(completed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn detached_sends_resolve_through_join_handles() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    binder
        .producers()
        .register(ProducerSpec::new("orders"))
        .await
        .expect("producer");
    let template = binder.template();

    let handle = template.send_detached("orders", "later");
    handle.await.expect("join").expect("send");

    let handles = template.batch_send("orders", vec!["x".into(), "y".into()]);
    for handle in handles {
        handle.await.expect("join").expect("send");
    }
    assert_eq!(client.sent(ORDERS).await.len(), 3);
}

#[tokio::test]
async fn send_to_unregistered_topic_is_rejected() {
    init_tracing();
    let binder = binder_over(&MemoryClient::new());

    let error = binder
        .template()
        .send("orders", "nope")
        .await
        .expect_err("no producer registered");

    match error {
        BinderError::NoSuchTopic { topic } => assert_eq!(topic, ORDERS),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn delayed_and_scheduled_sends_carry_their_schedule() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    binder
        .producers()
        .register(ProducerSpec::new("orders"))
        .await
        .expect("producer");
    let template = binder.template();

    template
        .send_delayed("orders", "later", Duration::from_secs(5))
        .await
        .expect("delayed send");
    let at = std::time::SystemTime::now() + Duration::from_secs(60);
    template.send_at("orders", "much later", at).await.expect("scheduled send");

    let sent = client.sent(ORDERS).await;
    assert_eq!(sent[0].deliver_after, Some(Duration::from_secs(5)));
    assert_eq!(sent[1].deliver_at, Some(at));
}

#[tokio::test]
async fn empty_topic_expression_fails_activation() {
    init_tracing();
    let client: Arc<dyn MessagingClient> = Arc::new(MemoryClient::new());
    let binder = Binder::with_placeholders(
        client,
        BinderConfig::default(),
        Arc::new(MapResolver::default()),
    );

    let name = binder.handlers().register_consumer(
        ConsumerSpec::new("${missing.topic}"),
        Schema::text(),
        Handler::payload_only(|_text: String| async { Ok(()) }),
    );

    let error = binder.activate_all().await.expect_err("empty topic");
    match error {
        BinderError::EmptyTopic { consumer } => assert_eq!(consumer, name),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        binder.activation_state(&name).await,
        Some(ActivationState::Failed)
    );
}

#[tokio::test]
async fn rejected_subscription_surfaces_as_init_failure() {
    init_tracing();
    let client = MemoryClient::new();
    client.reject_subscribe_on(ORDERS);
    let binder = binder_over(&client);

    let name = binder.handlers().register_consumer(
        ConsumerSpec::new("orders"),
        Schema::text(),
        Handler::payload_only(|_text: String| async { Ok(()) }),
    );

    let error = binder.activate_all().await.expect_err("rejected");
    assert!(matches!(
        error,
        BinderError::InitFailed {
            role: "consumer",
            ..
        }
    ));
    assert_eq!(
        binder.activation_state(&name).await,
        Some(ActivationState::Failed)
    );
}

#[tokio::test]
async fn untouched_dead_letter_spec_synthesizes_both_topics() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    binder.handlers().register_consumer(
        ConsumerSpec::new("orders"),
        Schema::text(),
        Handler::payload_only(|_text: String| async { Ok(()) }),
    );
    binder.activate_all().await.expect("activation");

    let subscriptions = client.subscriptions(ORDERS).await;
    assert_eq!(subscriptions.len(), 1);
    let options = &subscriptions[0];
    assert_eq!(options.subscription_name, "subscription_orders");
    let policy = options.dead_letter.clone().expect("policy");
    assert_eq!(policy.max_redeliver_count, Some(16));
    assert_eq!(
        policy.retry_topic.as_deref(),
        Some("persistent://public/default/subscription_orders-retry")
    );
    assert_eq!(
        policy.dead_letter_topic.as_deref(),
        Some("persistent://public/default/subscription_orders-dlq")
    );
}

#[tokio::test]
async fn explicit_dead_letter_spec_passes_through_verbatim() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    binder.handlers().register_consumer(
        ConsumerSpec::new("orders").dead_letter(
            DeadLetterSpec::default()
                .max_redeliver_count(3)
                .dead_letter_topic("persistent://public/default/orders-failed"),
        ),
        Schema::text(),
        Handler::payload_only(|_text: String| async { Ok(()) }),
    );
    binder.activate_all().await.expect("activation");

    let subscriptions = client.subscriptions(ORDERS).await;
    let policy = subscriptions[0].dead_letter.clone().expect("policy");
    assert_eq!(policy.max_redeliver_count, Some(3));
    assert_eq!(policy.retry_topic, None);
    assert_eq!(
        policy.dead_letter_topic.as_deref(),
        Some("persistent://public/default/orders-failed")
    );
}

#[tokio::test]
async fn disabling_retry_skips_dead_letter_derivation() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    binder.handlers().register_consumer(
        ConsumerSpec::new("orders").retry_enabled(false),
        Schema::text(),
        Handler::payload_only(|_text: String| async { Ok(()) }),
    );
    binder.activate_all().await.expect("activation");

    let subscriptions = client.subscriptions(ORDERS).await;
    assert!(!subscriptions[0].retry_enabled);
    assert!(subscriptions[0].dead_letter.is_none());
}

#[tokio::test]
async fn colliding_names_still_activate_both_bindings() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    for _ in 0..2 {
        binder.handlers().register_consumer(
            ConsumerSpec::new("orders"),
            Schema::text(),
            Handler::payload_only(|_text: String| async { Ok(()) }),
        );
    }
    binder.activate_all().await.expect("activation");

    assert_eq!(binder.handlers().len(), 2);
    assert_eq!(client.subscription_count(ORDERS).await, 2);
}

#[tokio::test]
async fn disabled_binder_skips_activation() {
    init_tracing();
    let client = MemoryClient::new();
    let config = BinderConfig::from_json5_str("{ enabled: false }").expect("config");
    let messaging: Arc<dyn MessagingClient> = Arc::new(client.clone());
    let binder = Binder::with_placeholders(
        messaging,
        config,
        Arc::new(pulsar_binder::NoopResolver),
    );

    let name = binder.handlers().register_consumer(
        ConsumerSpec::new("orders"),
        Schema::text(),
        Handler::payload_only(|_text: String| async { Ok(()) }),
    );
    binder.activate_all().await.expect("no-op activation");

    assert_eq!(client.subscription_count(ORDERS).await, 0);
    assert_eq!(binder.activation_state(&name).await, None);
}

#[tokio::test]
async fn shutdown_closes_producers_and_consumers() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    binder.handlers().register_consumer(
        ConsumerSpec::new("orders"),
        Schema::text(),
        Handler::payload_only(|_text: String| async { Ok(()) }),
    );
    binder.activate_all().await.expect("activation");
    binder
        .producers()
        .register(ProducerSpec::new("orders"))
        .await
        .expect("producer");

    binder.shutdown().await.expect("shutdown");

    assert!(binder.producers().topics().await.is_empty());
    // A closed consumer no longer receives deliveries.
    let external = client
        .create_producer(pulsar_binder::ProducerOptions {
            topic: ORDERS.to_string(),
            producer_name: "post-shutdown".to_string(),
            send_timeout: None,
            block_if_queue_full: false,
            batching: Default::default(),
        })
        .await
        .expect("producer");
    external
        .send(OutboundMessage::new(b"late".to_vec()))
        .await
        .expect("send");
    assert!(client.acked(ORDERS).await.is_empty());
}

#[tokio::test]
async fn tenant_and_namespace_overrides_route_to_distinct_producers() {
    init_tracing();
    let client = MemoryClient::new();
    let binder = binder_over(&client);

    binder
        .producers()
        .register(ProducerSpec::new("orders").tenant("acme").namespace("billing"))
        .await
        .expect("producer");

    binder
        .template()
        .send(
            pulsar_binder::TopicInfo::new("orders")
                .tenant("acme")
                .namespace("billing"),
            "hi",
        )
        .await
        .expect("send");

    assert_eq!(
        client.sent("persistent://acme/billing/orders").await.len(),
        1
    );
    // The default-namespace address stays unknown.
    assert!(matches!(
        binder.template().send("orders", "hi").await,
        Err(BinderError::NoSuchTopic { .. })
    ));
}
