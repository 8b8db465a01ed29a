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

//! Outbound send surface over the producer registry.
//!
//! Every send addresses a topic reference; the template resolves it and
//! requires a registered producer. It never creates producers on the fly.

use crate::client::{ClientProducer, MessageId, OutboundMessage};
use crate::control_plane::ProducerRegistry;
use crate::error::BinderError;
use crate::routing::TopicInfo;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;

/// An encoded outbound payload.
///
/// Text payloads go on the wire as raw UTF-8; everything else is JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    /// JSON-encodes any serializable value.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, BinderError> {
        Ok(Payload::Bytes(serde_json::to_vec(value)?))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.into_bytes(),
            Payload::Bytes(bytes) => bytes,
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

/// High-level send facade; cheap to clone.
#[derive(Clone)]
pub struct MessageTemplate {
    producers: Arc<ProducerRegistry>,
}

impl MessageTemplate {
    pub fn new(producers: Arc<ProducerRegistry>) -> Self {
        Self { producers }
    }

    async fn producer_for(&self, topic: &TopicInfo) -> Result<Arc<dyn ClientProducer>, BinderError> {
        let resolved = self.producers.resolver().resolve(
            topic.tenant.as_deref(),
            topic.namespace.as_deref(),
            &topic.topic,
        );
        self.producers
            .get(topic.tenant.as_deref(), topic.namespace.as_deref(), &topic.topic)
            .await
            .ok_or(BinderError::NoSuchTopic { topic: resolved })
    }

    /// Sends one message and waits for the broker acknowledgment.
    pub async fn send(
        &self,
        topic: impl Into<TopicInfo>,
        payload: impl Into<Payload>,
    ) -> Result<MessageId, BinderError> {
        let topic = topic.into();
        let producer = self.producer_for(&topic).await?;
        Ok(producer
            .send(OutboundMessage::new(payload.into().into_bytes()))
            .await?)
    }

    /// Sends without waiting; the returned handle yields the eventual outcome.
    pub fn send_detached(
        &self,
        topic: impl Into<TopicInfo>,
        payload: impl Into<Payload>,
    ) -> JoinHandle<Result<MessageId, BinderError>> {
        let template = self.clone();
        let topic = topic.into();
        let payload = payload.into();
        tokio::spawn(async move { template.send(topic, payload).await })
    }

    /// Fire-and-forget batch: every payload is sent concurrently to the same
    /// topic, each outcome observable through its own handle.
    pub fn batch_send(
        &self,
        topic: impl Into<TopicInfo>,
        payloads: Vec<Payload>,
    ) -> Vec<JoinHandle<Result<MessageId, BinderError>>> {
        let topic = topic.into();
        payloads
            .into_iter()
            .map(|payload| self.send_detached(topic.clone(), payload))
            .collect()
    }

    /// Checked batch: every send runs to completion before the combined
    /// outcome resolves; the first failure wins once all outcomes are in.
    pub async fn batch_send_checked(
        &self,
        topic: impl Into<TopicInfo>,
        payloads: Vec<Payload>,
    ) -> Result<Vec<MessageId>, BinderError> {
        let topic = topic.into();
        let producer = self.producer_for(&topic).await?;
        let outcomes = join_all(
            payloads
                .into_iter()
                .map(|payload| producer.send(OutboundMessage::new(payload.into_bytes()))),
        )
        .await;
        let mut ids = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            ids.push(outcome?);
        }
        Ok(ids)
    }

    /// Sends a message the broker will hold back for `delay` before delivery.
    pub async fn send_delayed(
        &self,
        topic: impl Into<TopicInfo>,
        payload: impl Into<Payload>,
        delay: Duration,
    ) -> Result<MessageId, BinderError> {
        let topic = topic.into();
        let producer = self.producer_for(&topic).await?;
        Ok(producer
            .send(OutboundMessage::new(payload.into().into_bytes()).deliver_after(delay))
            .await?)
    }

    pub fn send_delayed_detached(
        &self,
        topic: impl Into<TopicInfo>,
        payload: impl Into<Payload>,
        delay: Duration,
    ) -> JoinHandle<Result<MessageId, BinderError>> {
        let template = self.clone();
        let topic = topic.into();
        let payload = payload.into();
        tokio::spawn(async move { template.send_delayed(topic, payload, delay).await })
    }

    /// Sends a message scheduled for delivery at an absolute instant.
    pub async fn send_at(
        &self,
        topic: impl Into<TopicInfo>,
        payload: impl Into<Payload>,
        at: SystemTime,
    ) -> Result<MessageId, BinderError> {
        let topic = topic.into();
        let producer = self.producer_for(&topic).await?;
        Ok(producer
            .send(OutboundMessage::new(payload.into().into_bytes()).deliver_at(at))
            .await?)
    }

    pub fn send_at_detached(
        &self,
        topic: impl Into<TopicInfo>,
        payload: impl Into<Payload>,
        at: SystemTime,
    ) -> JoinHandle<Result<MessageId, BinderError>> {
        let template = self.clone();
        let topic = topic.into();
        let payload = payload.into();
        tokio::spawn(async move { template.send_at(topic, payload, at).await })
    }
}
