//! Canonical structured event names used across `pulsar-binder`.

// Registration events.
pub const BINDING_REGISTERED: &str = "binding_registered";
pub const BINDING_RENAMED: &str = "binding_renamed";

// Activation lifecycle events.
pub const CONSUMER_SUBSCRIBE_START: &str = "consumer_subscribe_start";
pub const CONSUMER_SUBSCRIBED: &str = "consumer_subscribed";
pub const CONSUMER_SUBSCRIBE_FAILED: &str = "consumer_subscribe_failed";
pub const CONSUMER_CLOSE_FAILED: &str = "consumer_close_failed";

// Producer registry events.
pub const PRODUCER_CREATED: &str = "producer_created";
pub const PRODUCER_ADOPTED: &str = "producer_adopted";
pub const PRODUCER_REPLACED: &str = "producer_replaced";
pub const PRODUCER_CLOSE_FAILED: &str = "producer_close_failed";

// Dispatch pipeline events.
pub const DISPATCH_FAILED: &str = "dispatch_failed";
pub const DISPATCH_ACK_FAILED: &str = "dispatch_ack_failed";
pub const DISPATCH_NACK_FAILED: &str = "dispatch_nack_failed";
