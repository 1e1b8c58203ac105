//! Notifications: payload types and the topic bus.
//!
//! This module groups the notification **data model** and the **bus** that
//! fans a notification out to the listeners of its topic.
//!
//! ## Contents
//! - [`Payload`], [`Notification`] subject/data values and the delivered record
//! - [`Bus`] shared `topic → listeners` table with synchronous broadcast
//! - [`Listener`], [`ListenerFn`] the raw listener contract
//!
//! ## Quick reference
//! - **Publishers**: `Registry::notify`, or host code calling `Bus::broadcast`.
//! - **Consumers**: registry wrappers (isolating user observers) and raw listeners.

mod bus;
mod notification;

pub use bus::{Bus, Listener, ListenerFn, ListenerRef};
pub use notification::{Notification, Payload};
