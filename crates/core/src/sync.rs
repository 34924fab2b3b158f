//! Reconciliation channel from the Cart view back to the Listing view.
//!
//! The Listing view owns the canonical cart; the Cart view works on a copy.
//! Every mutation the Cart view makes is described by a typed
//! [`CartChanged`] event carrying the full resulting cart. The listing drains
//! these and replaces its own copy wholesale.
//!
//! Which mutations are published is a [`SyncPolicy`] decision. With
//! [`SyncPolicy::RemovalsOnly`] quantity changes and checkout clearing stay
//! local to the Cart view, so the listing's copy can go stale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::cart::CartLineItem;
use crate::types::ProductId;

/// What happened to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeReason {
    /// An item was removed.
    Removed { id: ProductId },
    /// An item's quantity changed.
    QuantityAdjusted { id: ProductId, quantity: u32 },
    /// Checkout emptied the cart.
    Cleared,
}

/// A "cart changed" event: the reason plus the full cart afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartChanged {
    pub reason: ChangeReason,
    pub items: Vec<CartLineItem>,
}

/// Which cart mutations reach the Listing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPolicy {
    /// Every mutation is published; both views agree after each action.
    #[default]
    Full,
    /// Only removals are published.
    RemovalsOnly,
}

impl SyncPolicy {
    /// Whether a change of this kind is published under this policy.
    #[must_use]
    pub const fn publishes(&self, reason: &ChangeReason) -> bool {
        match self {
            Self::Full => true,
            Self::RemovalsOnly => matches!(reason, ChangeReason::Removed { .. }),
        }
    }
}

impl fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::RemovalsOnly => write!(f, "removals-only"),
        }
    }
}

impl FromStr for SyncPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "removals-only" => Ok(Self::RemovalsOnly),
            _ => Err(format!("invalid sync policy: {s} (expected full or removals-only)")),
        }
    }
}

/// Sending half of the channel, handed to the Cart view.
#[derive(Debug, Clone)]
pub struct CartSyncBridge {
    sender: mpsc::UnboundedSender<CartChanged>,
    policy: SyncPolicy,
}

impl CartSyncBridge {
    /// Create a connected bridge and subscription.
    #[must_use]
    pub fn channel(policy: SyncPolicy) -> (Self, CartSubscription) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, policy }, CartSubscription { receiver })
    }

    /// The policy this bridge applies.
    #[must_use]
    pub const fn policy(&self) -> SyncPolicy {
        self.policy
    }

    /// Publish a change with the cart as it is now.
    ///
    /// Returns `true` if the event was delivered. Changes filtered out by the
    /// policy and changes nobody is listening for are dropped silently.
    pub fn publish(&self, reason: ChangeReason, items: &[CartLineItem]) -> bool {
        if !self.policy.publishes(&reason) {
            debug!(?reason, policy = %self.policy, "Cart change not propagated");
            return false;
        }

        let event = CartChanged {
            reason,
            items: items.to_vec(),
        };
        if self.sender.send(event).is_err() {
            debug!("Listing view gone, cart change dropped");
            return false;
        }
        true
    }
}

/// Receiving half of the channel, held by the Listing view.
#[derive(Debug)]
pub struct CartSubscription {
    receiver: mpsc::UnboundedReceiver<CartChanged>,
}

impl CartSubscription {
    /// Take the next pending event without waiting.
    pub fn try_next(&mut self) -> Option<CartChanged> {
        self.receiver.try_recv().ok()
    }

    /// Drain every pending event, returning the last one and the count.
    pub fn drain_latest(&mut self) -> (Option<CartChanged>, usize) {
        let mut latest = None;
        let mut count = 0;
        while let Some(event) = self.try_next() {
            latest = Some(event);
            count += 1;
        }
        (latest, count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::ListingItem;

    fn item(id: &str) -> CartLineItem {
        CartLineItem::from_listing(&ListingItem {
            id: ProductId::new(id),
            name: id.to_owned(),
            price: "$1.00".to_owned(),
            image: String::new(),
            quantity: None,
        })
        .unwrap()
    }

    #[test]
    fn test_full_policy_publishes_everything() {
        let (bridge, mut subscription) = CartSyncBridge::channel(SyncPolicy::Full);
        let items = vec![item("a")];

        assert!(bridge.publish(
            ChangeReason::QuantityAdjusted {
                id: ProductId::new("a"),
                quantity: 2
            },
            &items
        ));
        assert!(bridge.publish(ChangeReason::Cleared, &[]));

        let (latest, count) = subscription.drain_latest();
        assert_eq!(count, 2);
        let latest = latest.unwrap();
        assert_eq!(latest.reason, ChangeReason::Cleared);
        assert!(latest.items.is_empty());
    }

    #[test]
    fn test_removals_only_policy_filters() {
        let (bridge, mut subscription) = CartSyncBridge::channel(SyncPolicy::RemovalsOnly);
        let items = vec![item("a")];

        assert!(!bridge.publish(
            ChangeReason::QuantityAdjusted {
                id: ProductId::new("a"),
                quantity: 2
            },
            &items
        ));
        assert!(!bridge.publish(ChangeReason::Cleared, &[]));
        assert!(subscription.try_next().is_none());

        assert!(bridge.publish(
            ChangeReason::Removed {
                id: ProductId::new("b")
            },
            &items
        ));
        let event = subscription.try_next().unwrap();
        assert_eq!(event.items, items);
    }

    #[test]
    fn test_publish_without_listener_is_noop() {
        let (bridge, subscription) = CartSyncBridge::channel(SyncPolicy::Full);
        drop(subscription);
        assert!(!bridge.publish(ChangeReason::Cleared, &[]));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("full".parse::<SyncPolicy>(), Ok(SyncPolicy::Full));
        assert_eq!(
            "removals-only".parse::<SyncPolicy>(),
            Ok(SyncPolicy::RemovalsOnly)
        );
        assert!("partial".parse::<SyncPolicy>().is_err());
        assert_eq!(SyncPolicy::RemovalsOnly.to_string(), "removals-only");
    }
}
