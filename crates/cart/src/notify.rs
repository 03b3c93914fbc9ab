//! User-facing failure notifications.
//!
//! Every rejected cart operation produces exactly one [`Notification`],
//! delivered to a [`NotificationSink`]. The sink decides how it is shown;
//! the manager only decides what went wrong.

use std::fmt;

use rocket_cart_core::ProductId;
use tokio::sync::mpsc;

/// Cart operations that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove,
    UpdateAmount,
}

impl Operation {
    /// Generic failure category for this operation.
    #[must_use]
    pub const fn failure_kind(self) -> NotificationKind {
        match self {
            Self::Add => NotificationKind::AddFailed,
            Self::Remove => NotificationKind::RemoveFailed,
            Self::UpdateAmount => NotificationKind::UpdateFailed,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::UpdateAmount => "update_amount",
        })
    }
}

/// Notification categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Requested quantity is above stock or below one.
    StockExceeded,
    AddFailed,
    RemoveFailed,
    UpdateFailed,
}

impl NotificationKind {
    /// Human-readable message shown for this category.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StockExceeded => "Requested quantity is out of stock",
            Self::AddFailed => "Failed to add product",
            Self::RemoveFailed => "Failed to remove product",
            Self::UpdateFailed => "Failed to update product quantity",
        }
    }
}

/// A failure report for one cart operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub operation: Operation,
    pub product_id: ProductId,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn new(kind: NotificationKind, operation: Operation, product_id: ProductId) -> Self {
        Self {
            kind,
            operation,
            product_id,
            message: kind.message().to_string(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (product {})", self.message, self.product_id)
    }
}

/// One-way channel for notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Reports notifications as `warn` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        tracing::warn!(
            kind = ?notification.kind,
            operation = %notification.operation,
            product_id = %notification.product_id,
            "{}",
            notification.message
        );
    }
}

impl NotificationSink for mpsc::UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        if self.send(notification).is_err() {
            tracing::debug!("Notification receiver dropped");
        }
    }
}
