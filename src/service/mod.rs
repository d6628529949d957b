// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for Group Buying
//!
//! This module provides the application service layer that orchestrates
//! the pure opportunity aggregate, the store and the notification sink.
//!
//! # Architecture
//!
//! ```text
//! Client Request (NATS request-reply, HTTP handler, ...)
//!     ↓
//! Service Layer (this module)
//!     ↓
//! Command Handler → Opportunity Aggregate → Events
//!     ↓
//! Store commit (opportunity + counter + participation records)
//!     ↓
//! Notification Sink (threshold reached)
//! ```
//!
//! # Design Principles
//!
//! 1. **Transaction Boundaries**: one compare-and-set commit per decision
//! 2. **Pure Domain Logic**: services call pure functions
//! 3. **Injected Collaborators**: store, catalog, sink and clock are traits
//! 4. **Async by Default**: all I/O is asynchronous
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use group_buy_engine::config::EngineConfig;
//! use group_buy_engine::domain::{Product, ProductId, UserId};
//! use group_buy_engine::notification::InMemoryNotificationSink;
//! use group_buy_engine::service::{GroupBuyCoordinator, GroupBuyService};
//! use group_buy_engine::store::InMemoryStore;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(InMemoryStore::new());
//! store.upsert_product(Product::with_group_buying("p-1", "Tote Bag")).await;
//!
//! let service = GroupBuyCoordinator::new(
//!     store.clone(),
//!     store.clone(),
//!     store.clone(),
//!     Arc::new(InMemoryNotificationSink::new()),
//!     &EngineConfig::default(),
//! );
//!
//! let opportunity = service
//!     .create_or_join(&ProductId::new("p-1"), &UserId::new("alice"))
//!     .await
//!     .unwrap();
//! assert_eq!(opportunity.participant_count(), 1);
//! # });
//! ```

pub mod group_buy;
pub mod intake;

pub use group_buy::{
    GroupBuyCoordinator, GroupBuyService, NotFoundKind, ServiceError, ServiceResult, SweepFailure,
    SweepReport,
};
pub use intake::{
    ActiveForProductQuery, CreateOrJoinHandler, CreateOrJoinRequest, ForUserQuery,
    GetActiveForProductHandler, GetForUserHandler, JoinHandler, JoinRequest, ServiceReply,
};
