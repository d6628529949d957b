// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS request-reply intake for purchase intents and opportunity lookups

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::group_buy::{GroupBuyService, ServiceResult};
use crate::domain::{OpportunityId, ProductId, UserId};
use crate::errors::StoreResult;
use crate::nats::MessageHandler;
use crate::subjects;

/// Reply body sent back to requesters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ServiceReply<T> {
    Ok {
        data: T,
    },
    Error {
        kind: String,
        message: String,
        retryable: bool,
    },
}

impl<T> From<ServiceResult<T>> for ServiceReply<T> {
    fn from(result: ServiceResult<T>) -> Self {
        match result {
            Ok(data) => ServiceReply::Ok { data },
            Err(e) => ServiceReply::Error {
                kind: e.kind().to_string(),
                message: e.to_string(),
                retryable: e.is_retryable(),
            },
        }
    }
}

impl<T: Serialize> ServiceReply<T> {
    pub fn to_json(&self) -> StoreResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Purchase intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrJoinRequest {
    pub product_id: ProductId,
    pub user_id: UserId,
}

/// Answers `groupbuy.commands.create_or_join` requests
pub struct CreateOrJoinHandler<S: ?Sized> {
    service: Arc<S>,
}

impl<S: GroupBuyService + ?Sized> CreateOrJoinHandler<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl<S: GroupBuyService + ?Sized + 'static> MessageHandler for CreateOrJoinHandler<S> {
    type Message = CreateOrJoinRequest;

    async fn handle(&self, request: CreateOrJoinRequest) -> StoreResult<Option<serde_json::Value>> {
        let result = self
            .service
            .create_or_join(&request.product_id, &request.user_id)
            .await;
        ServiceReply::from(result).to_json().map(Some)
    }

    fn subject(&self) -> String {
        subjects::create_or_join_command()
    }
}

/// Join a specific opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub opportunity_id: OpportunityId,
    pub user_id: UserId,
}

/// Answers `groupbuy.commands.join` requests
pub struct JoinHandler<S: ?Sized> {
    service: Arc<S>,
}

impl<S: GroupBuyService + ?Sized> JoinHandler<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl<S: GroupBuyService + ?Sized + 'static> MessageHandler for JoinHandler<S> {
    type Message = JoinRequest;

    async fn handle(&self, request: JoinRequest) -> StoreResult<Option<serde_json::Value>> {
        let result = self
            .service
            .join(request.opportunity_id, &request.user_id)
            .await;
        ServiceReply::from(result).to_json().map(Some)
    }

    fn subject(&self) -> String {
        subjects::join_command()
    }
}

/// Open opportunities of one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveForProductQuery {
    pub product_id: ProductId,
}

/// Answers `groupbuy.commands.get_active_for_product` requests
pub struct GetActiveForProductHandler<S: ?Sized> {
    service: Arc<S>,
}

impl<S: GroupBuyService + ?Sized> GetActiveForProductHandler<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl<S: GroupBuyService + ?Sized + 'static> MessageHandler for GetActiveForProductHandler<S> {
    type Message = ActiveForProductQuery;

    async fn handle(&self, query: ActiveForProductQuery) -> StoreResult<Option<serde_json::Value>> {
        let result = self.service.get_active_for_product(&query.product_id).await;
        ServiceReply::from(result).to_json().map(Some)
    }

    fn subject(&self) -> String {
        subjects::get_active_for_product_query()
    }
}

/// Opportunities one user joined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForUserQuery {
    pub user_id: UserId,
}

/// Answers `groupbuy.commands.get_for_user` requests
pub struct GetForUserHandler<S: ?Sized> {
    service: Arc<S>,
}

impl<S: GroupBuyService + ?Sized> GetForUserHandler<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl<S: GroupBuyService + ?Sized + 'static> MessageHandler for GetForUserHandler<S> {
    type Message = ForUserQuery;

    async fn handle(&self, query: ForUserQuery) -> StoreResult<Option<serde_json::Value>> {
        let result = self.service.get_for_user(&query.user_id).await;
        ServiceReply::from(result).to_json().map(Some)
    }

    fn subject(&self) -> String {
        subjects::get_for_user_query()
    }
}
