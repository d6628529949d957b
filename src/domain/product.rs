// Copyright (c) 2025 - Cowboy AI, Inc.
//! Product Catalog Snapshot
//!
//! The catalog owns products; this crate only reads the group-buying policy
//! fields and writes the denormalized participation counter (see
//! [`crate::store`]). Policy values are copied into an opportunity when it is
//! created, so later catalog edits never reach existing opportunities.

use serde::{Deserialize, Serialize};

use super::ids::ProductId;

/// Group-buying policy and carbon inputs of a catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier
    pub id: ProductId,

    /// Display name (snapshotted into new opportunities)
    pub name: String,

    /// Catalog category
    pub category: String,

    /// Whether group buying may be started for this product
    pub group_buying_enabled: bool,

    /// Participants required for an opportunity to succeed (≥ 2)
    pub threshold: u32,

    /// Discount unlocked on success, in percent
    pub discount_percent: f64,

    /// Product-level carbon saving applied per participant, in percent
    pub carbon_saving_percent: f64,

    /// Days until a new opportunity expires
    pub expiry_days: u32,

    /// Baseline product footprint in kg CO2e; `None` falls back to the
    /// configured default (see [`crate::carbon::CarbonPolicy`])
    pub baseline_carbon_footprint: Option<f64>,

    /// Optional hard cap on participants per opportunity
    pub max_participants: Option<u32>,
}

impl Product {
    /// Product with group buying enabled and the catalog's usual defaults
    /// (threshold 5, 10% discount, 15% carbon saving, 7 day expiry)
    pub fn with_group_buying(id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: "general".to_string(),
            group_buying_enabled: true,
            threshold: 5,
            discount_percent: 10.0,
            carbon_saving_percent: 15.0,
            expiry_days: 7,
            baseline_carbon_footprint: None,
            max_participants: None,
        }
    }

    pub fn threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn discount_percent(mut self, percent: f64) -> Self {
        self.discount_percent = percent;
        self
    }

    pub fn carbon_saving_percent(mut self, percent: f64) -> Self {
        self.carbon_saving_percent = percent;
        self
    }

    pub fn expiry_days(mut self, days: u32) -> Self {
        self.expiry_days = days;
        self
    }

    pub fn baseline_carbon_footprint(mut self, kg: f64) -> Self {
        self.baseline_carbon_footprint = Some(kg);
        self
    }

    pub fn max_participants(mut self, cap: u32) -> Self {
        self.max_participants = Some(cap);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.group_buying_enabled = false;
        self
    }
}
