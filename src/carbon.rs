// Copyright (c) 2025 - Cowboy AI, Inc.
//! Carbon Impact Estimator
//!
//! Pure estimate of the CO2e avoided when `n` shoppers buy a product together
//! instead of separately.
//!
//! ```text
//! shipping  = n × per_shipment − (consolidated_base + (n − 1) × per_additional)
//! packaging = n × per_order_packaging
//! product   = baseline × n × saving_percent / 100
//! total     = shipping + product
//! ```
//!
//! Packaging is reported on its own as materials saved and is not part of
//! `total`.
//!
//! # Baseline fallback policy
//!
//! A product without a usable baseline footprint (missing, zero, negative or
//! not finite) is estimated with [`CarbonPolicy::fallback_baseline_kg`]
//! (10 kg by default). The returned [`CarbonImpact`] records this through
//! [`BaselineSource::Fallback`] so callers can tell an estimate built on the
//! fallback from one built on catalog data.

use serde::{Deserialize, Serialize};

/// Default fallback baseline footprint in kg CO2e
pub const DEFAULT_FALLBACK_BASELINE_KG: f64 = 10.0;

/// Constants of the estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonPolicy {
    /// Footprint of shipping one order on its own (kg)
    pub per_shipment_kg: f64,

    /// Footprint of the first parcel of a consolidated shipment (kg)
    pub consolidated_base_kg: f64,

    /// Extra footprint per additional participant in a consolidated shipment (kg)
    pub per_additional_participant_kg: f64,

    /// Packaging materials of one individual order (kg)
    pub per_order_packaging_kg: f64,

    /// Baseline used when the product has none
    pub fallback_baseline_kg: f64,
}

impl Default for CarbonPolicy {
    fn default() -> Self {
        Self {
            per_shipment_kg: 2.5,
            consolidated_base_kg: 2.5,
            per_additional_participant_kg: 0.5,
            per_order_packaging_kg: 0.2,
            fallback_baseline_kg: DEFAULT_FALLBACK_BASELINE_KG,
        }
    }
}

/// Where the baseline footprint of an estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    /// The product's own catalog value
    Product,
    /// The policy fallback
    Fallback,
}

/// Carbon savings breakdown (kg CO2e)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonImpact {
    pub shipping_saved: f64,
    pub packaging_saved: f64,
    pub product_saved: f64,
    /// `shipping_saved + product_saved`
    pub total: f64,
    pub baseline_source: BaselineSource,
}

impl CarbonImpact {
    fn zero(baseline_source: BaselineSource) -> Self {
        Self {
            shipping_saved: 0.0,
            packaging_saved: 0.0,
            product_saved: 0.0,
            total: 0.0,
            baseline_source,
        }
    }
}

impl CarbonPolicy {
    /// Policy with a different fallback baseline
    pub fn with_fallback_baseline(mut self, kg: f64) -> Self {
        self.fallback_baseline_kg = kg;
        self
    }

    /// Resolve the baseline footprint to use for a product
    pub fn resolve_baseline(&self, product_baseline_kg: Option<f64>) -> (f64, BaselineSource) {
        match product_baseline_kg {
            Some(kg) if kg.is_finite() && kg > 0.0 => (kg, BaselineSource::Product),
            _ => (self.fallback_baseline_kg, BaselineSource::Fallback),
        }
    }

    /// Estimate savings for `participant_count` shoppers
    ///
    /// Never fails. Zero participants save nothing.
    pub fn estimate(
        &self,
        product_baseline_kg: Option<f64>,
        participant_count: u32,
        carbon_saving_percent: f64,
    ) -> CarbonImpact {
        let (baseline, baseline_source) = self.resolve_baseline(product_baseline_kg);
        if participant_count == 0 {
            return CarbonImpact::zero(baseline_source);
        }

        let n = f64::from(participant_count);
        let individual = n * self.per_shipment_kg;
        let consolidated =
            self.consolidated_base_kg + (n - 1.0) * self.per_additional_participant_kg;
        let shipping_saved = individual - consolidated;
        let packaging_saved = n * self.per_order_packaging_kg;
        let product_saved = baseline * n * carbon_saving_percent / 100.0;

        CarbonImpact {
            shipping_saved,
            packaging_saved,
            product_saved,
            total: shipping_saved + product_saved,
            baseline_source,
        }
    }
}

/// Estimate with the default [`CarbonPolicy`]
pub fn estimate(
    product_baseline_kg: Option<f64>,
    participant_count: u32,
    carbon_saving_percent: f64,
) -> CarbonImpact {
    CarbonPolicy::default().estimate(product_baseline_kg, participant_count, carbon_saving_percent)
}
