// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod carbon_estimate;
mod opportunity_fold;
