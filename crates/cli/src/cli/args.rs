// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Argument structs for the recording commands.
//!
//! Each struct maps one-to-one onto a typed operation payload.

use clap::{Args, ValueEnum};
use haul_core::{
    CleaningData, DeliveryPayload, Payload, RefrigeratorStatus, RouteUpdatePayload, SalePayload,
    DEFAULT_UNIT_PRICE,
};

/// Condition of the customer's refrigerator at a delivery stop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum FridgeStatus {
    Excellent,
    #[default]
    Good,
    NeedsCleaning,
    NeedsRepair,
    Damaged,
}

impl FridgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FridgeStatus::Excellent => "excellent",
            FridgeStatus::Good => "good",
            FridgeStatus::NeedsCleaning => "needs_cleaning",
            FridgeStatus::NeedsRepair => "needs_repair",
            FridgeStatus::Damaged => "damaged",
        }
    }
}

/// A delivery stop: bags left, refrigerator check and cleaning.
#[derive(Args, Clone, Debug)]
pub struct DeliveryArgs {
    /// Customer id
    #[arg(long)]
    pub customer: String,

    /// Username of the worker making the delivery
    #[arg(long)]
    pub worker: String,

    /// Route the stop belongs to
    #[arg(long)]
    pub route: String,

    /// Bags delivered
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
    pub bags: i64,

    /// Bags lost or damaged (merma)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..))]
    pub merma: i64,

    /// Amount charged for the delivery
    #[arg(long)]
    pub total: f64,

    /// Refrigerator condition
    #[arg(long, value_enum, default_value_t)]
    pub fridge: FridgeStatus,

    /// Notes on the refrigerator
    #[arg(long, default_value = "")]
    pub fridge_notes: String,

    /// The refrigerator was cleaned at this stop
    #[arg(long)]
    pub cleaned: bool,

    /// Notes on the cleaning
    #[arg(long, default_value = "")]
    pub cleaning_notes: String,

    /// Free-form evidence notes
    #[arg(long, default_value = "")]
    pub notes: String,
}

impl DeliveryArgs {
    pub fn into_payload(self) -> Payload {
        Payload::Delivery(DeliveryPayload {
            customer_id: self.customer,
            worker_username: self.worker,
            bags_delivered: self.bags,
            merma_bags: self.merma,
            total_amount: self.total,
            refrigerator_status: RefrigeratorStatus {
                status: self.fridge.as_str().to_string(),
                notes: self.fridge_notes,
            },
            cleaning_data: CleaningData { performed: self.cleaned, notes: self.cleaning_notes },
            evidence_notes: self.notes,
            route_id: self.route,
        })
    }
}

/// A sale without a delivery record.
#[derive(Args, Clone, Debug)]
pub struct SaleArgs {
    /// Customer id
    #[arg(long)]
    pub customer: String,

    /// Username of the worker making the sale
    #[arg(long)]
    pub worker: String,

    /// Bags sold
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
    pub bags: i64,

    /// Price per bag
    #[arg(long, default_value_t = DEFAULT_UNIT_PRICE)]
    pub unit_price: f64,

    /// Route the sale belongs to
    #[arg(long)]
    pub route: Option<String>,
}

impl SaleArgs {
    pub fn into_payload(self) -> Payload {
        Payload::Sale(SalePayload {
            customer_id: self.customer,
            worker_username: self.worker,
            bags_delivered: self.bags,
            unit_price: self.unit_price,
            route_id: self.route,
        })
    }
}

/// A partial route update; only the given fields change.
#[derive(Args, Clone, Debug)]
pub struct RouteArgs {
    /// Route id
    pub route_id: String,

    /// New route name
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// Worker id to assign the route to
    #[arg(long = "assign", value_name = "WORKER_ID")]
    pub assigned_worker_id: Option<String>,

    /// New status
    #[arg(long)]
    pub status: Option<String>,
}

impl RouteArgs {
    pub fn into_payload(self) -> Payload {
        Payload::RouteUpdate(RouteUpdatePayload {
            route_id: self.route_id,
            name: self.name,
            description: self.description,
            assigned_worker_id: self.assigned_worker_id,
            status: self.status,
        })
    }
}
