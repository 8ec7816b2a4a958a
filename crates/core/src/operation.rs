// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Operations recorded on a device and replayed against the server.
//!
//! The set of operation kinds is closed. Each kind has a typed payload; the
//! queue stores payloads as plain JSON so the file format stays stable, and
//! every consumer re-parses through [`Payload::parse`].

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::hlc::Hlc;

/// Bytes escaped in a path segment: everything but RFC 3986 unreserved.
const PATH_SEGMENT: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Device-local identifier of a queued operation.
pub type OpId = Hlc;

/// The closed set of operations a device can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateDelivery,
    CreateSale,
    UpdateRoute,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] =
        [OperationKind::CreateDelivery, OperationKind::CreateSale, OperationKind::UpdateRoute];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::CreateDelivery => "create_delivery",
            OperationKind::CreateSale => "create_sale",
            OperationKind::UpdateRoute => "update_route",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    /// Wire names are matched exactly; `Create_Delivery` is unknown.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create_delivery" => Ok(OperationKind::CreateDelivery),
            "create_sale" => Ok(OperationKind::CreateSale),
            "update_route" => Ok(OperationKind::UpdateRoute),
            _ => Err(Error::UnknownOperation(s.to_string())),
        }
    }
}

/// An operation waiting in the device queue.
///
/// Never mutated after creation; removed only once the server acknowledges it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub id: OpId,
    pub operation: OperationKind,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

impl PendingOperation {
    pub fn new(id: OpId, payload: &Payload, created_at: DateTime<Utc>) -> Result<Self> {
        Ok(PendingOperation {
            id,
            operation: payload.kind(),
            data: payload.to_value()?,
            created_at,
        })
    }

    /// Re-parses the stored data into its typed payload.
    pub fn payload(&self) -> Result<Payload> {
        Payload::parse(self.operation, &self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefrigeratorStatus {
    pub status: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningData {
    #[serde(default)]
    pub performed: bool,
    #[serde(default)]
    pub notes: String,
}

/// A delivery stop: recorded as a delivery row plus its matching sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    pub customer_id: String,
    pub worker_username: String,
    pub bags_delivered: i64,
    #[serde(default)]
    pub merma_bags: i64,
    pub total_amount: f64,
    pub refrigerator_status: RefrigeratorStatus,
    #[serde(default)]
    pub cleaning_data: CleaningData,
    #[serde(default)]
    pub evidence_notes: String,
    pub route_id: String,
}

impl DeliveryPayload {
    pub fn from_value(data: &Value) -> Result<Self> {
        parse_as(OperationKind::CreateDelivery, data)
    }

    /// Note attached to the sale row recorded with this delivery.
    pub fn sale_note(&self) -> String {
        format!(
            "fridge:{}|cleaning:{}|notes:{}",
            self.refrigerator_status.notes, self.cleaning_data.notes, self.evidence_notes
        )
    }
}

pub const DEFAULT_UNIT_PRICE: f64 = 15.0;

fn default_unit_price() -> f64 {
    DEFAULT_UNIT_PRICE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalePayload {
    pub customer_id: String,
    pub worker_username: String,
    pub bags_delivered: i64,
    #[serde(default = "default_unit_price")]
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,
}

impl SalePayload {
    pub fn from_value(data: &Value) -> Result<Self> {
        parse_as(OperationKind::CreateSale, data)
    }

    pub fn total(&self) -> f64 {
        self.bags_delivered as f64 * self.unit_price
    }
}

/// Partial route update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteUpdatePayload {
    pub route_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl RouteUpdatePayload {
    pub fn from_value(data: &Value) -> Result<Self> {
        let kind = OperationKind::UpdateRoute;
        let update: RouteUpdatePayload = parse_as(kind, data)?;
        if update.route_id.is_empty() {
            return Err(Error::InvalidPayload {
                kind: kind.to_string(),
                reason: "route_id must not be empty".to_string(),
            });
        }
        Ok(update)
    }

    /// Column/value pairs for the fields that are set, in a fixed order.
    pub fn changes(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", &self.name),
            ("description", &self.description),
            ("assigned_worker_id", &self.assigned_worker_id),
            ("status", &self.status),
        ]
        .into_iter()
        .filter_map(|(col, v)| v.as_deref().map(|v| (col, v)))
        .collect()
    }
}

/// HTTP method of a per-item endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// A typed operation payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Delivery(DeliveryPayload),
    Sale(SalePayload),
    RouteUpdate(RouteUpdatePayload),
}

fn parse_as<T: DeserializeOwned>(kind: OperationKind, data: &Value) -> Result<T> {
    if !data.is_object() {
        return Err(Error::InvalidPayload {
            kind: kind.to_string(),
            reason: "expected a JSON object".to_string(),
        });
    }
    T::deserialize(data)
        .map_err(|e| Error::InvalidPayload { kind: kind.to_string(), reason: e.to_string() })
}

impl Payload {
    /// Validates `data` against the schema for `kind`.
    pub fn parse(kind: OperationKind, data: &Value) -> Result<Self> {
        match kind {
            OperationKind::CreateDelivery => {
                DeliveryPayload::from_value(data).map(Payload::Delivery)
            }
            OperationKind::CreateSale => SalePayload::from_value(data).map(Payload::Sale),
            OperationKind::UpdateRoute => {
                RouteUpdatePayload::from_value(data).map(Payload::RouteUpdate)
            }
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Payload::Delivery(_) => OperationKind::CreateDelivery,
            Payload::Sale(_) => OperationKind::CreateSale,
            Payload::RouteUpdate(_) => OperationKind::UpdateRoute,
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        let value = match self {
            Payload::Delivery(p) => serde_json::to_value(p)?,
            Payload::Sale(p) => serde_json::to_value(p)?,
            Payload::RouteUpdate(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }

    /// Per-item endpoint this payload is sent to.
    ///
    /// The route id is one escaped path segment, so `?`, `#` or `/` in it
    /// cannot address another resource.
    pub fn endpoint(&self) -> (Method, String) {
        match self {
            Payload::Delivery(_) => (Method::Post, "/deliveries".to_string()),
            Payload::Sale(_) => (Method::Post, "/sales".to_string()),
            Payload::RouteUpdate(p) => {
                let id = utf8_percent_encode(&p.route_id, PATH_SEGMENT);
                (Method::Put, format!("/routes/{id}"))
            }
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
