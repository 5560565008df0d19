//! Freight Types
//!
//! Shared models and traits for the freight quoting service.
//! This crate contains all domain models organized by business entity.

pub mod events;
pub mod identity;
pub mod pricing;
pub mod prospects;
pub mod quotes;
pub mod records;
pub mod storage;
pub mod tokens;

// Re-export chrono, rust_decimal and serde_json for convenience
pub use chrono;
pub use rust_decimal;
pub use serde_json;

pub use events::{DomainEvent, EventName};

pub use identity::{ContactIdentity, ContactSnapshot};

pub use pricing::{
	CargoType, CostBreakdown, CountryDistance, DeliveryWindow, Dimensions, DistanceSource,
	EstimateResult, InvalidShipmentError, ModeEvaluation, Package, PackagePrice,
	PackagePriceSource, PricingBasis, PricingConfig, PricingConfigError, Priority, RouteInfo,
	ShipmentInput, TransportMode,
};

pub use prospects::{Prospect, ProspectRequest, ProspectStatus};

pub use quotes::{
	Actor, GuardViolation, InvalidTransitionError, NewQuote, Quote, QuoteSnapshot, QuoteStatus,
	TransitionAction, TransitionPayload, TransitionRecord,
};

pub use records::{Pickup, Purchase, RecordKind, RecordRef};

pub use storage::{
	PickupStorageTrait, PricingConfigStorageTrait, ProspectStorageTrait, PurchaseStorageTrait,
	QuoteStorageTrait, StorageError, StorageResult, StorageStats, StorageTrait,
};

pub use tokens::{IssuedToken, TokenError, TokenKind, TokenStatus};
