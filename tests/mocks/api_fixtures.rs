//! JSON request bodies used across the end-to-end tests

use serde_json::{json, Value};

pub struct ApiFixtures;

#[allow(dead_code)]
impl ApiFixtures {
	/// 500 kg of general cargo by road, priced at 500 EUR with the default configuration
	pub fn road_shipment() -> Value {
		json!({
			"originCountry": "FR",
			"destinationCountry": "DE",
			"cargoType": "GENERAL",
			"weightKg": 500,
			"transportModes": ["ROAD"],
			"priority": "STANDARD"
		})
	}

	pub fn multi_package_shipment() -> Value {
		json!({
			"originCountry": "FR",
			"destinationCountry": "ES",
			"cargoType": "GENERAL",
			"packages": [
				{ "quantity": 2, "cargoType": "GENERAL", "unitWeightKg": 100 },
				{ "quantity": 1, "cargoType": "FRAGILE", "unitWeightKg": 50, "unitPrice": 80 }
			],
			"transportModes": ["ROAD", "SEA"],
			"priority": "EXPRESS"
		})
	}

	pub fn shipment_without_weight() -> Value {
		json!({
			"originCountry": "FR",
			"destinationCountry": "DE",
			"cargoType": "GENERAL",
			"transportModes": ["ROAD"],
			"priority": "STANDARD"
		})
	}

	pub fn guest_quote(email: &str) -> Value {
		json!({
			"shipment": Self::road_shipment(),
			"contact": { "email": email, "name": "Guest Shipper" }
		})
	}

	pub fn account_quote(account_id: &str) -> Value {
		json!({
			"shipment": Self::road_shipment(),
			"accountId": account_id
		})
	}

	pub fn customer(id: &str) -> Value {
		json!({ "type": "customer", "id": id })
	}

	pub fn operator(id: &str) -> Value {
		json!({ "type": "operator", "id": id })
	}

	pub fn transition(action: &str, actor: Value) -> Value {
		json!({ "action": action, "actor": actor })
	}

	pub fn transition_with_reason(action: &str, actor: Value, reason: &str) -> Value {
		json!({ "action": action, "actor": actor, "reason": reason })
	}

	pub fn prospect(email: &str) -> Value {
		json!({ "email": email, "name": "Jane Doe", "company": "Acme Freight" })
	}

	pub fn identity(email: &str) -> Value {
		json!({ "email": email })
	}
}
