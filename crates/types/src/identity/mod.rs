//! Contact identities used to match orphaned records to accounts

use serde::{Deserialize, Serialize};

/// Contact details captured with a guest request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSnapshot {
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

impl ContactSnapshot {
	pub fn new(email: impl Into<String>) -> Self {
		Self {
			email: normalize_email(&email.into()),
			phone: None,
			name: None,
		}
	}

	pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
		self.phone = Some(phone.into());
		self
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}
}

/// Identity of a freshly provisioned account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactIdentity {
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
}

impl ContactIdentity {
	pub fn new(email: &str, phone: Option<&str>) -> Self {
		Self {
			email: normalize_email(email),
			phone: phone.map(str::to_string),
		}
	}

	/// An identity is usable only with a plausible email address
	pub fn is_valid(&self) -> bool {
		is_plausible_email(&self.email)
	}

	/// Exact match on normalised email; phones must also agree when both sides carry one
	pub fn matches(&self, contact: &ContactSnapshot) -> bool {
		if normalize_email(&contact.email) != normalize_email(&self.email) {
			return false;
		}
		match (&self.phone, &contact.phone) {
			(Some(ours), Some(theirs)) => normalize_phone(ours) == normalize_phone(theirs),
			_ => true,
		}
	}
}

pub fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

/// Digits only, keeping a leading `+`
pub fn normalize_phone(phone: &str) -> String {
	let trimmed = phone.trim();
	let mut normalized: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
	if trimmed.starts_with('+') {
		normalized.insert(0, '+');
	}
	normalized
}

pub fn is_plausible_email(email: &str) -> bool {
	let email = email.trim();
	match email.split_once('@') {
		Some((local, domain)) => {
			!local.is_empty()
				&& domain.contains('.')
				&& !domain.starts_with('.')
				&& !domain.ends_with('.')
				&& !email.contains(char::is_whitespace)
		},
		None => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_email_match_is_case_insensitive() {
		let identity = ContactIdentity::new("Jane.Doe@Example.com ", None);
		let contact = ContactSnapshot::new("jane.doe@example.com");
		assert!(identity.matches(&contact));
	}

	#[test]
	fn test_phone_must_agree_when_both_present() {
		let identity = ContactIdentity::new("jane@example.com", Some("+33 6 12 34 56 78"));
		let same = ContactSnapshot::new("jane@example.com").with_phone("+33612345678");
		let other = ContactSnapshot::new("jane@example.com").with_phone("+33700000000");
		let none = ContactSnapshot::new("jane@example.com");

		assert!(identity.matches(&same));
		assert!(!identity.matches(&other));
		assert!(identity.matches(&none));
	}

	#[test]
	fn test_different_email_never_matches() {
		let identity = ContactIdentity::new("jane@example.com", None);
		assert!(!identity.matches(&ContactSnapshot::new("john@example.com")));
	}

	#[test]
	fn test_email_plausibility() {
		assert!(is_plausible_email("a@b.co"));
		assert!(!is_plausible_email("nobody"));
		assert!(!is_plausible_email("a@b"));
		assert!(!is_plausible_email("@b.co"));
	}
}
