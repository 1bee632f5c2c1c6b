//! OAuth scope lists as sent to, and echoed by, the token endpoint.

// std
use std::collections::BTreeSet;
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Rejected scope tokens.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeError {
	/// A scope token was empty.
	#[error("Scope tokens cannot be empty.")]
	Blank,
	/// A scope token contained whitespace, which is the list delimiter on the wire.
	#[error("Scope token `{0}` contains whitespace.")]
	Whitespace(String),
}

/// Ordered, duplicate-free set of scope tokens.
///
/// Serializes to the space-delimited form used by the `scope` form parameter and accepts
/// either that form or a list when deserializing.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopeSet(BTreeSet<String>);
impl ScopeSet {
	/// Builds a set from individual scope tokens.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		scopes
			.into_iter()
			.map(|scope| {
				let scope = scope.as_ref();

				if scope.is_empty() {
					Err(ScopeError::Blank)
				} else if scope.contains(char::is_whitespace) {
					Err(ScopeError::Whitespace(scope.to_owned()))
				} else {
					Ok(scope.to_owned())
				}
			})
			.collect::<Result<_, _>>()
			.map(Self)
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no scope is requested.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns `true` when `scope` is part of the set.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.contains(scope)
	}

	/// Iterates the scopes in lexical order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Renders the space-delimited wire form.
	pub fn normalized(&self) -> String {
		self.iter().collect::<Vec<_>>().join(" ")
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_set().entries(self.iter()).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s.split_whitespace())
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.normalized())
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Wire {
			Delimited(String),
			List(Vec<String>),
		}

		match Wire::deserialize(deserializer)? {
			Wire::Delimited(value) => value.parse(),
			Wire::List(values) => Self::new(values),
		}
		.map_err(DeError::custom)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn order_and_duplicates_do_not_matter() {
		let requested = ScopeSet::new(["reports.write", "reports.read", "reports.write"])
			.expect("Scopes should be valid.");

		assert_eq!(requested.len(), 2);
		assert_eq!(requested.to_string(), "reports.read reports.write");
		assert_eq!(
			requested,
			"reports.write reports.read".parse::<ScopeSet>().expect("Scopes should parse.")
		);
	}

	#[test]
	fn blank_and_padded_tokens_are_rejected() {
		assert_eq!(ScopeSet::new([""]), Err(ScopeError::Blank));
		assert_eq!(ScopeSet::new(["a b"]), Err(ScopeError::Whitespace("a b".into())));
		assert!(
			ScopeSet::from_str("  ").expect("Whitespace-only input is an empty list.").is_empty()
		);
	}

	#[test]
	fn serde_uses_the_wire_form() {
		let scopes: ScopeSet =
			serde_json::from_str("[\"openid\",\"email\"]").expect("Scope list should deserialize.");

		assert!(scopes.contains("email"));
		assert_eq!(
			serde_json::to_string(&scopes).expect("Scopes should serialize."),
			"\"email openid\""
		);
		assert_eq!(
			serde_json::from_str::<ScopeSet>("\"openid email\"")
				.expect("Scope string should deserialize."),
			scopes
		);
		assert!(serde_json::from_str::<ScopeSet>("[\"bad scope\"]").is_err());
	}
}
