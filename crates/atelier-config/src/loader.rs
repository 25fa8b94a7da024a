//! Configuration file loading with environment-variable resolution.
//!
//! Placeholders of the form `${VAR}` are replaced by the value of the
//! matching environment variable before the TOML is parsed; a missing
//! variable is a hard error rather than a silently empty string.

use crate::{Config, ConfigError};
use regex::Regex;
use std::path::Path;

/// Loads, resolves and validates a configuration file.
pub fn from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
	let content = std::fs::read_to_string(path)?;
	let resolved = resolve_env_vars(&content)?;
	resolved.parse()
}

/// Replaces every `${VAR}` placeholder with the environment value.
fn resolve_env_vars(content: &str) -> Result<String, ConfigError> {
	let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
		.expect("env placeholder pattern is valid");

	let mut result = String::with_capacity(content.len());
	let mut last_end = 0;

	for captures in pattern.captures_iter(content) {
		let whole = captures.get(0).expect("capture 0 always present");
		let name = &captures[1];

		let value = std::env::var(name).map_err(|_| {
			ConfigError::Validation(format!(
				"Environment variable '{}' referenced in config is not set",
				name
			))
		})?;

		result.push_str(&content[last_end..whole.start()]);
		result.push_str(&value);
		last_end = whole.end();
	}
	result.push_str(&content[last_end..]);

	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_resolves_placeholders() {
		std::env::set_var("ATELIER_TEST_STORAGE", "memory");

		let resolved = resolve_env_vars("primary = \"${ATELIER_TEST_STORAGE}\"").unwrap();
		assert_eq!(resolved, "primary = \"memory\"");
	}

	#[test]
	fn test_missing_variable_is_an_error() {
		let result = resolve_env_vars("primary = \"${ATELIER_TEST_UNSET_VARIABLE}\"");
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_from_file_roundtrip() {
		std::env::set_var("ATELIER_TEST_ID", "from-env");

		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"
			[agency]
			id = "${{ATELIER_TEST_ID}}"

			[storage]
			primary = "memory"

			[storage.implementations.memory]

			[assignment]
			primary = "random"
			"#
		)
		.unwrap();

		let config = from_file(file.path()).unwrap();
		assert_eq!(config.agency.id, "from-env");
	}
}
