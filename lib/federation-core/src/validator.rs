//! Structural and version-compatibility checks on extension descriptors

use crate::descriptor::ExtensionDescriptor;
use crate::{FederationError, Result};
use semver::{Version, VersionReq};
use tracing::debug;

/// Structural validation, in fixed order: marker, name, version, register
pub fn validate(descriptor: &ExtensionDescriptor) -> Result<()> {
    if !descriptor.host.as_ref().is_some_and(|host| host.plugin) {
        return Err(FederationError::NotAPlugin);
    }
    if descriptor.name.trim().is_empty() {
        return Err(FederationError::MissingName);
    }
    if descriptor.version.trim().is_empty() {
        return Err(FederationError::MissingVersion);
    }
    if descriptor.register.is_none() {
        return Err(FederationError::MissingRegister);
    }
    Ok(())
}

/// Match the descriptor's host range against the running host version.
///
/// An absent range accepts any host; a range that does not parse accepts none.
pub fn check_compatibility(descriptor: &ExtensionDescriptor, host: &Version) -> Result<()> {
    let Some(range) = descriptor.host.as_ref().and_then(|h| h.version.as_deref()) else {
        return Ok(());
    };

    let compatible = match parse_range(range) {
        Ok(sets) => sets.iter().any(|req| req.matches(host)),
        Err(e) => {
            debug!("Plugin {} declares unparseable host range {:?}: {}", descriptor.name, range, e);
            false
        }
    };

    if compatible {
        Ok(())
    } else {
        Err(FederationError::IncompatibleVersion {
            name: descriptor.name.clone(),
            required: range.to_string(),
            host: host.to_string(),
        })
    }
}

/// Parse an npm-style range: `||` unions, space separated comparators,
/// `a - b` hyphen ranges and `x`/`*` wildcards
fn parse_range(range: &str) -> std::result::Result<Vec<VersionReq>, semver::Error> {
    range
        .split("||")
        .map(|set| VersionReq::parse(&comparator_set(set)))
        .collect()
}

const OPERATORS: [char; 5] = ['<', '>', '=', '~', '^'];

fn comparator_set(set: &str) -> String {
    if let Some((low, high)) = set.split_once(" - ") {
        return format!(">={}, <={}", bare_version(low.trim()), bare_version(high.trim()));
    }

    let mut comparators = Vec::new();
    let mut op = String::new();
    for token in set
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
    {
        let version = token.trim_start_matches(OPERATORS);
        op.push_str(&token[..token.len() - version.len()]);
        // `>= 1.2.0` splits the operator from its version
        if version.is_empty() {
            continue;
        }

        let op = std::mem::take(&mut op);
        let version = bare_version(version);
        if is_wildcard(version) && matches!(op.as_str(), "" | "=" | ">=" | "<=") {
            continue;
        }

        // A bare version is exact, as in npm
        if op.is_empty() && !version.contains(['x', 'X', '*']) {
            comparators.push(format!("={}", version));
        } else {
            comparators.push(format!("{}{}", op, version));
        }
    }

    if comparators.is_empty() {
        "*".to_string()
    } else {
        comparators.join(", ")
    }
}

fn bare_version(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

fn is_wildcard(version: &str) -> bool {
    version.split('.').all(|part| matches!(part, "x" | "X" | "*"))
}
