//! Validation and normalization of firewalls before submission.

use crate::models::{Firewall, FirewallRule, PortSpec, RuleHost, RuleProtocol};
use shieldoo_core::{Error, Result};
use tracing::debug;

/// Validate one rule and derive its `host` field.
///
/// # Errors
///
/// Returns [`Error::ValidationError`] naming the offending protocol, port or
/// group reference.
pub fn normalize_firewall_rule(rule: &mut FirewallRule) -> Result<()> {
    rule.protocol.parse::<RuleProtocol>()?;
    rule.port.parse::<PortSpec>()?;

    if let Some(group) = rule.groups.iter().find(|group| group.value().is_empty()) {
        return Err(Error::ValidationError(format!("invalid group: {group}")));
    }

    rule.host = if rule.groups.is_empty() {
        RuleHost::Any
    } else {
        RuleHost::Group
    };
    Ok(())
}

/// Normalize every rule, inbound first, stopping at the first error.
///
/// A firewall left without outbound rules gets a single allow-any rule.
///
/// # Errors
///
/// Returns the first rule validation error.
pub fn normalize_firewall(firewall: &mut Firewall) -> Result<()> {
    for rule in firewall
        .rules_in
        .iter_mut()
        .chain(firewall.rules_out.iter_mut())
    {
        normalize_firewall_rule(rule)?;
    }

    if firewall.rules_out.is_empty() {
        debug!(firewall = %firewall.name, "adding default outbound rule");
        firewall.rules_out.push(FirewallRule::allow_any());
    }
    Ok(())
}
