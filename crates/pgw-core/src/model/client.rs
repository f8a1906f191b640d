// ── Gateway client (source address) ──

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use super::entity_id::{EntityId, Identified};
use crate::error::ValidationError;

/// A source address whose traffic the gateway can redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: EntityId,
    /// Stored in CIDR form; single hosts are `a.b.c.d/32`.
    pub ip_cidr: String,
    pub note: Option<String>,
    pub enabled: bool,
}

impl Identified for Client {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// Validate a user-entered client address.
///
/// Only a single dotted-quad IPv4 address is accepted; any `/` is
/// rejected as CIDR input before the octets are looked at.
pub fn parse_client_ip(raw: &str) -> Result<Ipv4Addr, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.contains('/') {
        return Err(ValidationError::CidrNotAllowed);
    }
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field: "client IP" });
    }

    let octets: Vec<&str> = trimmed.split('.').collect();
    let well_formed = octets.len() == 4
        && octets
            .iter()
            .all(|o| !o.is_empty() && o.len() <= 3 && o.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return Err(ValidationError::InvalidIpv4 {
            input: trimmed.to_owned(),
        });
    }

    let mut parsed = [0u8; 4];
    for (slot, octet) in parsed.iter_mut().zip(&octets) {
        *slot = octet.parse().map_err(|_| ValidationError::InvalidIpv4 {
            input: trimmed.to_owned(),
        })?;
    }
    Ok(Ipv4Addr::from(parsed))
}

/// The stored form of a single-host client address.
pub fn host_cidr(ip: Ipv4Addr) -> String {
    format!("{ip}/32")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dotted_quad() {
        assert_eq!(
            parse_client_ip(" 192.168.2.3 "),
            Ok(Ipv4Addr::new(192, 168, 2, 3))
        );
        assert_eq!(parse_client_ip("0.0.0.0"), Ok(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn rejects_cidr_first() {
        assert_eq!(
            parse_client_ip("10.0.0.0/24"),
            Err(ValidationError::CidrNotAllowed)
        );
        assert_eq!(parse_client_ip("garbage/8"), Err(ValidationError::CidrNotAllowed));
    }

    #[test]
    fn rejects_bad_octets() {
        for input in ["256.1.1.1", "1.2.3", "1.2.3.4.5", "a.b.c.d", "1..2.3", "+1.2.3.4"] {
            assert!(
                matches!(parse_client_ip(input), Err(ValidationError::InvalidIpv4 { .. })),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn empty_is_missing() {
        assert!(matches!(
            parse_client_ip("  "),
            Err(ValidationError::MissingField { .. })
        ));
    }

    #[test]
    fn host_cidr_suffix() {
        assert_eq!(host_cidr(Ipv4Addr::new(10, 1, 2, 3)), "10.1.2.3/32");
    }
}
