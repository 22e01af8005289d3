//! Tenants (rent payers)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::TenantId;
use crate::error::PropertyError;

const MAX_NAME_LEN: usize = 120;

/// A person who pays rent for one or more units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub full_name: String,
    /// International format, e.g. `+254712345678`
    pub phone: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Creates a new active tenant, normalising the phone number
    pub fn new(
        full_name: impl Into<String>,
        phone: impl AsRef<str>,
        email: Option<String>,
    ) -> Result<Self, PropertyError> {
        let full_name = full_name.into().trim().to_string();
        if full_name.is_empty() || full_name.chars().count() > MAX_NAME_LEN {
            return Err(PropertyError::InvalidName(full_name));
        }

        let phone = normalize_phone(phone.as_ref())?;

        let email = match email {
            Some(e) if e.trim().is_empty() => None,
            Some(e) => {
                let e = e.trim().to_string();
                if !is_plausible_email(&e) {
                    return Err(PropertyError::InvalidEmail(e));
                }
                Some(e)
            }
            None => None,
        };

        Ok(Self {
            id: TenantId::new_v7(),
            full_name,
            phone,
            email,
            is_active: true,
            created_at: Utc::now(),
        })
    }

    /// Marks the tenant inactive. Ending their occupancies is the registry's job.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

/// Request for registering a tenant
#[derive(Debug, Clone)]
pub struct CreateTenantRequest {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
}

impl CreateTenantRequest {
    /// Builds the tenant this request describes
    pub fn into_tenant(self) -> Result<Tenant, PropertyError> {
        Tenant::new(self.full_name, self.phone, self.email)
    }
}

/// Strips spaces and dashes and checks for `+` followed by 9-15 digits
pub fn normalize_phone(raw: &str) -> Result<String, PropertyError> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    let digits = compact
        .strip_prefix('+')
        .ok_or_else(|| PropertyError::InvalidPhone(raw.to_string()))?;

    if !(9..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PropertyError::InvalidPhone(raw.to_string()));
    }

    Ok(compact)
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+254 712-345 678").unwrap(), "+254712345678");
        assert!(normalize_phone("0712345678").is_err());
        assert!(normalize_phone("+25471234567890123").is_err());
        assert!(normalize_phone("+2547123abc").is_err());
    }

    #[test]
    fn test_blank_email_is_dropped() {
        let tenant = Tenant::new("Jane Wanjiku", "+254712345678", Some("  ".to_string())).unwrap();
        assert!(tenant.email.is_none());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let result = Tenant::new("Jane Wanjiku", "+254712345678", Some("jane@".to_string()));
        assert!(matches!(result, Err(PropertyError::InvalidEmail(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            Tenant::new("   ", "+254712345678", None),
            Err(PropertyError::InvalidName(_))
        ));
    }
}
