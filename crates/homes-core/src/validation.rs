//! Field rules applied before any write reaches the database
//!
//! Validation is pure: it turns a loose [`ListingValues`] bag into a typed
//! record or change set, or reports the first rule that failed.

use crate::error::ValidationError;
use crate::models::{HomeType, ListingValues};

/// A fully validated candidate for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub address: String,
    pub county: Option<String>,
    pub home_type: HomeType,
    pub income: i64,
}

/// A validated partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingChanges {
    pub address: Option<String>,
    pub county: Option<Option<String>>,
    pub home_type: Option<HomeType>,
    pub income: Option<i64>,
}

impl ListingChanges {
    pub fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.county.is_none()
            && self.home_type.is_none()
            && self.income.is_none()
    }
}

/// Validate a full candidate record
pub fn validate_new(values: &ListingValues) -> Result<NewListing, ValidationError> {
    let address = match values.address.as_deref() {
        Some(a) => check_address(a)?,
        None => return Err(ValidationError::AddressRequired),
    };

    let home_type = match values.home_type {
        Some(code) => check_type(code)?,
        None => return Err(ValidationError::MissingType),
    };

    let income = match values.income {
        Some(income) => check_income(income)?,
        None => 0,
    };

    Ok(NewListing {
        address,
        county: values.county.clone().flatten(),
        home_type,
        income,
    })
}

/// Validate only the fields present in a partial update
pub fn validate_changes(values: &ListingValues) -> Result<ListingChanges, ValidationError> {
    Ok(ListingChanges {
        address: values.address.as_deref().map(check_address).transpose()?,
        county: values.county.clone(),
        home_type: values.home_type.map(check_type).transpose()?,
        income: values.income.map(check_income).transpose()?,
    })
}

fn check_address(address: &str) -> Result<String, ValidationError> {
    if address.is_empty() {
        return Err(ValidationError::AddressRequired);
    }
    Ok(address.to_string())
}

fn check_type(code: i64) -> Result<HomeType, ValidationError> {
    HomeType::from_code(code).ok_or(ValidationError::InvalidType(code))
}

fn check_income(income: i64) -> Result<i64, ValidationError> {
    if income < 0 {
        return Err(ValidationError::InvalidIncome(income));
    }
    Ok(income)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> ListingValues {
        ListingValues::new()
            .address("1 Main St")
            .home_type(HomeType::Single)
    }

    #[test]
    fn test_income_defaults_to_zero() {
        let listing = validate_new(&candidate()).unwrap();
        assert_eq!(listing.income, 0);
        assert_eq!(listing.county, None);
    }

    #[test]
    fn test_missing_address_rejected() {
        let values = ListingValues::new().home_type(HomeType::Single);
        assert_eq!(validate_new(&values), Err(ValidationError::AddressRequired));
    }

    #[test]
    fn test_empty_address_rejected() {
        let values = candidate().address("");
        assert_eq!(validate_new(&values), Err(ValidationError::AddressRequired));
    }

    #[test]
    fn test_invalid_type_rejected() {
        for code in [-1, 3, 99] {
            let values = candidate().type_code(code);
            assert_eq!(validate_new(&values), Err(ValidationError::InvalidType(code)));
        }
    }

    #[test]
    fn test_missing_type_rejected() {
        let values = ListingValues::new().address("1 Main St");
        let err = validate_new(&values).unwrap_err();
        assert!(err.to_string().starts_with("invalid type"));
    }

    #[test]
    fn test_negative_income_rejected() {
        let values = candidate().income(-1);
        assert_eq!(validate_new(&values), Err(ValidationError::InvalidIncome(-1)));
    }

    #[test]
    fn test_county_stored_as_given() {
        let listing = validate_new(&candidate().county("")).unwrap();
        assert_eq!(listing.county, Some(String::new()));
    }

    #[test]
    fn test_changes_only_check_supplied_fields() {
        let changes = validate_changes(&ListingValues::new().income(600)).unwrap();
        assert_eq!(changes.income, Some(600));
        assert!(changes.address.is_none());
        assert!(changes.home_type.is_none());

        assert!(validate_changes(&ListingValues::new()).unwrap().is_empty());
    }

    #[test]
    fn test_changes_reject_bad_fields() {
        assert_eq!(
            validate_changes(&ListingValues::new().address("")),
            Err(ValidationError::AddressRequired)
        );
        assert_eq!(
            validate_changes(&ListingValues::new().type_code(5)),
            Err(ValidationError::InvalidType(5))
        );
        assert_eq!(
            validate_changes(&ListingValues::new().income(-5)),
            Err(ValidationError::InvalidIncome(-5))
        );
    }

    #[test]
    fn test_changes_clear_county() {
        let changes = validate_changes(&ListingValues::new().clear_county()).unwrap();
        assert_eq!(changes.county, Some(None));
        assert!(!changes.is_empty());
    }
}
