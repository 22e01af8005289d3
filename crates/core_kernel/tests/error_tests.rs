//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::calendar::CalendarError;
use core_kernel::PortError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("Unit not found");

    match error {
        CoreError::NotFound(msg) => assert_eq!(msg, "Unit not found"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_core_error_from_calendar_error() {
    let calendar_error = CalendarError::InvalidMonth(13);
    let core_error: CoreError = calendar_error.into();

    assert!(matches!(core_error, CoreError::Calendar(CalendarError::InvalidMonth(13))));
}

#[test]
fn test_core_error_display() {
    let error = CoreError::validation("Test error");
    let display = format!("{}", error);

    assert!(display.contains("Validation error"));
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing config");

    match error {
        CoreError::Configuration(msg) => assert_eq!(msg, "Missing config"),
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_port_error_validation_field() {
    let error = PortError::validation_field("must be positive", "amount");

    match error {
        PortError::Validation { message, field } => {
            assert_eq!(message, "must be positive");
            assert_eq!(field, Some("amount".to_string()));
        }
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_port_error_conflict_is_not_transient() {
    let error = PortError::conflict("duplicate unit number");
    assert!(!error.is_transient());
    assert!(!error.is_not_found());
}
