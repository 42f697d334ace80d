//! Utilidades de validación
//!
//! Funciones usadas por los `#[validate(custom = ...)]` de los DTOs
//! y por los servicios antes de tocar el almacenamiento.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// Matrículas ya normalizadas: `VAN-0921`, `MH12AB1234`, `KA 01 AB 1234`
    pub static ref PLATE_REGEX: Regex = Regex::new(r"^[A-Z0-9][A-Z0-9 -]{1,15}$").unwrap();
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un importe, peso o volumen no sea negativo
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("actual".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que una magnitud sea estrictamente positiva (capacidad, carga)
pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.add_param("actual".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let clean_phone = value.chars().filter(|c| c.is_ascii_digit()).collect::<String>();
    if clean_phone.len() < 7 || clean_phone.len() > 15 {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar matrícula; se normaliza antes de aplicar el patrón
pub fn validate_plate(value: &str) -> Result<(), ValidationError> {
    if !PLATE_REGEX.is_match(&normalize_plate(value)) {
        let mut error = ValidationError::new("plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Normalizar matrícula antes de validarla o compararla
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_plate_regex() {
        assert!(PLATE_REGEX.is_match("VAN-0921"));
        assert!(PLATE_REGEX.is_match("BK-9901"));
        assert!(PLATE_REGEX.is_match("MH12AB1234"));
        assert!(PLATE_REGEX.is_match("ABCDE-12"));
        assert!(PLATE_REGEX.is_match("KA 01 AB 1234"));
        assert!(!PLATE_REGEX.is_match("van 0921"));
        assert!(!PLATE_REGEX.is_match(""));
        assert!(!PLATE_REGEX.is_match("-VAN"));
        assert!(validate_plate(" trk-5542").is_ok());
        assert!(validate_plate("trucks-1").is_ok());
        assert!(validate_plate("X").is_err());
        assert!(validate_plate("VAN_0921!").is_err());
        assert!(validate_plate("ABCDEFGHIJKLMNOPQ").is_err());
    }

    #[test]
    fn test_non_negative() {
        assert!(validate_non_negative(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative(&Decimal::from_str("45.50").unwrap()).is_ok());
        assert!(validate_non_negative(&Decimal::from_str("-0.01").unwrap()).is_err());
    }

    #[test]
    fn test_positive() {
        assert!(validate_positive(&Decimal::ONE).is_ok());
        assert!(validate_positive(&Decimal::ZERO).is_err());
    }

    #[test]
    fn test_phone_and_not_empty() {
        assert!(validate_phone("+1234567890").is_ok());
        assert!(validate_phone("12").is_err());
        assert!(validate_not_empty("  ").is_err());
        assert_eq!(normalize_plate(" van-0921 "), "VAN-0921");
    }
}
