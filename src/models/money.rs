//! Importes monetarios
//!
//! Saldos, tarifas y recargas se guardan como `NUMERIC(12, 2)`: como mucho
//! dos decimales y diez dígitos enteros.

use rust_decimal::Decimal;

/// Decimales admitidos en un importe
pub const MONEY_SCALE: u32 = 2;

/// Mayor importe representable: 9_999_999_999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, MONEY_SCALE);

/// El importe cabe en la columna sin redondeo
pub fn is_storable(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE && amount.abs() <= MAX_AMOUNT
}

/// Sumar un abono a un saldo; `None` si el resultado no cabe en la columna
pub fn credit(balance: Decimal, amount: Decimal) -> Option<Decimal> {
    balance.checked_add(amount).filter(|total| *total <= MAX_AMOUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_max_amount_matches_column() {
        assert_eq!(MAX_AMOUNT, Decimal::new(999_999_999_999, 2));
    }

    #[test]
    fn test_storable_amounts() {
        assert!(is_storable(Decimal::new(750, 2)));
        assert!(is_storable(Decimal::from_str("20.500").unwrap()));
        assert!(is_storable(MAX_AMOUNT));
        assert!(!is_storable(Decimal::from_str("0.001").unwrap()));
        assert!(!is_storable(Decimal::from_str("0.005").unwrap()));
        assert!(!is_storable(Decimal::new(10_000_000_000, 0)));
        assert!(!is_storable(Decimal::MAX));
    }

    #[test]
    fn test_credit_never_overflows() {
        assert_eq!(credit(Decimal::new(1000, 2), Decimal::new(250, 2)), Some(Decimal::new(1250, 2)));
        assert_eq!(credit(MAX_AMOUNT, Decimal::new(1, 2)), None);
        assert_eq!(credit(Decimal::new(1000, 2), Decimal::MAX), None);
    }
}
