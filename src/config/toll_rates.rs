//! Tabla de tarifas por checkpoint
//!
//! La tarifa de un escaneo depende solo del checkpoint; los checkpoints
//! desconocidos usan la tarifa por defecto.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;

use crate::models::money;

#[derive(Debug, Clone, PartialEq)]
pub struct TollRateTable {
    rates: HashMap<String, Decimal>,
    default_rate: Decimal,
}

impl Default for TollRateTable {
    fn default() -> Self {
        let rates = [
            ("Toll Plaza A", Decimal::new(500, 2)),
            ("Toll Plaza B", Decimal::new(750, 2)),
            ("Toll Plaza C", Decimal::new(600, 2)),
            ("Toll Plaza D", Decimal::new(450, 2)),
        ]
        .into_iter()
        .map(|(name, rate)| (name.to_string(), rate))
        .collect();

        Self {
            rates,
            default_rate: Decimal::new(500, 2),
        }
    }
}

impl TollRateTable {
    pub fn new(rates: HashMap<String, Decimal>, default_rate: Decimal) -> Result<Self> {
        if !is_valid_rate(default_rate) {
            return Err(anyhow!(
                "default toll rate must be a positive amount with at most two decimals, got {}",
                default_rate
            ));
        }
        if let Some((name, rate)) = rates.iter().find(|(_, rate)| !is_valid_rate(**rate)) {
            return Err(anyhow!(
                "toll rate for '{}' must be a positive amount with at most two decimals, got {}",
                name,
                rate
            ));
        }
        Ok(Self { rates, default_rate })
    }

    /// Parsear `"Toll Plaza A=5.00;Toll Plaza B=7.50"`
    pub fn parse(raw: &str, default_rate: Decimal) -> Result<Self> {
        let mut rates = HashMap::new();
        for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, rate) = entry
                .rsplit_once('=')
                .ok_or_else(|| anyhow!("invalid toll rate entry '{}', expected NAME=AMOUNT", entry))?;
            let rate = Decimal::from_str(rate.trim())
                .with_context(|| format!("invalid toll amount in entry '{}'", entry))?;
            rates.insert(name.trim().to_string(), rate);
        }
        Self::new(rates, default_rate)
    }

    pub fn rate_for(&self, checkpoint: &str) -> Decimal {
        self.rates
            .get(checkpoint)
            .copied()
            .unwrap_or(self.default_rate)
    }

    pub fn default_rate(&self) -> Decimal {
        self.default_rate
    }
}

fn is_valid_rate(rate: Decimal) -> bool {
    rate > Decimal::ZERO && money::is_storable(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_matches_plaza_rates() {
        let table = TollRateTable::default();
        assert_eq!(table.rate_for("Toll Plaza B"), Decimal::new(750, 2));
        assert_eq!(table.rate_for("Toll Plaza D"), Decimal::new(450, 2));
        assert_eq!(table.rate_for("Somewhere Else"), Decimal::new(500, 2));
    }

    #[test]
    fn test_parse_rate_table() {
        let table = TollRateTable::parse("North Gate=3.25; South Gate = 9.00 ;", Decimal::new(400, 2)).unwrap();
        assert_eq!(table.rate_for("North Gate"), Decimal::new(325, 2));
        assert_eq!(table.rate_for("South Gate"), Decimal::new(900, 2));
        assert_eq!(table.rate_for("unknown"), Decimal::new(400, 2));
    }

    #[test]
    fn test_parse_rejects_bad_entries() {
        assert!(TollRateTable::parse("North Gate", Decimal::ONE).is_err());
        assert!(TollRateTable::parse("North Gate=abc", Decimal::ONE).is_err());
        assert!(TollRateTable::parse("North Gate=-1", Decimal::ONE).is_err());
        assert!(TollRateTable::parse("", Decimal::ZERO).is_err());
        assert!(TollRateTable::parse("North Gate=0.005", Decimal::ONE).is_err());
        assert!(TollRateTable::parse("North Gate=10000000000", Decimal::ONE).is_err());
        assert!(TollRateTable::parse("", Decimal::new(1, 3)).is_err());
    }
}
