use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};
use crate::lines::TaxRate;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TaxRateEntry {
    pub value: TaxRate,
    pub name: String,
}

/// The enumerated TVA rates a line may use
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TaxRateSet {
    pub default: TaxRate,
    pub rates: Vec<TaxRateEntry>,
}

impl Default for TaxRateSet {
    fn default() -> Self {
        let rates = [
            (0, "Exonéré"),
            (500, "5 %"),
            (550, "5,5 %"),
            (700, "7 %"),
            (1000, "10 %"),
            (1960, "19,6 %"),
            (2000, "20 %"),
        ]
        .into_iter()
        .map(|(value, name)| TaxRateEntry {
            value: TaxRate(value),
            name: name.to_string(),
        })
        .collect();

        Self {
            default: TaxRate(2000),
            rates,
        }
    }
}

impl TaxRateSet {
    pub fn contains(&self, rate: TaxRate) -> bool {
        self.rates.iter().any(|r| r.value == rate)
    }

    /// Accept a raw basis-point value only if it is one of the configured rates
    pub fn validate(&self, basis_points: u32) -> Result<TaxRate> {
        let rate = TaxRate(basis_points);
        if self.contains(rate) {
            Ok(rate)
        } else {
            Err(CalcError::UnknownTaxRate(basis_points))
        }
    }

    /// Configured name of a rate, or its percentage when unnamed
    pub fn label(&self, rate: TaxRate) -> String {
        self.rates
            .iter()
            .find(|r| r.value == rate)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| rate.to_string())
    }
}
