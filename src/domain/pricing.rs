//! Platform fee and ticket price breakdown.
//!
//! The buyer is charged the gross amount (`unit_price * quantity`) while
//! the ledger records the per-ticket net amount after the platform fee
//! (`unit_price * (1 - fee_rate)`). All arithmetic is exact decimal.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::GatewayError;

/// Maximum decimal places of a fee rate (whole percent and hundredths).
pub const MAX_FEE_SCALE: u32 = 2;

/// Fraction of the unit price retained by the platform, in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRate(Decimal);

impl FeeRate {
    /// Default platform fee: 10 %.
    pub const DEFAULT: Self = Self(Decimal::from_parts(10, 0, 0, false, 2));

    /// Creates a fee rate.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if `rate` is negative, not
    /// strictly below one, or has more than [`MAX_FEE_SCALE`] decimal places.
    pub fn new(rate: Decimal) -> Result<Self, GatewayError> {
        if rate.is_sign_negative() || rate >= Decimal::ONE {
            return Err(GatewayError::InvalidRequest(format!(
                "fee rate must be in [0, 1), got {rate}"
            )));
        }
        if rate.normalize().scale() > MAX_FEE_SCALE {
            return Err(GatewayError::InvalidRequest(format!(
                "fee rate must have at most {MAX_FEE_SCALE} decimal places, got {rate}"
            )));
        }
        Ok(Self(rate))
    }

    /// Returns the rate as a decimal fraction.
    #[must_use]
    pub const fn get(&self) -> Decimal {
        self.0
    }

    /// Multiplier applied to the unit price to obtain the net amount.
    #[must_use]
    pub fn net_multiplier(&self) -> Decimal {
        Decimal::ONE - self.0
    }

    /// Computes the price breakdown for `quantity` tickets at `unit_price`.
    ///
    /// Free events (`is_paid == false`) always break down to zero.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the gross total overflows.
    pub fn breakdown(
        &self,
        unit_price: Decimal,
        quantity: u32,
        is_paid: bool,
    ) -> Result<PriceBreakdown, GatewayError> {
        if !is_paid {
            return Ok(PriceBreakdown {
                price_paid: Decimal::ZERO,
                total_price: Decimal::ZERO,
            });
        }
        let price_paid = unit_price
            .checked_mul(self.net_multiplier())
            .ok_or_else(|| GatewayError::InvalidRequest("unit price too large".to_string()))?;
        let total_price = unit_price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| GatewayError::InvalidRequest("order total too large".to_string()))?;
        Ok(PriceBreakdown {
            price_paid: price_paid.normalize(),
            total_price: total_price.normalize(),
        })
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FeeRate {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate = Decimal::from_str(s.trim())
            .map_err(|e| GatewayError::InvalidRequest(format!("invalid fee rate {s:?}: {e}")))?;
        Self::new(rate)
    }
}

/// Amounts recorded for a single purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// Net amount stored per ticket after the platform fee.
    pub price_paid: Decimal,
    /// Gross amount charged to the buyer.
    pub total_price: Decimal,
}
