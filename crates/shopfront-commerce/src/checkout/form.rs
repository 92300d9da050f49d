//! Checkout form: shipping details and payment method.

use std::fmt;
use std::str::FromStr;

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Pay the courier on delivery.
    #[default]
    CashOnDelivery,
    /// Pay through the hosted payment gateway.
    OnlineGateway,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::OnlineGateway => "online_gateway",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
            PaymentMethod::OnlineGateway => "Online Payment",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash_on_delivery" | "cod" => Ok(PaymentMethod::CashOnDelivery),
            "online_gateway" | "online" => Ok(PaymentMethod::OnlineGateway),
            other => Err(CommerceError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Shipping details collected at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShippingDetails {
    pub phone: String,
    /// Contact email; prefilled from the signed-in identity.
    pub email: Option<String>,
    /// Street address.
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl ShippingDetails {
    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("postal code", &self.postal_code),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Address as the single string stored on the order row.
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} - {}",
            self.address.trim(),
            self.city.trim(),
            self.state.trim(),
            self.postal_code.trim()
        )
    }
}

/// Everything the customer submits on the checkout page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CheckoutForm {
    pub shipping: ShippingDetails,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Reject the form when any required field is blank.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let missing = self.shipping.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::CheckoutIncomplete(missing.join(", ")))
        }
    }
}
