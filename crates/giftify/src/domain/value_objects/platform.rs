//! DeliveryPlatform - Quick-commerce providers

use serde::{Deserialize, Serialize};

/// Delivery platform a gift order can be placed on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPlatform {
    Blinkit,
    Zepto,
    SwiggyInstamart,
    Amazon,
    Manual,
}

impl DeliveryPlatform {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryPlatform::Blinkit => "blinkit",
            DeliveryPlatform::Zepto => "zepto",
            DeliveryPlatform::SwiggyInstamart => "swiggy_instamart",
            DeliveryPlatform::Amazon => "amazon",
            DeliveryPlatform::Manual => "manual",
        }
    }
}

impl std::fmt::Display for DeliveryPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blinkit" => Ok(DeliveryPlatform::Blinkit),
            "zepto" => Ok(DeliveryPlatform::Zepto),
            "swiggy_instamart" | "swiggy" | "instamart" => Ok(DeliveryPlatform::SwiggyInstamart),
            "amazon" => Ok(DeliveryPlatform::Amazon),
            "manual" => Ok(DeliveryPlatform::Manual),
            _ => Err(format!("Unknown delivery platform: {}", s)),
        }
    }
}
