//! Subscription plan domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CURRENCY;

/// Subscription tier of a household.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Premium1,
    Premium2,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::Premium1 => "premium1",
            SubscriptionPlan::Premium2 => "premium2",
        }
    }

    /// Usage quota attached to the plan.
    pub fn quota(&self) -> PlanQuota {
        match self {
            SubscriptionPlan::Free => PlanQuota {
                max_products: Some(50),
                max_receipts_per_month: Some(5),
            },
            SubscriptionPlan::Premium1 | SubscriptionPlan::Premium2 => PlanQuota::unlimited(),
        }
    }
}

impl std::str::FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(SubscriptionPlan::Free),
            "premium1" => Ok(SubscriptionPlan::Premium1),
            "premium2" => Ok(SubscriptionPlan::Premium2),
            other => Err(format!("Unknown subscription plan '{}'", other)),
        }
    }
}

/// Usage caps of a plan. `None` means unlimited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlanQuota {
    pub max_products: Option<usize>,
    pub max_receipts_per_month: Option<usize>,
}

impl PlanQuota {
    pub fn unlimited() -> Self {
        Self {
            max_products: None,
            max_receipts_per_month: None,
        }
    }

    pub fn allows_products(&self, current: usize) -> bool {
        self.max_products.map_or(true, |max| current < max)
    }

    pub fn allows_receipts(&self, this_month: usize) -> bool {
        self.max_receipts_per_month
            .map_or(true, |max| this_month < max)
    }
}

/// Catalog entry describing a plan offering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetails {
    pub id: SubscriptionPlan,
    pub title: String,
    pub monthly_price: Decimal,
    pub currency: String,
    pub recommended: bool,
    pub features: Vec<String>,
    pub quota: PlanQuota,
}

fn details(
    id: SubscriptionPlan,
    title: &str,
    monthly_price: Decimal,
    recommended: bool,
    features: &[&str],
) -> PlanDetails {
    PlanDetails {
        id,
        title: title.to_string(),
        monthly_price,
        currency: DEFAULT_CURRENCY.to_string(),
        recommended,
        features: features.iter().map(|f| f.to_string()).collect(),
        quota: id.quota(),
    }
}

/// The plans offered to households, cheapest first.
pub fn plan_catalog() -> Vec<PlanDetails> {
    vec![
        details(
            SubscriptionPlan::Free,
            "Free",
            Decimal::ZERO,
            false,
            &[
                "Gestion de stock (max 50 articles)",
                "5 Tickets de caisse / mois",
                "Support communautaire",
                "Tableau de bord basique",
            ],
        ),
        details(
            SubscriptionPlan::Premium1,
            "Premium 1",
            Decimal::new(499, 2),
            true,
            &[
                "Stock illimité",
                "Tickets illimités",
                "Alertes intelligentes",
                "Graphiques de consommation",
                "Mode famille (2 comptes)",
            ],
        ),
        details(
            SubscriptionPlan::Premium2,
            "Premium 2",
            Decimal::new(999, 2),
            false,
            &[
                "Tout Premium 1 inclus",
                "Analyse IA des tickets",
                "Prédiction de consommation",
                "Automatisations domotiques",
                "Support prioritaire 24/7",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plan_serialization() {
        assert_eq!(
            serde_json::to_string(&SubscriptionPlan::Premium1).unwrap(),
            "\"premium1\""
        );
        assert_eq!(
            serde_json::from_str::<SubscriptionPlan>("\"premium2\"").unwrap(),
            SubscriptionPlan::Premium2
        );
    }

    #[test]
    fn test_plan_from_str() {
        assert_eq!("FREE".parse::<SubscriptionPlan>(), Ok(SubscriptionPlan::Free));
        assert!("gold".parse::<SubscriptionPlan>().is_err());
    }

    #[test]
    fn test_free_quota() {
        let quota = SubscriptionPlan::Free.quota();
        assert!(quota.allows_products(49));
        assert!(!quota.allows_products(50));
        assert!(quota.allows_receipts(4));
        assert!(!quota.allows_receipts(5));
    }

    #[test]
    fn test_premium_is_unlimited() {
        let quota = SubscriptionPlan::Premium2.quota();
        assert!(quota.allows_products(10_000));
        assert!(quota.allows_receipts(10_000));
    }

    #[test]
    fn test_catalog_prices() {
        let catalog = plan_catalog();
        let prices: Vec<_> = catalog.iter().map(|p| p.monthly_price).collect();
        assert_eq!(prices, vec![dec!(0), dec!(4.99), dec!(9.99)]);
        assert_eq!(catalog.iter().filter(|p| p.recommended).count(), 1);
    }
}
