use serde::{Deserialize, Serialize};

/// One purchasable subscription plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan id used by the simulation entry points, e.g. `plan_basic`
    pub id: String,
    /// Display name, e.g. `Basic`
    pub name: String,
    /// Amount per billing cycle, currency-minor-agnostic
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Hosted-checkout price id
    pub price_id: String,
}

/// Fixed catalog of purchasable plans
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    /// The catalog the original demo shipped: Basic 9, Pro 19,
    /// Enterprise 49, monthly.
    pub fn standard(currency: &str) -> Self {
        let plan = |id: &str, name: &str, amount: i64, price_id: &str| Plan {
            id: id.to_string(),
            name: name.to_string(),
            amount,
            currency: currency.to_string(),
            price_id: price_id.to_string(),
        };

        Self {
            plans: vec![
                plan("plan_basic", "Basic", 9, "price_basic_monthly_id"),
                plan("plan_pro", "Pro", 19, "price_pro_monthly_id"),
                plan("plan_enterprise", "Enterprise", 49, "price_enterprise_monthly_id"),
            ],
        }
    }

    pub fn get(&self, plan_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.name == name)
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }
}
