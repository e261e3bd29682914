use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::auth::Owned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Enum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxRegime {
    #[default]
    Undefined,
    SalariedIncome,
    BusinessAndProfessional,
    Leasing,
    Dividends,
    Interest,
    PrizeIncome,
    NoTaxObligations,
    SimplifiedTrust,
    DigitalPlatforms,
    GeneralCorporate,
    NonProfit,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub lastname: String,
    pub email: String,
    #[graphql(skip)]
    pub password_hash: String,
    #[serde(default)]
    pub tax_regime: TaxRegime,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    /// Cache of owned reminder ids; reads go through owner-scoped queries.
    #[graphql(skip)]
    #[serde(default)]
    pub reminder_ids: Vec<String>,
    /// Cache of owned chat ids; reads go through owner-scoped queries.
    #[graphql(skip)]
    #[serde(default)]
    pub chat_ids: Vec<String>,
}

impl Owned for User {
    fn owner_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
}

impl AuthToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
