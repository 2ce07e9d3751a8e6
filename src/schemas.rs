use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = String;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub email: String,
    pub hashed_password: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TokenRecord {
    pub user_id: UserId,
    pub token: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// One party's share of an expense as it is persisted.
///
/// `shared_id` is empty when the split was not created as part of a group.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SplitRecord {
    pub id: String,
    pub expense_id: String,
    pub shared_id: String,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub date: f64,
    pub paid: bool,
    pub from_value: f64,
    pub from_currency: String,
    pub to_value: f64,
    pub to_currency: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SplitAmount {
    pub from_value: f64,
    pub to_value: f64,
    pub from_currency: String,
    pub to_currency: String,
}

/// A split payload that passed validation.
#[derive(Clone, Debug, PartialEq)]
pub struct BillSplit {
    pub date: f64,
    pub amount: SplitAmount,
    pub paid: bool,
    pub name: String,
    pub description: String,
    pub id: String,
    pub expense_id: String,
    pub shared_id: String,
}

impl BillSplit {
    pub fn into_record(self, user_id: UserId) -> SplitRecord {
        SplitRecord {
            id: self.id,
            expense_id: self.expense_id,
            shared_id: self.shared_id,
            user_id,
            name: self.name,
            description: self.description,
            date: self.date,
            paid: self.paid,
            from_value: self.amount.from_value,
            from_currency: self.amount.from_currency,
            to_value: self.amount.to_value,
            to_currency: self.amount.to_currency,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Returns the normalized email and the password, or `None` when either is
    /// missing or empty.
    pub fn present(self) -> Option<(String, String)> {
        let email = self.email.map(|email| email.trim().to_lowercase())?;
        let password = self.password?;
        if email.is_empty() || password.is_empty() {
            return None;
        }
        Some((email, password))
    }
}
