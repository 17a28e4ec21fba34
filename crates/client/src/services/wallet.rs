//! E-wallets and their transaction ledger.

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::ClientResult;
use crate::http::{ApiClient, ApiRequest};

const COMPLETED: &str = "completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    AssessmentReward,
    BalanceAdjustment,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::AssessmentReward => "assessment_reward",
            TransactionKind::BalanceAdjustment => "balance_adjustment",
        }
    }
}

pub struct WalletApi<'a> {
    client: &'a ApiClient,
}

impl<'a> WalletApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn ewallets(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/ewallets/")).await
    }

    pub async fn transactions(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/transactions/")).await
    }

    pub async fn set_balance(&self, ewallet_id: i64, balance: f64) -> ClientResult<Value> {
        let body = json!({ "balance": balance });
        self.client
            .json(ApiRequest::patch(format!("/ewallets/{ewallet_id}/")).json(body))
            .await
    }

    /// Append a completed transaction to a wallet's ledger.
    pub async fn record_transaction(
        &self,
        ewallet_id: i64,
        amount: f64,
        kind: TransactionKind,
        description: &str,
    ) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post("/transactions/").json(transaction_body(
                ewallet_id,
                amount,
                kind,
                description,
            )))
            .await
    }

    pub async fn reward(
        &self,
        ewallet_id: i64,
        amount: f64,
        description: &str,
    ) -> ClientResult<Value> {
        self.record_transaction(ewallet_id, amount, TransactionKind::AssessmentReward, description)
            .await
    }

    /// Set a wallet to `new_balance` and record the difference as an
    /// adjustment.
    pub async fn adjust_balance(
        &self,
        ewallet_id: i64,
        current_balance: f64,
        new_balance: f64,
    ) -> ClientResult<Value> {
        self.set_balance(ewallet_id, new_balance).await?;
        let delta = new_balance - current_balance;
        tracing::info!(ewallet_id, delta, "wallet balance adjusted");
        self.record_transaction(
            ewallet_id,
            delta,
            TransactionKind::BalanceAdjustment,
            "Balance adjusted by instructor",
        )
        .await
    }
}

fn transaction_body(
    ewallet_id: i64,
    amount: f64,
    kind: TransactionKind,
    description: &str,
) -> Value {
    json!({
        "ewallet": ewallet_id,
        "amount": amount,
        "transaction_type": kind,
        "description": description,
        "status": COMPLETED,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_kind_serializes_as_wire_name() {
        for kind in [TransactionKind::AssessmentReward, TransactionKind::BalanceAdjustment] {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
    }

    #[test]
    fn transactions_are_recorded_completed() {
        let body =
            transaction_body(4, 12.5, TransactionKind::AssessmentReward, "Reward for module 3");
        assert_eq!(
            body,
            json!({
                "ewallet": 4,
                "amount": 12.5,
                "transaction_type": "assessment_reward",
                "description": "Reward for module 3",
                "status": "completed",
            })
        );
    }
}
