use std::fmt;
use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Named stage of a conversation; selects the handler for the next message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Start,
    #[serde(rename = "select_problem")]
    ProblemSelection,
    Troubleshooting,
    #[serde(rename = "get_machine_number")]
    MachineNumber,
    #[serde(rename = "get_location")]
    Location,
    #[serde(rename = "get_customer_info")]
    CustomerInfo,
    #[serde(rename = "get_evidence")]
    Evidence,
    #[serde(rename = "get_account")]
    Account,
}

impl Step {
    pub const ALL: [Step; 8] = [
        Step::Start,
        Step::ProblemSelection,
        Step::Troubleshooting,
        Step::MachineNumber,
        Step::Location,
        Step::CustomerInfo,
        Step::Evidence,
        Step::Account,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Start => "start",
            Step::ProblemSelection => "select_problem",
            Step::Troubleshooting => "troubleshooting",
            Step::MachineNumber => "get_machine_number",
            Step::Location => "get_location",
            Step::CustomerInfo => "get_customer_info",
            Step::Evidence => "get_evidence",
            Step::Account => "get_account",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Refund claim accumulated across the post-troubleshooting steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub problem_id: Option<String>,
    pub problem_name: Option<String>,
    pub remediation_steps: Vec<String>,
    /// Cursor into `remediation_steps`; only set while troubleshooting.
    pub remediation_index: Option<usize>,
    pub machine_number: Option<String>,
    pub location: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub lost_amount: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A completed claim, flattened for the record sink. Wire keys match the
/// columns the spreadsheet script reads (`problemType`, `timestamp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    pub user_id: String,
    #[serde(rename = "problemType")]
    pub problem_id: String,
    pub problem_name: String,
    pub machine_number: String,
    pub location: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub lost_amount: String,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    /// RFC 3339 UTC with millisecond precision and a `Z` suffix.
    #[serde(rename = "timestamp")]
    pub submitted_at: String,
}

fn required(field: &Option<String>, name: &'static str) -> Result<String> {
    field.clone().ok_or(FlowError::IncompleteClaim(name))
}

impl Claim {
    /// Flatten into a [`ClaimRecord`]; fails on the first missing field.
    pub fn to_record(&self, user_id: &str) -> Result<ClaimRecord> {
        let submitted_at = self
            .submitted_at
            .ok_or(FlowError::IncompleteClaim("submitted_at"))?;
        Ok(ClaimRecord {
            user_id: user_id.to_string(),
            problem_id: required(&self.problem_id, "problem_id")?,
            problem_name: required(&self.problem_name, "problem_name")?,
            machine_number: required(&self.machine_number, "machine_number")?,
            location: required(&self.location, "location")?,
            customer_name: required(&self.customer_name, "customer_name")?,
            customer_phone: required(&self.customer_phone, "customer_phone")?,
            lost_amount: required(&self.lost_amount, "lost_amount")?,
            bank_name: required(&self.bank_name, "bank_name")?,
            account_number: required(&self.account_number, "account_number")?,
            account_name: required(&self.account_name, "account_name")?,
            submitted_at: submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

/// Per-user conversation state.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub user_id: String,
    pub step: Step,
    pub claim: Claim,
    pub last_active: Instant,
}

impl ConversationSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            step: Step::Start,
            claim: Claim::default(),
            last_active: Instant::now(),
        }
    }

    /// Back to `{Start, empty claim}`.
    pub fn reset(&mut self) {
        self.step = Step::Start;
        self.claim = Claim::default();
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_claim() -> Claim {
        Claim {
            problem_id: Some("1".into()),
            problem_name: Some("coin".into()),
            remediation_steps: vec!["a".into()],
            remediation_index: None,
            machine_number: Some("A001".into()),
            location: Some("Siam branch 00123".into()),
            customer_name: Some("Somchai".into()),
            customer_phone: Some("081-234-5678".into()),
            lost_amount: Some("40".into()),
            bank_name: Some("KBank".into()),
            account_number: Some("123-4-56789-0".into()),
            account_name: Some("Somchai J".into()),
            submitted_at: Some(Utc::now()),
        }
    }

    #[test]
    fn record_is_flat_camel_case() {
        let record = full_claim().to_record("U1").unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userId"], "U1");
        assert_eq!(value["machineNumber"], "A001");
        assert_eq!(value["accountName"], "Somchai J");
        assert!(value.as_object().unwrap().values().all(|v| v.is_string()));
    }

    #[test]
    fn record_uses_spreadsheet_column_keys() {
        let mut claim = full_claim();
        claim.submitted_at = Some(
            DateTime::parse_from_rfc3339("2026-03-01T08:15:30.250Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        let value = serde_json::to_value(claim.to_record("U1").unwrap()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(value["problemType"], "1");
        assert_eq!(value["problemName"], "coin");
        assert_eq!(value["timestamp"], "2026-03-01T08:15:30.250Z");
        assert!(!object.contains_key("problemId"));
        assert!(!object.contains_key("submittedAt"));
    }

    #[test]
    fn incomplete_claim_names_missing_field() {
        let mut claim = full_claim();
        claim.location = None;
        assert!(matches!(
            claim.to_record("U1"),
            Err(FlowError::IncompleteClaim("location"))
        ));
    }

    #[test]
    fn reset_clears_step_and_claim() {
        let mut session = ConversationSession::new("U1");
        session.step = Step::Evidence;
        session.claim = full_claim();
        session.reset();
        assert_eq!(session.step, Step::Start);
        assert_eq!(session.claim, Claim::default());
        assert_eq!(session.user_id, "U1");
    }

    #[test]
    fn step_names_match_serde_names() {
        for step in Step::ALL {
            let value = serde_json::to_value(step).unwrap();
            assert_eq!(value, step.as_str());
        }
    }
}
