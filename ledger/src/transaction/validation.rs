//! Transaction validation: the state-transition guard.
//!
//! [`Validator::validate`] decides whether a transaction may be applied to a
//! UTXO set. Unlike a fail-fast verifier it runs every rule and reports
//! every violation, so one call tells the caller everything that is wrong.
//!
//! Rules, in evaluation order (order only affects the error list):
//!
//! 1. **Existence**: each input must reference a UTXO present in the set.
//! 2. **Double spend**: no UTXO may be referenced twice in one transaction.
//! 3. **Signature**: each found input must be signed by the UTXO's
//!    *recorded* owner over the transaction's signing payload.
//! 4. **Positive amounts**: every output must carry a positive amount
//!    (zero is configurable via [`ValidationConfig`]).
//! 5. **Conservation**: found inputs must sum to exactly the outputs.
//!    Skipped when no input was found.
//! 6. **Fresh outputs**: no output id `{ tx.id, i }` may already be in the
//!    set. Applying would otherwise overwrite an unspent UTXO.
//! 7. **Structure**: at least one input and one output.
//!
//! Validation is a pure function of the transaction and the set view. It
//! never mutates, never reads the clock, and never draws randomness.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::builder::Transaction;
use super::types::{Utxo, UtxoId};
use crate::config::ValidationConfig;
use crate::crypto::{Ed25519Service, SignatureService};
use crate::pool::UtxoView;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// The rule a transaction broke.
///
/// Serialized as the stable upper-case code (`UTXO_NOT_FOUND`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    /// An input references a UTXO that is not in the set.
    UtxoNotFound,
    /// The same UTXO is referenced by more than one input.
    DoubleSpending,
    /// An input's signature does not verify against the UTXO's owner.
    InvalidSignature,
    /// An output amount is not positive.
    NegativeAmount,
    /// Input and output totals differ.
    AmountMismatch,
    /// An output's id `{ tx.id, i }` names a UTXO already in the set.
    OutputIdConflict,
    /// The transaction has no inputs.
    EmptyInputs,
    /// The transaction has no outputs.
    EmptyOutputs,
}

impl ValidationErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UtxoNotFound => "UTXO_NOT_FOUND",
            Self::DoubleSpending => "DOUBLE_SPENDING",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::AmountMismatch => "AMOUNT_MISMATCH",
            Self::OutputIdConflict => "OUTPUT_ID_CONFLICT",
            Self::EmptyInputs => "EMPTY_INPUTS",
            Self::EmptyOutputs => "EMPTY_OUTPUTS",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Structured context attached to a [`ValidationError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ErrorDetail {
    /// The offending input.
    Input {
        input_index: usize,
        utxo_ref: UtxoId,
    },
    /// The offending output.
    Output { output_index: usize, amount: u64 },
    /// Both sides of a conservation check.
    Totals { input_total: u128, output_total: u128 },
}

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorDetail>,
}

impl ValidationError {
    fn input(kind: ValidationErrorKind, input_index: usize, utxo_ref: &UtxoId, message: String) -> Self {
        Self {
            kind,
            message,
            detail: Some(ErrorDetail::Input {
                input_index,
                utxo_ref: utxo_ref.clone(),
            }),
        }
    }
}

/// The outcome of validating one transaction.
///
/// `valid` is true iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// True if any reported error has `kind`.
    pub fn has(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// Number of reported errors of `kind`.
    pub fn count(&self, kind: ValidationErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    /// Kinds of all reported errors, in report order.
    pub fn kinds(&self) -> Vec<ValidationErrorKind> {
        self.errors.iter().map(|e| e.kind).collect()
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Validates transactions against a UTXO set view.
///
/// Holds a signature service and a policy; holds no ledger state. One
/// validator can serve any number of sets and threads.
#[derive(Debug, Clone, Default)]
pub struct Validator<S = Ed25519Service> {
    service: S,
    config: ValidationConfig,
}

impl<S: SignatureService> Validator<S> {
    /// Strict validator using `service` for signature checks.
    pub fn new(service: S) -> Self {
        Self::with_config(service, ValidationConfig::default())
    }

    pub fn with_config(service: S, config: ValidationConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Runs every rule and returns every violation.
    pub fn validate<V>(&self, tx: &Transaction, view: &V) -> ValidationResult
    where
        V: UtxoView + ?Sized,
    {
        let mut errors = Vec::new();

        // 1. Existence. Missing inputs are left out of everything that
        //    needs an amount or an owner.
        let mut resolved: Vec<(usize, &Utxo)> = Vec::with_capacity(tx.inputs.len());
        for (index, input) in tx.inputs.iter().enumerate() {
            match view.get_utxo(&input.utxo_ref) {
                Some(utxo) => resolved.push((index, utxo)),
                None => errors.push(ValidationError::input(
                    ValidationErrorKind::UtxoNotFound,
                    index,
                    &input.utxo_ref,
                    format!(
                        "input {}: UTXO {} not found or already spent",
                        index, input.utxo_ref
                    ),
                )),
            }
        }

        // 2. Double spend within the transaction. Reported once per repeat,
        //    whether or not the UTXO exists.
        let mut seen: HashSet<&UtxoId> = HashSet::with_capacity(tx.inputs.len());
        for (index, input) in tx.inputs.iter().enumerate() {
            if !seen.insert(&input.utxo_ref) {
                errors.push(ValidationError::input(
                    ValidationErrorKind::DoubleSpending,
                    index,
                    &input.utxo_ref,
                    format!(
                        "input {}: UTXO {} is spent more than once in this transaction",
                        index, input.utxo_ref
                    ),
                ));
            }
        }

        // 3. Signatures, against the owner the set recorded.
        if !resolved.is_empty() {
            let payload = tx.signing_payload();
            for &(index, utxo) in &resolved {
                let input = &tx.inputs[index];
                if !self.service.verify(&payload, &input.signature, &utxo.owner) {
                    errors.push(ValidationError::input(
                        ValidationErrorKind::InvalidSignature,
                        index,
                        &input.utxo_ref,
                        format!(
                            "input {}: invalid signature for UTXO {}",
                            index, input.utxo_ref
                        ),
                    ));
                }
            }
        }

        // 4. Output amounts.
        for (index, output) in tx.outputs.iter().enumerate() {
            if output.amount == 0 && !self.config.allow_zero_amount_outputs {
                errors.push(ValidationError {
                    kind: ValidationErrorKind::NegativeAmount,
                    message: format!("output {}: amount must be positive, got 0", index),
                    detail: Some(ErrorDetail::Output {
                        output_index: index,
                        amount: output.amount,
                    }),
                });
            }
        }

        // 5. Conservation over found inputs. Each occurrence counts, so a
        //    duplicated input is judged by the double-spend rule alone.
        if !resolved.is_empty() {
            let input_total: u128 = resolved.iter().map(|(_, u)| u.amount as u128).sum();
            let output_total = tx.total_output();
            if input_total != output_total {
                errors.push(ValidationError {
                    kind: ValidationErrorKind::AmountMismatch,
                    message: format!(
                        "input amount ({}) does not equal output amount ({})",
                        input_total, output_total
                    ),
                    detail: Some(ErrorDetail::Totals {
                        input_total,
                        output_total,
                    }),
                });
            }
        }

        // 6. Output ids must not collide with anything still unspent,
        //    including this transaction's own inputs.
        for (index, output) in tx.outputs.iter().enumerate() {
            let id = UtxoId::new(tx.id.clone(), index as u32);
            if view.get_utxo(&id).is_some() {
                errors.push(ValidationError {
                    kind: ValidationErrorKind::OutputIdConflict,
                    message: format!("output {}: UTXO {} already exists", index, id),
                    detail: Some(ErrorDetail::Output {
                        output_index: index,
                        amount: output.amount,
                    }),
                });
            }
        }

        // 7. Structure.
        if tx.inputs.is_empty() {
            errors.push(ValidationError {
                kind: ValidationErrorKind::EmptyInputs,
                message: "transaction has no inputs".to_string(),
                detail: None,
            });
        }
        if tx.outputs.is_empty() {
            errors.push(ValidationError {
                kind: ValidationErrorKind::EmptyOutputs,
                message: "transaction has no outputs".to_string(),
                detail: None,
            });
        }

        let result = ValidationResult::from_errors(errors);
        if result.valid {
            tracing::debug!(tx_id = %tx.id, "transaction valid");
        } else {
            tracing::debug!(
                tx_id = %tx.id,
                errors = result.errors.len(),
                kinds = ?result.kinds(),
                "transaction rejected"
            );
        }
        result
    }
}

/// Validates with Ed25519 and the strict default policy.
pub fn validate_transaction<V>(tx: &Transaction, view: &V) -> ValidationResult
where
    V: UtxoView + ?Sized,
{
    Validator::new(Ed25519Service).validate(tx, view)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
