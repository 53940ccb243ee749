//! Transaction mutation pipeline: validate, resolve, normalize, apply.
//!
//! Public payloads reference accounts and categories by name and carry
//! decimal amounts; everything is resolved to ids and minor units before
//! the engine sees it, and shaped back for the response. Reads after a
//! write never come from a single-record engine accessor: the response is
//! built by merging the applied patch onto the known prior record.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::engine::LedgerEngine;
use crate::error::{BridgeError, BridgeResult};
use crate::money;
use crate::services::entity_resolver::{EntityResolver, NameIndex};
use crate::services::idempotency::{Claim, IdempotencyRegistry};
use crate::types::{
    DeleteReceipt, DeletedSnapshot, EditRequest, MonthlySummary, NewTransaction, QueryFilter,
    TransactionDraft, TransactionPatch, TransactionReceipt, TransactionRecord, TransactionView,
};

/// Default result cap for queries.
const DEFAULT_QUERY_LIMIT: usize = 100;

/// A draft after name resolution and unit normalization.
struct ResolvedDraft {
    account_id: String,
    record: NewTransaction,
    view: TransactionView,
}

/// Create/update/delete/query operations over the loaded budget.
pub struct TransactionService {
    engine: Arc<dyn LedgerEngine>,
    entities: EntityResolver,
    idempotency: IdempotencyRegistry,
}

impl TransactionService {
    /// Create the pipeline over `engine`.
    #[must_use]
    pub fn new(engine: Arc<dyn LedgerEngine>) -> Self {
        Self {
            entities: EntityResolver::new(Arc::clone(&engine)),
            engine,
            idempotency: IdempotencyRegistry::new(),
        }
    }

    /// Validate and resolve a draft without writing. Never has side effects.
    pub async fn preview_add(&self, draft: &TransactionDraft) -> BridgeResult<TransactionReceipt> {
        let resolved = self.resolve_draft(draft).await?;
        Ok(TransactionReceipt {
            ok: true,
            transaction: resolved.view,
            message: "validated, nothing written".to_string(),
        })
    }

    /// Apply a create. `draft.dry_run` short-circuits after resolution with
    /// the exact shape of the real response minus the generated id.
    pub async fn apply_add(&self, draft: &TransactionDraft) -> BridgeResult<TransactionReceipt> {
        if draft.dry_run {
            let mut receipt = self.preview_add(draft).await?;
            receipt.message = "dry run, nothing written".to_string();
            return Ok(receipt);
        }

        // The key is claimed before any other await: concurrent retries
        // serialize on the claim, and a replayed key answers with the
        // originally assigned id instead of writing again.
        if let Some(key) = draft.request_id.as_deref() {
            if let Claim::Replay(existing_id) = self.idempotency.claim(key).await {
                log::warn!("Duplicate request {key} ignored (transaction {existing_id})");
                let resolved = self.resolve_draft(draft).await?;
                let mut view = resolved.view;
                view.id = Some(existing_id);
                return Ok(TransactionReceipt {
                    ok: true,
                    transaction: view,
                    message: format!("duplicate request {key} ignored"),
                });
            }

            return match self.write_add(draft).await {
                Ok(receipt) => {
                    if let Some(id) = receipt.transaction.id.as_deref() {
                        self.idempotency.fulfill(key, id).await;
                    }
                    Ok(receipt)
                }
                Err(e) => {
                    // A failed write must not poison the key for retries.
                    self.idempotency.release(key).await;
                    Err(e)
                }
            };
        }

        self.write_add(draft).await
    }

    /// Resolve and write, no idempotency bookkeeping.
    async fn write_add(&self, draft: &TransactionDraft) -> BridgeResult<TransactionReceipt> {
        let resolved = self.resolve_draft(draft).await?;
        let id = self
            .engine
            .add_transaction(&resolved.account_id, &resolved.record)
            .await?;

        let mut view = resolved.view;
        view.id = Some(id);
        Ok(TransactionReceipt {
            ok: true,
            transaction: view,
            message: "transaction added".to_string(),
        })
    }

    /// Partial update. Only the supplied fields change; the returned
    /// transaction reflects the just-applied patch.
    pub async fn apply_edit(&self, id: &str, edit: &EditRequest) -> BridgeResult<TransactionReceipt> {
        if edit.is_empty() {
            return Err(BridgeError::ValidationError(
                "edit payload contains no fields to update".to_string(),
            ));
        }

        let transactions = self.engine.get_transactions().await?;
        let prior = transactions
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| BridgeError::TransactionNotFound(id.to_string()))?;

        let patch = self.resolve_edit(edit).await?;
        self.engine.update_transaction(id, &patch).await?;

        let merged = merge_patch(&prior, &patch);
        let index = self.entities.name_index().await?;
        Ok(TransactionReceipt {
            ok: true,
            transaction: view_from_record(&merged, &index),
            message: "transaction updated".to_string(),
        })
    }

    /// Delete with an existence check, returning a pre-delete snapshot.
    pub async fn apply_delete(&self, id: &str) -> BridgeResult<DeleteReceipt> {
        let transactions = self.engine.get_transactions().await?;
        let prior = transactions
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| BridgeError::TransactionNotFound(id.to_string()))?;

        let index = self.entities.name_index().await?;
        self.engine.delete_transaction(id).await?;

        Ok(DeleteReceipt {
            ok: true,
            deleted: DeletedSnapshot {
                id: prior.id.clone(),
                account: index.account_name(&prior.account),
                amount: money::to_decimal(prior.amount),
                date: prior.date,
            },
            message: format!("transaction {id} deleted"),
        })
    }

    /// Filtered, read-only scan. Unknown name filters yield an empty list,
    /// not an error. Results are newest first, capped at `limit`.
    pub async fn query(&self, filter: &QueryFilter) -> BridgeResult<Vec<TransactionView>> {
        let accounts = self.entities.accounts().await?;
        let categories = self.entities.categories().await?;

        let account_ids: Option<HashSet<String>> = match filter.accounts.clone() {
            Some(names) => {
                let ids: HashSet<String> = names
                    .into_vec()
                    .iter()
                    .filter_map(|name| EntityResolver::match_account(&accounts, name))
                    .map(|a| a.id)
                    .collect();
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                Some(ids)
            }
            None => None,
        };

        let category_id = match filter.category.as_deref() {
            Some(name) => match EntityResolver::match_category(&categories, name) {
                Some(category) => Some(category.id),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        let min_minor = filter.min_amount.map(money::to_minor_units).transpose()?;
        let max_minor = filter.max_amount.map(money::to_minor_units).transpose()?;
        let needle = filter.search.as_deref().map(str::to_lowercase);

        let mut matches: Vec<TransactionRecord> = self
            .engine
            .get_transactions()
            .await?
            .into_iter()
            .filter(|t| {
                account_ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&t.account))
            })
            .filter(|t| {
                category_id
                    .as_deref()
                    .is_none_or(|id| t.category.as_deref() == Some(id))
            })
            .filter(|t| filter.start_date.is_none_or(|d| t.date >= d))
            .filter(|t| filter.end_date.is_none_or(|d| t.date <= d))
            .filter(|t| min_minor.is_none_or(|min| t.amount >= min))
            .filter(|t| max_minor.is_none_or(|max| t.amount <= max))
            .filter(|t| {
                needle
                    .as_deref()
                    .is_none_or(|needle| text_matches(t, needle))
            })
            .collect();

        matches.sort_by(|a, b| b.date.cmp(&a.date));
        matches.truncate(filter.limit.unwrap_or(DEFAULT_QUERY_LIMIT));

        let index = NameIndex::new(&accounts, &categories);
        Ok(matches
            .iter()
            .map(|record| view_from_record(record, &index))
            .collect())
    }

    /// Transactions on or after `since`, newest first.
    pub async fn recent(&self, since: Option<NaiveDate>) -> BridgeResult<Vec<TransactionView>> {
        self.query(&QueryFilter {
            start_date: since,
            ..QueryFilter::default()
        })
        .await
    }

    /// Income/expense/net totals for `YYYY-MM`.
    pub async fn monthly_summary(&self, month: &str) -> BridgeResult<MonthlySummary> {
        if NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").is_err() {
            return Err(BridgeError::ValidationError(format!(
                "invalid month '{month}', expected YYYY-MM"
            )));
        }

        let totals = self.engine.get_budget_month(month).await?;
        let income = money::to_decimal(totals.total_income);
        let expenses = money::to_decimal(totals.total_spent.abs());
        Ok(MonthlySummary {
            month: totals.month,
            income,
            expenses,
            net: income - expenses,
        })
    }

    async fn resolve_draft(&self, draft: &TransactionDraft) -> BridgeResult<ResolvedDraft> {
        let account = self.entities.find_account(&draft.account).await?;
        let category = match draft.category.as_deref() {
            Some(name) => Some(self.entities.find_category(name).await?),
            None => None,
        };

        let minor = money::to_minor_units(draft.amount)?;
        let record = NewTransaction {
            date: draft.date,
            amount: minor,
            category: category.as_ref().map(|c| c.id.clone()),
            payee_name: draft.payee.clone(),
            notes: draft.notes.clone(),
            imported_id: draft.request_id.clone(),
        };
        let view = TransactionView {
            id: None,
            account: account.name.clone(),
            category: category.as_ref().map(|c| c.name.clone()),
            amount: money::to_decimal(minor),
            date: draft.date,
            payee: draft.payee.clone(),
            notes: draft.notes.clone(),
        };
        Ok(ResolvedDraft {
            account_id: account.id,
            record,
            view,
        })
    }

    async fn resolve_edit(&self, edit: &EditRequest) -> BridgeResult<TransactionPatch> {
        let category = match edit.category.as_deref() {
            Some(name) => Some(self.entities.find_category(name).await?.id),
            None => None,
        };
        let account = match edit.account.as_deref() {
            Some(name) => Some(self.entities.find_account(name).await?.id),
            None => None,
        };
        Ok(TransactionPatch {
            date: edit.date,
            amount: edit.amount.map(money::to_minor_units).transpose()?,
            category,
            account,
            payee_name: edit.payee.clone(),
            notes: edit.notes.clone(),
            cleared: edit.cleared,
        })
    }
}

/// Apply a patch onto the known prior record (post-write consistency:
/// never re-read through a possibly-stale single-record accessor).
fn merge_patch(prior: &TransactionRecord, patch: &TransactionPatch) -> TransactionRecord {
    let mut merged = prior.clone();
    if let Some(date) = patch.date {
        merged.date = date;
    }
    if let Some(amount) = patch.amount {
        merged.amount = amount;
    }
    if let Some(category) = patch.category.clone() {
        merged.category = Some(category);
    }
    if let Some(account) = patch.account.clone() {
        merged.account = account;
    }
    if let Some(payee) = patch.payee_name.clone() {
        merged.payee_name = Some(payee);
    }
    if let Some(notes) = patch.notes.clone() {
        merged.notes = Some(notes);
    }
    if let Some(cleared) = patch.cleared {
        merged.cleared = cleared;
    }
    merged
}

/// Shape an engine record for the public surface.
fn view_from_record(record: &TransactionRecord, index: &NameIndex) -> TransactionView {
    TransactionView {
        id: Some(record.id.clone()),
        account: index.account_name(&record.account),
        category: record.category.as_deref().and_then(|id| index.category_name(id)),
        amount: money::to_decimal(record.amount),
        date: record.date,
        payee: record.payee_name.clone(),
        notes: record.notes.clone(),
    }
}

/// Case-insensitive substring search across the text fields.
fn text_matches(record: &TransactionRecord, needle: &str) -> bool {
    [
        record.notes.as_deref(),
        record.payee_name.as_deref(),
        record.imported_payee.as_deref(),
    ]
    .iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}
