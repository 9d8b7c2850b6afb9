//! Per-request outcomes of a batch conversion.

use ratematch_common::RequestId;
use std::collections::HashMap;

use crate::conversion::{ConversionRequest, ConversionResult};
use crate::error::{ConversionError, FxResult};

/// One request of a batch and its outcome.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// The request as submitted.
    pub request: ConversionRequest,
    /// Its result, or the error that rejected it alone.
    pub outcome: FxResult<ConversionResult>,
}

impl BatchEntry {
    /// Whether the request converted.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Outcomes of a batch, in request order.
#[derive(Debug, Clone, Default)]
pub struct BatchConversionResult {
    entries: Vec<BatchEntry>,
    index: HashMap<RequestId, usize>,
}

impl BatchConversionResult {
    /// Build from entries in request order.
    pub fn new(entries: Vec<BatchEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.request.id, position))
            .collect();
        Self { entries, index }
    }

    /// Outcome for a request.
    pub fn get(&self, id: &RequestId) -> Option<&FxResult<ConversionResult>> {
        self.index.get(id).map(|&position| &self.entries[position].outcome)
    }

    /// Entries in request order.
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Iterate entries in request order.
    pub fn iter(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter()
    }

    /// Successful results.
    pub fn successes(&self) -> impl Iterator<Item = &ConversionResult> {
        self.entries.iter().filter_map(|entry| entry.outcome.as_ref().ok())
    }

    /// Failed requests with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&ConversionRequest, &ConversionError)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outcome.as_ref().err().map(|err| (&entry.request, err)))
    }

    /// Number of converted requests.
    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    /// Number of rejected requests.
    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    /// Number of requests in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for a batch without requests.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume into entries, keeping request order.
    pub fn into_entries(self) -> Vec<BatchEntry> {
        self.entries
    }
}

impl IntoIterator for BatchConversionResult {
    type Item = BatchEntry;
    type IntoIter = std::vec::IntoIter<BatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::ResolutionStrategy;
    use crate::rate::ExchangeRate;
    use chrono::{TimeZone, Utc};
    use ratematch_common::{to_exact, Currency, TenantId};
    use rust_decimal_macros::dec;

    fn request(from: &str, to: &str) -> ConversionRequest {
        ConversionRequest::new(
            Currency::new(from),
            Currency::new(to),
            dec!(1),
            "M",
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        )
    }

    fn converted(request: &ConversionRequest) -> ConversionResult {
        ConversionResult {
            request_id: request.id,
            resolved_rate: ExchangeRate::new(
                TenantId::new("acme"),
                "M",
                request.from_currency.clone(),
                request.to_currency.clone(),
                dec!(2),
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ),
            strategy: ResolutionStrategy::Direct,
            converted_amount: to_exact(dec!(2)),
            rounded_amount: to_exact(dec!(2.00)),
        }
    }

    #[test]
    fn test_counts_and_lookup() {
        let ok = request("USD", "EUR");
        let failed = request("USD", "XXY");
        let batch = BatchConversionResult::new(vec![
            BatchEntry {
                request: ok.clone(),
                outcome: Ok(converted(&ok)),
            },
            BatchEntry {
                request: failed.clone(),
                outcome: Err(ConversionError::UnknownCurrency("XXY".into())),
            },
        ]);

        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert_eq!(batch.success_count(), 1);
        assert_eq!(batch.failure_count(), 1);
        assert!(batch.get(&ok.id).unwrap().is_ok());
        assert!(batch.get(&failed.id).unwrap().is_err());
        assert_eq!(batch.failures().next().unwrap().0.id, failed.id);

        let ids: Vec<_> = batch.into_entries().into_iter().map(|e| e.request.id).collect();
        assert_eq!(ids, vec![ok.id, failed.id]);
    }

    #[test]
    fn test_empty_batch() {
        let batch = BatchConversionResult::default();
        assert!(batch.is_empty());
        assert_eq!(batch.failure_count(), 0);
        assert!(batch.iter().next().is_none());
    }
}
