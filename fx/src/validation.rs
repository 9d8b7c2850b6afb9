//! Input guards run before any provider call.

use ratematch_common::TenantId;

use crate::conversion::ConversionRequest;
use crate::error::{ConversionError, FxResult};

/// Reject empty or oversized batches.
pub fn validate_batch(requests: &[ConversionRequest], max_batch_size: usize) -> FxResult<()> {
    if requests.is_empty() {
        return Err(ConversionError::InvalidParameters(
            "conversion request list is empty".to_string(),
        ));
    }

    if requests.len() > max_batch_size {
        return Err(ConversionError::InvalidParameters(format!(
            "{} conversion requests exceed the maximum of {}",
            requests.len(),
            max_batch_size
        )));
    }

    Ok(())
}

/// Reject a blank tenant.
pub fn validate_tenant(tenant: &TenantId) -> FxResult<()> {
    if !tenant.is_valid() {
        return Err(ConversionError::MissingTenant);
    }
    Ok(())
}

/// Reject a request without a rate type or with blank currencies.
pub fn validate_request(request: &ConversionRequest) -> FxResult<()> {
    if request.rate_type.trim().is_empty() {
        return Err(ConversionError::InvalidParameters(format!(
            "request {} has no rate type",
            request.id
        )));
    }

    if request.from_currency.code().is_empty() || request.to_currency.code().is_empty() {
        return Err(ConversionError::InvalidParameters(format!(
            "request {} has a blank currency",
            request.id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ratematch_common::Currency;
    use rust_decimal_macros::dec;

    fn request(rate_type: &str) -> ConversionRequest {
        ConversionRequest::new(Currency::usd(), Currency::eur(), dec!(1), rate_type, Utc::now())
    }

    #[test]
    fn test_batch_bounds() {
        assert!(matches!(
            validate_batch(&[], 10),
            Err(ConversionError::InvalidParameters(_))
        ));

        let requests: Vec<_> = (0..3).map(|_| request("M")).collect();
        assert!(validate_batch(&requests, 3).is_ok());
        assert!(matches!(
            validate_batch(&requests, 2),
            Err(ConversionError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_tenant() {
        assert!(validate_tenant(&TenantId::new("acme")).is_ok());
        assert_eq!(
            validate_tenant(&TenantId::new(" ")),
            Err(ConversionError::MissingTenant)
        );
    }

    #[test]
    fn test_request() {
        assert!(validate_request(&request("M")).is_ok());
        assert!(validate_request(&request("")).is_err());

        let mut blank = request("M");
        blank.to_currency = Currency::new("");
        assert!(validate_request(&blank).is_err());
    }
}
