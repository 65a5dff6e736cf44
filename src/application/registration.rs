use crate::domain::payment::{
    ActorId, ItemContext, PaymentId, PaymentRecord, PaymentState, Provider,
};
use crate::domain::validation::InputValidator;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};

/// Request to record a new payment in `CREATED` state.
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Generated when absent.
    pub id: Option<PaymentId>,
    pub payer_id: ActorId,
    pub payee_id: ActorId,
    pub provider: Provider,
    pub expected_amount_cents: i64,
    pub note: String,
    pub item: Option<ItemContext>,
}

/// Validates a creation request and builds the record to insert.
pub fn build_record(
    request: NewPayment,
    validator: &InputValidator,
    created_at: DateTime<Utc>,
) -> Result<PaymentRecord> {
    if request.payer_id == request.payee_id {
        return Err(PaymentError::ValidationError(
            "Payer and payee must be different parties".to_string(),
        ));
    }
    let expected_amount_cents = validator.creation_amount(request.expected_amount_cents)?;
    let note = validator.note(&request.note)?;
    let item = request
        .item
        .map(|item| -> Result<ItemContext> {
            let id = validator
                .reference(Some(&item.id), "Item id")?
                .ok_or_else(|| {
                    PaymentError::ValidationError("Item id must not be blank".to_string())
                })?;
            Ok(ItemContext {
                id,
                name: validator.note(&item.name)?,
                description: item
                    .description
                    .as_deref()
                    .map(|description| validator.note(description))
                    .transpose()?,
            })
        })
        .transpose()?;

    Ok(PaymentRecord {
        id: request.id.unwrap_or_else(PaymentId::generate),
        payer_id: request.payer_id,
        payee_id: request.payee_id,
        provider: request.provider,
        expected_amount_cents,
        note,
        item,
        created_at,
        state: PaymentState::Created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentStatus;

    fn request() -> NewPayment {
        NewPayment {
            id: None,
            payer_id: ActorId::new("parent"),
            payee_id: ActorId::new("child"),
            provider: Provider::Cashapp,
            expected_amount_cents: 2500,
            note: " new  shoes ".to_string(),
            item: Some(ItemContext {
                id: "item-7".to_string(),
                name: "Running shoes".to_string(),
                description: Some("size 9\n".to_string()),
            }),
        }
    }

    #[test]
    fn test_build_record_sanitizes_and_starts_created() {
        let record = build_record(request(), &InputValidator::default(), Utc::now()).unwrap();
        assert_eq!(record.status(), PaymentStatus::Created);
        assert_eq!(record.note, "new shoes");
        assert_eq!(record.expected_amount_cents.value(), 2500);
        assert_eq!(
            record.item.unwrap().description.as_deref(),
            Some("size 9")
        );
        assert!(!record.id.as_str().is_empty());
    }

    #[test]
    fn test_build_record_rejects_self_payment() {
        let mut req = request();
        req.payee_id = req.payer_id.clone();
        assert!(matches!(
            build_record(req, &InputValidator::default(), Utc::now()),
            Err(PaymentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_build_record_bounds_item_id() {
        let mut req = request();
        if let Some(item) = req.item.as_mut() {
            item.id = " item-7\t".to_string();
        }
        let record = build_record(req, &InputValidator::default(), Utc::now()).unwrap();
        assert_eq!(record.item.unwrap().id, "item-7");

        for bad_id in ["   ".to_string(), "x".repeat(65)] {
            let mut req = request();
            if let Some(item) = req.item.as_mut() {
                item.id = bad_id;
            }
            assert!(matches!(
                build_record(req, &InputValidator::default(), Utc::now()),
                Err(PaymentError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn test_build_record_enforces_ceiling() {
        let mut req = request();
        req.expected_amount_cents = 50_001;
        assert!(build_record(req, &InputValidator::default(), Utc::now()).is_err());
    }
}
