use chrono::Utc;
use paytrack::domain::money::AmountCents;
use paytrack::domain::payment::{ActorId, PaymentId, PaymentRecord, PaymentState, Provider};
use paytrack::domain::ports::{Mutation, PaymentStoreBox};
use paytrack::error::Result;
use paytrack::infrastructure::in_memory::InMemoryPaymentStore;

fn record(id: &str) -> PaymentRecord {
    PaymentRecord {
        id: PaymentId::new(id),
        payer_id: ActorId::new("parent"),
        payee_id: ActorId::new("child"),
        provider: Provider::Zelle,
        expected_amount_cents: AmountCents::new(1500).unwrap(),
        note: String::new(),
        item: None,
        created_at: Utc::now(),
        state: PaymentState::Created,
    }
}

#[tokio::test]
async fn test_store_as_trait_object() {
    let store: PaymentStoreBox = Box::new(InMemoryPaymentStore::new());

    // Verify Send + Sync by spawning a task
    let handle = tokio::spawn(async move {
        store.insert(record("p-1")).await.unwrap();
        let outcome = store
            .run_transaction(&PaymentId::new("p-1"), &|_: &PaymentRecord| -> Result<Mutation> {
                Ok(Mutation::Unchanged)
            })
            .await
            .unwrap();
        assert!(!outcome.written);
        store.get(&PaymentId::new("p-1")).await.unwrap().unwrap()
    });

    let retrieved = handle.await.unwrap();
    assert_eq!(retrieved.id, PaymentId::new("p-1"));
    assert_eq!(retrieved.provider, Provider::Zelle);
}
