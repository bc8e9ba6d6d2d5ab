//! Recurring payment generation over simulated calendars
//!
//! These tests verify that:
//! - Each frequency yields the right number of payments over a year
//! - Inert clients never yield payments
//! - Repeated and overlapping runs within a month do not duplicate
//! - The reactive loop inserts the current month's payment on its own

use crm::prelude::*;
use tokio::sync::watch;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

struct Harness {
    store: InMemoryDocumentStore,
    repos: Repositories,
    sync: RealtimeSync,
    view: watch::Receiver<ViewState>,
}

impl Harness {
    async fn with_clients(clients: &[Client]) -> Self {
        let store = InMemoryDocumentStore::new();
        let repos = Repositories::new(Arc::new(store.clone()), "crm-test", "user-1");
        for client in clients {
            repos.clients.add(client).await.unwrap();
        }

        let sync = RealtimeSync::open(&repos);
        let mut view = sync.view();
        let expected = clients.len();
        view.wait_for(|s| !s.is_loading() && s.clients.len() == expected)
            .await
            .unwrap();

        Self {
            store,
            repos,
            sync,
            view,
        }
    }

    /// Run once per month of `year`, waiting for each run to be observed
    async fn simulate_year(&mut self, generator: &RecurringPaymentGenerator, year: i32) {
        for month in 1..=12 {
            let before = self.view.borrow().payments.len();
            let created = generator
                .run(&self.repos.payments, &self.view, date(year, month, 15))
                .await;
            let expected = before + created.len();
            self.view
                .wait_for(|s| s.payments.len() == expected)
                .await
                .unwrap();
        }
    }

    async fn payments(&self) -> Vec<Payment> {
        self.repos.payments.list().await.unwrap()
    }
}

// =============================================================================
// Twelve-month properties
// =============================================================================

mod yearly {
    use super::*;

    #[tokio::test]
    async fn test_monthly_client_yields_twelve_payments() {
        let client = Client::new("Acme", "B1").with_billing(50.0, BillingFrequency::Monthly);
        let mut harness = Harness::with_clients(&[client]).await;
        let generator = RecurringPaymentGenerator::new(Locale::En);

        harness.simulate_year(&generator, 2026).await;

        let payments = harness.payments().await;
        assert_eq!(payments.len(), 12);
        assert!(payments.iter().all(|p| p.amount == 50.0));
        assert!(payments.iter().all(|p| p.status == PaymentStatus::Pending));

        let mut months: Vec<_> = payments.iter().map(|p| p.due_date).collect();
        months.sort();
        months.dedup();
        assert_eq!(months.len(), 12);

        harness.sync.close().await;
    }

    #[tokio::test]
    async fn test_quarterly_client_yields_four_payments() {
        let client = Client::new("Beta", "B2").with_billing(120.0, BillingFrequency::Quarterly);
        let mut harness = Harness::with_clients(&[client]).await;
        let generator = RecurringPaymentGenerator::new(Locale::En);

        harness.simulate_year(&generator, 2026).await;

        let payments = harness.payments().await;
        let mut months: Vec<_> = payments.iter().map(|p| p.month.as_str()).collect();
        months.sort();
        assert_eq!(months, vec!["April", "January", "July", "October"]);

        harness.sync.close().await;
    }

    #[tokio::test]
    async fn test_annual_client_yields_one_january_payment() {
        let client = Client::new("Gamma", "B3").with_billing(600.0, BillingFrequency::Annual);
        let mut harness = Harness::with_clients(&[client]).await;
        let generator = RecurringPaymentGenerator::new(Locale::En);

        harness.simulate_year(&generator, 2026).await;

        let payments = harness.payments().await;
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].month, "January");
        assert_eq!(payments[0].due_date, date(2026, 1, 1));

        harness.sync.close().await;
    }

    #[tokio::test]
    async fn test_inert_clients_never_yield_payments() {
        let mut no_fee = Client::new("No fee", "B4");
        no_fee.billing_frequency = Some(BillingFrequency::Monthly);
        let mut no_frequency = Client::new("No frequency", "B5");
        no_frequency.fee = Some(80.0);

        let mut harness = Harness::with_clients(&[no_fee, no_frequency]).await;
        let generator = RecurringPaymentGenerator::new(Locale::En);

        harness.simulate_year(&generator, 2026).await;

        assert!(harness.payments().await.is_empty());
        harness.sync.close().await;
    }

    #[tokio::test]
    async fn test_mixed_clients_over_a_year() {
        let clients = [
            Client::new("Monthly", "M").with_billing(10.0, BillingFrequency::Monthly),
            Client::new("Quarterly", "Q").with_billing(20.0, BillingFrequency::Quarterly),
            Client::new("Annual", "A").with_billing(30.0, BillingFrequency::Annual),
        ];
        let mut harness = Harness::with_clients(&clients).await;
        let generator = RecurringPaymentGenerator::new(Locale::Es);

        harness.simulate_year(&generator, 2026).await;

        let payments = harness.payments().await;
        assert_eq!(payments.len(), 12 + 4 + 1);
        assert!(payments.iter().any(|p| p.month == "Enero" && p.amount == 30.0));

        harness.sync.close().await;
    }
}

// =============================================================================
// Idempotence
// =============================================================================

mod idempotence {
    use super::*;

    #[tokio::test]
    async fn test_march_example() {
        let client = Client::new("Acme", "B1").with_billing(50.0, BillingFrequency::Monthly);
        let harness = Harness::with_clients(&[client]).await;
        let generator = RecurringPaymentGenerator::new(Locale::En);

        let created = generator
            .run(&harness.repos.payments, &harness.view, date(2026, 3, 9))
            .await;
        assert_eq!(created.len(), 1);

        let payment = &harness.payments().await[0];
        let fields = serde_json::to_value(payment).unwrap();
        assert_eq!(fields["amount"], 50.0);
        assert_eq!(fields["status"], "Pending");
        assert_eq!(fields["month"], "March");
        assert_eq!(fields["dueDate"], "2026-03-01");
        assert_eq!(fields["year"], 2026);

        harness.sync.close().await;
    }

    #[tokio::test]
    async fn test_second_run_after_refresh_inserts_nothing() {
        let client = Client::new("Acme", "B1").with_billing(50.0, BillingFrequency::Monthly);
        let mut harness = Harness::with_clients(&[client]).await;
        let generator = RecurringPaymentGenerator::new(Locale::En);
        let today = date(2026, 5, 2);

        generator.run(&harness.repos.payments, &harness.view, today).await;
        harness
            .view
            .wait_for(|s| s.payments.len() == 1)
            .await
            .unwrap();

        let again = generator.run(&harness.repos.payments, &harness.view, today).await;
        assert!(again.is_empty());
        assert_eq!(harness.payments().await.len(), 1);

        harness.sync.close().await;
    }

    #[tokio::test]
    async fn test_overlapping_runs_before_refresh_insert_once() {
        let client = Client::new("Acme", "B1").with_billing(50.0, BillingFrequency::Monthly);
        let harness = Harness::with_clients(&[client]).await;
        let generator = RecurringPaymentGenerator::new(Locale::En);
        let today = date(2026, 6, 1);

        let (first, second) = tokio::join!(
            generator.run(&harness.repos.payments, &harness.view, today),
            generator.run(&harness.repos.payments, &harness.view, today),
        );

        assert_eq!(first.len() + second.len(), 1);
        assert_eq!(harness.payments().await.len(), 1);

        harness.sync.close().await;
    }

    #[tokio::test]
    async fn test_existing_manual_payment_counts() {
        let client = Client::new("Acme", "B1").with_billing(50.0, BillingFrequency::Monthly);
        let mut harness = Harness::with_clients(&[client]).await;
        let client_id = harness.view.borrow().clients[0].id.clone();

        // Entered by hand with a different amount
        harness
            .repos
            .payments
            .add(&Payment::pending(&client_id, 45.0, date(2026, 7, 10), "July", 2026))
            .await
            .unwrap();
        harness
            .view
            .wait_for(|s| s.payments.len() == 1)
            .await
            .unwrap();

        let generator = RecurringPaymentGenerator::new(Locale::En);
        let created = generator
            .run(&harness.repos.payments, &harness.view, date(2026, 7, 20))
            .await;
        assert!(created.is_empty());

        harness.sync.close().await;
    }

    #[tokio::test]
    async fn test_failed_insert_is_retried_next_run() {
        let client = Client::new("Acme", "B1").with_billing(50.0, BillingFrequency::Monthly);
        let harness = Harness::with_clients(&[client]).await;
        let generator = RecurringPaymentGenerator::new(Locale::En);
        let today = date(2026, 8, 3);

        harness
            .store
            .set_unavailable(harness.repos.payments.path(), true);
        assert!(
            generator
                .run(&harness.repos.payments, &harness.view, today)
                .await
                .is_empty()
        );

        harness
            .store
            .set_unavailable(harness.repos.payments.path(), false);
        let created = generator.run(&harness.repos.payments, &harness.view, today).await;
        assert_eq!(created.len(), 1);

        harness.sync.close().await;
    }
}

// =============================================================================
// Reactive generation inside a workspace
// =============================================================================

mod reactive {
    use super::*;
    use std::time::Duration;

    fn config() -> CrmConfig {
        CrmConfig::from_yaml_str(
            r#"
backend:
  api_key: key
  auth_domain: crm.example.com
  project_id: crm
  storage_bucket: crm.example.com
  messaging_sender_id: "1"
  app_id: crm-test
"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_adding_a_client_generates_current_payment_once() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let auth = Arc::new(InMemoryAuthProvider::new());
        let clock = Arc::new(FixedClock::at(2026, 3).unwrap());
        let app = CrmApp::new(config(), auth.clone(), store.clone()).with_clock(clock);

        let session = auth.sign_up("ana@example.com", "secret1").await.unwrap();
        let workspace = app.mount(session).await;
        workspace.loaded().await;

        let id = workspace
            .clients()
            .add(&Client::new("Acme", "B1").with_billing(50.0, BillingFrequency::Monthly))
            .await
            .unwrap();

        let view = workspace.wait_for(|v| v.payments.len() == 1).await;
        assert_eq!(view.payments[0].client_id, id);
        assert_eq!(view.payments[0].month, "March");

        // More client changes re-trigger the generator without duplicating
        let patch = ClientPatch {
            phone: Some(Some("600000000".to_string())),
            ..Default::default()
        };
        assert!(workspace.clients().update(&id, &patch).await);
        workspace
            .wait_for(|v| v.clients[0].phone.is_some())
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let payments = workspace.repositories().payments.list().await.unwrap();
        assert_eq!(payments.len(), 1);

        workspace.close().await;
    }
}
