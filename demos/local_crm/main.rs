//! Local CRM walkthrough against the in-memory backends
//!
//! Run with `cargo run --example local_crm`. Set `RUST_LOG=crm=debug` to
//! watch subscriptions open and close.

use anyhow::Result;
use crm::prelude::*;
use crm::sections::{circulars, clients, payments, tasks};

fn demo_config() -> Result<CrmConfig> {
    let yaml = r#"
backend:
  api_key: demo-key
  auth_domain: demo-crm.example.com
  project_id: demo-crm
  storage_bucket: demo-crm.example.com
  messaging_sender_id: "0"
  app_id: demo-crm
settings:
  locale: en
"#;
    Ok(CrmConfig::from_yaml_str(yaml)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    crm::telemetry::init_tracing("info");

    let config = demo_config()?;
    let store = Arc::new(InMemoryDocumentStore::with_event_capacity(
        config.settings.event_capacity,
    ));
    let auth = Arc::new(InMemoryAuthProvider::new());
    let clock = Arc::new(
        FixedClock::at(2026, 1).ok_or_else(|| anyhow::anyhow!("invalid start date"))?,
    );

    let app = CrmApp::new(config, auth.clone(), store.clone()).with_clock(clock.clone());

    println!("🔐 Signing up...");
    let session = auth.sign_up("ana@example.com", "secret1").await?;
    let workspace = app.mount(session).await;
    workspace.loaded().await;

    println!("👥 Adding clients...");
    let mut acme = Client::new("Acme Ltd", "B12345678")
        .with_email("billing@acme.example")
        .with_billing(50.0, BillingFrequency::Monthly)
        .with_drive_folder("1AcmeFolder");
    acme.set_tax_form("303", true);
    let quarterly = Client::new("Beta Studio", "B87654321")
        .with_billing(120.0, BillingFrequency::Quarterly);
    let annual = Client::new("Álvarez y Asociados", "B11223344")
        .with_billing(600.0, BillingFrequency::Annual);

    for client in [&acme, &quarterly, &annual] {
        workspace.clients().add(client).await;
    }
    let view = workspace.wait_for(|v| v.clients.len() == 3).await;
    for row in clients::rows(&view, "") {
        println!("   {} ({}) {}", row.name, row.tax_id, row.billing.unwrap_or_default());
    }

    println!("📅 Simulating a year of billing...");
    for month in 0..12 {
        if month > 0 {
            clock.advance_month();
        }
        workspace.generate_payments().await;
    }
    // 12 monthly + 4 quarterly + 1 annual
    let view = workspace.wait_for(|v| v.payments.len() == 17).await;
    let pending = payments::PaymentFilter {
        status: Some(PaymentStatus::Pending),
        ..Default::default()
    };
    println!("   {} pending payments", payments::rows(&view, &pending).len());

    if let Some(first) = view.payments.first() {
        workspace
            .payments()
            .update(&first.id, &payments::toggle_status(first.status))
            .await;
    }

    let acme_id = view
        .clients
        .iter()
        .find(|c| c.name == "Acme Ltd")
        .map(|c| c.id.clone())
        .unwrap_or_default();
    let due = NaiveDate::from_ymd_opt(2026, 4, 20).unwrap_or_default();
    workspace
        .tasks()
        .add(&Task::new(&acme_id, "Prepare form 303 for Q1", due))
        .await;
    workspace
        .notifications()
        .add(&Notification::general("Office closed", "Closed on 1 May"))
        .await;

    let view = workspace
        .wait_for(|v| v.tasks.len() == 1 && v.notifications.len() == 1)
        .await;
    let stats = DashboardStats::compute(&view);
    println!("\n📊 Dashboard");
    println!("   Clients:          {}", stats.client_count);
    println!("   Paid total:       {:.2}", stats.paid_total);
    println!("   Pending payments: {}", stats.pending_payments);
    println!("   Open tasks:       {}", stats.open_tasks);

    for row in tasks::rows(&view, clock.today(), true) {
        println!("   task: {} for {} (overdue: {})", row.description, row.client_name, row.overdue);
    }

    let mut draft = circulars::CircularDraft::new("New rates", "Rates change in January.");
    draft.select_all(&view);
    let report = circulars::simulate_send(&draft, &view)?;
    println!("\n✉️  Circular '{}' to {} client(s)", report.subject, report.delivered.len());

    for link in workspace.drive_index().links {
        println!("📁 {} → {}", link.client_name, link.url);
    }

    if let Some(client) = view.client(&acme_id) {
        println!("\n{}", clients::print_view(client));
    }

    println!("👋 Signing out...");
    auth.sign_out().await?;
    app.reconcile(auth.current_session()).await;
    println!("   Open listeners: {}", store.listener_count());

    Ok(())
}
