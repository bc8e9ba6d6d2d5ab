//! Application wiring
//!
//! [`CrmApp`] receives its backends by injection and follows the session
//! watch channel: signing in mounts a [`Workspace`] for that user, signing
//! out (or switching user) closes it and every subscription it holds.
//!
//! ```rust,ignore
//! let app = Arc::new(CrmApp::new(config, auth.clone(), store));
//! let runner = tokio::spawn({
//!     let app = app.clone();
//!     async move { app.run_until(shutdown_signal()).await }
//! });
//!
//! auth.sign_in("ana@example.com", "secret1").await?;
//! let workspace = app.wait_for_workspace().await;
//! workspace.clients().add(&Client::new("Acme", "B123")).await;
//! ```

use crate::billing::RecurringPaymentGenerator;
use crate::config::{AppSettings, CrmConfig};
use crate::core::auth::{AuthProvider, Session};
use crate::core::clock::{Clock, SystemClock};
use crate::core::service::DocumentStore;
use crate::entities::{Client, Notification, Payment, Task, TaxFiling};
use crate::repository::Repositories;
use crate::sections::drive::{self, DriveIndex};
use crate::sections::{DashboardStats, SectionActions};
use crate::sync::{RealtimeSync, ViewState};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Everything mounted for one signed-in user
///
/// Cheap to clone; all clones share the same subscriptions.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<WorkspaceInner>,
}

struct WorkspaceInner {
    session: Session,
    settings: AppSettings,
    clock: Arc<dyn Clock>,
    repos: Repositories,
    sync: Arc<RealtimeSync>,
    generator: Arc<RecurringPaymentGenerator>,
    generator_task: Mutex<Option<JoinHandle<()>>>,
    clients: SectionActions<Client>,
    payments: SectionActions<Payment>,
    taxes: SectionActions<TaxFiling>,
    tasks: SectionActions<Task>,
    notifications: SectionActions<Notification>,
}

impl Workspace {
    /// Open the five subscriptions and start the payment generator
    pub fn open(
        session: Session,
        store: Arc<dyn DocumentStore>,
        app_id: &str,
        settings: AppSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let repos = Repositories::new(store, app_id, &session.user_id);
        let sync = Arc::new(RealtimeSync::open(&repos));
        let generator = Arc::new(RecurringPaymentGenerator::new(settings.locale));
        let generator_task = generator.clone().spawn_reactive(
            repos.payments.clone(),
            sync.view(),
            clock.clone(),
        );

        tracing::info!(user_id = %session.user_id, "Workspace mounted");

        Self {
            inner: Arc::new(WorkspaceInner {
                clients: SectionActions::new(repos.clients.clone(), sync.clone()),
                payments: SectionActions::new(repos.payments.clone(), sync.clone()),
                taxes: SectionActions::new(repos.taxes.clone(), sync.clone()),
                tasks: SectionActions::new(repos.tasks.clone(), sync.clone()),
                notifications: SectionActions::new(repos.notifications.clone(), sync.clone()),
                session,
                settings,
                clock,
                repos,
                sync,
                generator,
                generator_task: Mutex::new(Some(generator_task)),
            }),
        }
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn settings(&self) -> &AppSettings {
        &self.inner.settings
    }

    pub fn repositories(&self) -> &Repositories {
        &self.inner.repos
    }

    pub fn view(&self) -> watch::Receiver<ViewState> {
        self.inner.sync.view()
    }

    pub fn snapshot(&self) -> ViewState {
        self.inner.sync.snapshot()
    }

    /// Wait until every collection has loaded or failed
    pub async fn loaded(&self) -> ViewState {
        self.wait_for(|state| !state.is_loading()).await
    }

    /// Wait until the view satisfies `condition`
    ///
    /// Returns the last state seen if the workspace closes first.
    pub async fn wait_for<F>(&self, mut condition: F) -> ViewState
    where
        F: FnMut(&ViewState) -> bool,
    {
        let mut view = self.view();
        if let Ok(state) = view.wait_for(|state| condition(state)).await {
            return state.clone();
        }
        view.borrow().clone()
    }

    pub fn clients(&self) -> &SectionActions<Client> {
        &self.inner.clients
    }

    pub fn payments(&self) -> &SectionActions<Payment> {
        &self.inner.payments
    }

    pub fn taxes(&self) -> &SectionActions<TaxFiling> {
        &self.inner.taxes
    }

    pub fn tasks(&self) -> &SectionActions<Task> {
        &self.inner.tasks
    }

    pub fn notifications(&self) -> &SectionActions<Notification> {
        &self.inner.notifications
    }

    pub fn dashboard(&self) -> DashboardStats {
        DashboardStats::compute(&self.snapshot())
    }

    pub fn drive_index(&self) -> DriveIndex {
        drive::index(&self.snapshot(), &self.inner.settings.drive_folder_base_url)
    }

    /// Run the generator now, outside the reactive loop
    pub async fn generate_payments(&self) -> Vec<String> {
        let view = self.view();
        self.inner
            .generator
            .run(&self.inner.repos.payments, &view, self.inner.clock.today())
            .await
    }

    /// Stop the generator and release every subscription
    ///
    /// Idempotent. Clones of a closed workspace keep their last view.
    pub async fn close(&self) {
        let task = match self.inner.generator_task.lock() {
            Ok(mut task) => task.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            task.abort();
            let _ = task.await;
        }
        self.inner.sync.close().await;
        tracing::info!(user_id = %self.inner.session.user_id, "Workspace closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.sync.open_subscriptions() == 0
    }
}

impl Drop for WorkspaceInner {
    fn drop(&mut self) {
        if let Ok(mut task) = self.generator_task.lock() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
    }
}

/// Top-level application: injected backends plus the mounted workspace
pub struct CrmApp {
    config: CrmConfig,
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    mounted: tokio::sync::Mutex<Option<Workspace>>,
    mounted_user: watch::Sender<Option<String>>,
}

impl CrmApp {
    pub fn new(
        config: CrmConfig,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let (mounted_user, _) = watch::channel(None);
        Self {
            config,
            auth,
            store,
            clock: Arc::new(SystemClock),
            mounted: tokio::sync::Mutex::new(None),
            mounted_user,
        }
    }

    /// Replace the wall clock (simulations, tests)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &CrmConfig {
        &self.config
    }

    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    /// The mounted workspace, if a user is signed in
    pub async fn workspace(&self) -> Option<Workspace> {
        self.mounted.lock().await.clone()
    }

    /// User id of the mounted workspace, as it changes
    pub fn watch_mounted(&self) -> watch::Receiver<Option<String>> {
        self.mounted_user.subscribe()
    }

    /// Wait until some workspace is mounted
    pub async fn wait_for_workspace(&self) -> Option<Workspace> {
        let mut mounted = self.watch_mounted();
        mounted.wait_for(Option::is_some).await.ok()?;
        self.workspace().await
    }

    /// Mount a workspace for `session`, closing any other one first
    ///
    /// Mounting the user that is already mounted returns the same workspace.
    pub async fn mount(&self, session: Session) -> Workspace {
        let mut mounted = self.mounted.lock().await;
        if let Some(current) = mounted
            .as_ref()
            .filter(|current| current.session().user_id == session.user_id)
        {
            return current.clone();
        }

        Self::close_mounted(&mut mounted).await;
        let workspace = Workspace::open(
            session,
            self.store.clone(),
            &self.config.backend.app_id,
            self.config.settings.clone(),
            self.clock.clone(),
        );
        *mounted = Some(workspace.clone());
        self.mounted_user
            .send_replace(Some(workspace.session().user_id.clone()));
        workspace
    }

    /// Close the mounted workspace, if any
    pub async fn unmount(&self) {
        let mut mounted = self.mounted.lock().await;
        if Self::close_mounted(&mut mounted).await {
            self.mounted_user.send_replace(None);
        }
    }

    /// Bring the mounted workspace in line with `session`
    pub async fn reconcile(&self, session: Option<Session>) -> Option<Workspace> {
        match session {
            Some(session) => Some(self.mount(session).await),
            None => {
                self.unmount().await;
                None
            }
        }
    }

    /// Follow the session until `shutdown` resolves, then unmount
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut sessions = self.auth.watch_session();
        tokio::pin!(shutdown);

        loop {
            let session = sessions.borrow_and_update().clone();
            self.reconcile(session).await;

            tokio::select! {
                _ = &mut shutdown => break,
                changed = sessions.changed() => {
                    if changed.is_err() {
                        tracing::warn!("Session channel closed");
                        break;
                    }
                }
            }
        }

        self.unmount().await;
    }

    async fn close_mounted(mounted: &mut Option<Workspace>) -> bool {
        match mounted.take() {
            Some(previous) => {
                previous.close().await;
                true
            }
            None => false,
        }
    }
}
