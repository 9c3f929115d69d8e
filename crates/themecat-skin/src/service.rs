//! The theme service: owns the bootstrap projection, the published
//! snapshot, and the discovery snapshots, and is the only writer of the
//! catalog.
//!
//! Mutating operations take `&mut self`; share a service across threads by
//! wrapping it in a `Mutex`.

use std::sync::Arc;

use themecat_net::RemoteTransport;
use themecat_types::error::{CatalogError, Result};

use crate::bootstrap::{BootstrapDefinition, bootstrap_theme};
use crate::bundle::ResourceBundle;
use crate::events::{CatalogEvent, EventBus, Observer};
use crate::model::{Catalog, CatalogPatch, SkinHeader, Theme, ThemeHeader};
use crate::publish::PublishedState;
use crate::resolve::PlaceholderPolicy;
use crate::store::CatalogStore;

pub struct ThemeService {
    pub(crate) store: Box<dyn CatalogStore>,
    pub(crate) bundle: Box<dyn ResourceBundle>,
    pub(crate) transport: Box<dyn RemoteTransport>,
    pub(crate) events: EventBus,
    pub(crate) policy: PlaceholderPolicy,
    /// Active wallet; empty until one is selected.
    pub(crate) wallet_id: String,
    /// Output of the last successful bootstrap.
    pub(crate) bootstrap_themes: Vec<Theme>,
    pub(crate) published: Option<Arc<PublishedState>>,
    pub(crate) discovered_themes: Vec<ThemeHeader>,
    pub(crate) discovered_skins: Vec<SkinHeader>,
}

impl ThemeService {
    pub fn new(
        store: impl CatalogStore + 'static,
        bundle: impl ResourceBundle + 'static,
        transport: impl RemoteTransport + 'static,
    ) -> Self {
        Self {
            store: Box::new(store),
            bundle: Box::new(bundle),
            transport: Box::new(transport),
            events: EventBus::new(),
            policy: PlaceholderPolicy::default(),
            wallet_id: String::new(),
            bootstrap_themes: Vec::new(),
            published: None,
            discovered_themes: Vec::new(),
            discovered_skins: Vec::new(),
        }
    }

    pub fn with_placeholder_policy(mut self, policy: PlaceholderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register an observer for events, snapshots, and toasts.
    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.events.subscribe(Box::new(observer));
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Bootstrap the built-in theme, then build and publish the catalog.
    ///
    /// A bootstrap failure returns before the store is read; no observer
    /// hears about it.
    pub fn init(&mut self, definition: &BootstrapDefinition) -> Result<Arc<PublishedState>> {
        self.bootstrap(definition)?;
        let state = self.build_catalog()?;
        log::info!(
            "Theme service initialized: {}/{}",
            state.theme().header.name,
            state.skin().header.name
        );
        Ok(state)
    }

    /// Load the built-in theme as the sole entry of a fresh theme list and
    /// make it the (transient) published state.
    pub fn bootstrap(&mut self, definition: &BootstrapDefinition) -> Result<Arc<PublishedState>> {
        let theme = bootstrap_theme(&*self.bundle, definition, self.policy)?;
        let skin_id = theme.header.default_skin_id;
        let state = Arc::new(PublishedState::new(
            vec![theme.clone()],
            0,
            skin_id,
            self.wallet_id.as_str(),
        )?);
        self.bootstrap_themes = vec![theme];
        self.published = Some(Arc::clone(&state));
        Ok(state)
    }

    /// Reconcile the store with the bootstrap output. An empty persisted
    /// catalog is seeded from the bootstrap theme list; otherwise the
    /// persisted catalog wins and is published as it is.
    pub fn build_catalog(&mut self) -> Result<Arc<PublishedState>> {
        let first_run = self
            .store
            .get()
            .map(|catalog| catalog.themes.is_empty())
            .map_err(|e| self.events.device_error(e))?;

        if first_run {
            if self.bootstrap_themes.is_empty() {
                return Err(CatalogError::Load(
                    "catalog is empty and no theme was bootstrapped".to_string(),
                ));
            }
            log::info!("Initializing theme catalog");
            self.write(CatalogPatch {
                theme_id: Some(0),
                themes: Some(self.bootstrap_themes.clone()),
                ..CatalogPatch::default()
            })?;
            self.events.emit(CatalogEvent::CatalogUpdated);
        } else {
            log::debug!(
                "Using persisted catalog ({} themes)",
                self.store.get_sync().themes.len()
            );
        }
        self.publish()
    }

    /// Rebuild the snapshot from the cached catalog for the active wallet
    /// and deliver it to observers.
    pub fn publish(&mut self) -> Result<Arc<PublishedState>> {
        let state = Arc::new(PublishedState::from_catalog(
            self.store.get_sync(),
            &self.wallet_id,
        )?);
        log::debug!(
            "Published theme/skin: {}/{} [walletId: {}]",
            state.theme().header.name,
            state.skin().header.name,
            self.wallet_id
        );
        self.published = Some(Arc::clone(&state));
        self.events.publish(&state);
        Ok(state)
    }

    /// Persist `patch`, reporting a failure as a device error.
    pub(crate) fn write(&mut self, patch: CatalogPatch) -> Result<()> {
        self.store
            .set(patch)
            .map_err(|e| self.events.device_error(e))
    }

    // -- Catalog getters ----------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        self.store.get_sync()
    }

    pub fn catalog_themes(&self) -> &[Theme] {
        &self.catalog().themes
    }

    pub fn catalog_theme(&self) -> Option<&Theme> {
        self.catalog().current_theme()
    }

    pub fn catalog_theme_id(&self) -> usize {
        self.catalog().theme_id
    }

    /// Skin id of the active wallet.
    pub fn catalog_skin_id(&self) -> Option<usize> {
        self.catalog_skin_id_for_wallet(&self.wallet_id)
    }

    pub fn catalog_skin_id_for_wallet(&self, wallet_id: &str) -> Option<usize> {
        self.resolve_skin_for_wallet(wallet_id)
    }

    // -- Published and ephemeral state --------------------------------------

    /// The last published snapshot, if any.
    pub fn published(&self) -> Option<Arc<PublishedState>> {
        self.published.clone()
    }

    pub fn wallet_id(&self) -> &str {
        &self.wallet_id
    }

    pub fn bootstrap_themes(&self) -> &[Theme] {
        &self.bootstrap_themes
    }

    /// Theme headers from the most recent successful discovery.
    pub fn discovered_themes(&self) -> &[ThemeHeader] {
        &self.discovered_themes
    }

    /// Skin headers from the most recent successful discovery.
    pub fn discovered_skins(&self) -> &[SkinHeader] {
        &self.discovered_skins
    }
}
