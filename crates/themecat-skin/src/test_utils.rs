//! Shared test utilities for the catalog.
//!
//! Fixture documents and bundles, a scripted [`FakeTransport`], a
//! [`RecordingObserver`], and a [`FlakyStore`] whose reads and writes can be
//! made to fail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use themecat_net::RemoteTransport;
use themecat_types::error::{CatalogError, Result};
use themecat_vfs::MemoryVfs;

use crate::bootstrap::BootstrapDefinition;
use crate::bundle::VfsBundle;
use crate::events::{CatalogEvent, Observer, Toast};
use crate::model::{
    Catalog, CatalogPatch, ServiceEndpoint, Skin, SkinHeader, Theme, ThemeHeader, View,
};
use crate::publish::PublishedState;
use crate::service::ThemeService;
use crate::store::{CatalogStore, MemoryCatalogStore};

pub const SERVICE_URL: &str = "http://themes.test";
pub const BASE_URL: &str = "file:///app";

// ---------------------------------------------------------------------------
// Model fixtures
// ---------------------------------------------------------------------------

pub fn theme_with_skins(name: &str, skins: &[&str], default_skin_id: usize) -> Theme {
    Theme {
        header: ThemeHeader {
            name: name.to_string(),
            schema_version: 1,
            default_skin_id,
        },
        skins: skins
            .iter()
            .map(|s| Skin {
                header: SkinHeader {
                    name: s.to_string(),
                    schema_version: 1,
                },
                view: View::default(),
            })
            .collect(),
        view: View::default(),
    }
}

pub fn catalog_with(themes: Vec<Theme>, theme_id: usize) -> Catalog {
    Catalog {
        theme_id,
        themes,
        service: ServiceEndpoint {
            url: SERVICE_URL.to_string(),
        },
        ..Catalog::default()
    }
}

/// Catalog a fresh install starts from: no themes, test service URL.
pub fn empty_catalog() -> Catalog {
    catalog_with(Vec::new(), 0)
}

// ---------------------------------------------------------------------------
// Bundle fixtures
// ---------------------------------------------------------------------------

/// A theme document with one resource (`logo`) and optional default skin
/// name.
pub fn theme_doc(name: &str, default_skin_name: Option<&str>) -> Value {
    let mut header = json!({ "name": name, "schemaVersion": 1, "defaultSkinId": 0 });
    if let Some(skin) = default_skin_name {
        header["defaultSkinName"] = json!(skin);
    }
    json!({
        "header": header,
        "resources": ["<theme-path>/img/logo.png"],
        "view": {
            "logo": "<resource-0>",
            "notificationBarIconColor": "#fff",
            "notificationBarBackground": "#123"
        }
    })
}

pub fn skin_doc(name: &str, highlight: &str) -> Value {
    json!({
        "header": { "name": name, "schemaVersion": 1 },
        "resources": ["<skin-path>/bg.png"],
        "view": {
            "textHighlightColor": highlight,
            "background": "url(<resource-0>)"
        }
    })
}

/// Bundle from `(key, document)` pairs: `"theme"` is stored as a theme
/// document, `"theme/skin"` as a skin document.
pub fn fixture_bundle(docs: &[(&str, Value)]) -> VfsBundle<MemoryVfs> {
    let mut vfs = MemoryVfs::new();
    for (key, doc) in docs {
        let path = match key.split_once('/') {
            Some((theme, skin)) => format!("/themes/{theme}/skins/{skin}/skin.json"),
            None => format!("/themes/{key}/theme.json"),
        };
        vfs = vfs.with_file(&path, doc.to_string()).unwrap();
    }
    VfsBundle::new(vfs, BASE_URL)
}

/// The built-in theme used by most service tests: `default` with skins
/// `light` and `dark`, `dark` being the default.
pub fn default_bundle() -> VfsBundle<MemoryVfs> {
    fixture_bundle(&[
        ("default", theme_doc("default", Some("dark"))),
        ("default/light", skin_doc("light", "#111")),
        ("default/dark", skin_doc("dark", "#eee")),
    ])
}

pub fn default_definition() -> BootstrapDefinition {
    BootstrapDefinition {
        theme: "default".to_string(),
        skins: vec!["light".to_string(), "dark".to_string()],
    }
}

// ---------------------------------------------------------------------------
// Fake transport
// ---------------------------------------------------------------------------

/// Serves canned JSON by URL; unknown URLs fail like a 404.
#[derive(Clone, Default)]
pub struct FakeTransport {
    responses: Arc<Mutex<HashMap<String, Value>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `SERVICE_URL` + `path`.
    pub fn respond(&self, path: &str, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(format!("{SERVICE_URL}{path}"), body);
    }

    pub fn forget(&self, path: &str) {
        self.responses
            .lock()
            .unwrap()
            .remove(&format!("{SERVICE_URL}{path}"));
    }

    /// Every URL requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl RemoteTransport for FakeTransport {
    fn get_json(&self, url: &str) -> Result<Value> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| CatalogError::transport(url, "HTTP status 404"))
    }
}

// ---------------------------------------------------------------------------
// Recording observer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Event(CatalogEvent),
    /// Published `(theme name, skin id, wallet id)`.
    Publish(String, usize, String),
    Toast(Toast),
}

#[derive(Clone, Default)]
pub struct RecordingObserver {
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingObserver {
    pub fn all(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<CatalogEvent> {
        self.all()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Event(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.all()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Toast(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn publish_count(&self) -> usize {
        self.all()
            .iter()
            .filter(|r| matches!(r, Recorded::Publish(..)))
            .count()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl Observer for RecordingObserver {
    fn on_event(&mut self, event: &CatalogEvent) {
        self.log.lock().unwrap().push(Recorded::Event(event.clone()));
    }

    fn on_publish(&mut self, state: &PublishedState) {
        self.log.lock().unwrap().push(Recorded::Publish(
            state.theme().header.name.clone(),
            state.skin_id(),
            state.wallet_id().to_string(),
        ));
    }

    fn on_success(&mut self, toast: &Toast) {
        self.log.lock().unwrap().push(Recorded::Toast(toast.clone()));
    }
}

// ---------------------------------------------------------------------------
// Flaky store
// ---------------------------------------------------------------------------

/// Knobs shared between a test and the [`FlakyStore`] it handed over.
#[derive(Debug)]
pub struct StoreFaults {
    fail_reads: AtomicBool,
    writes_allowed: AtomicUsize,
    writes: AtomicUsize,
}

impl StoreFaults {
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Let `n` more writes succeed, then fail every later one.
    pub fn fail_writes_after(&self, n: usize) {
        self.writes_allowed.store(n, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

/// An in-memory store whose reads and writes fail on demand.
pub struct FlakyStore {
    inner: MemoryCatalogStore,
    faults: Arc<StoreFaults>,
}

impl FlakyStore {
    pub fn new(catalog: Catalog) -> (Self, Arc<StoreFaults>) {
        let faults = Arc::new(StoreFaults {
            fail_reads: AtomicBool::new(false),
            writes_allowed: AtomicUsize::new(usize::MAX),
            writes: AtomicUsize::new(0),
        });
        let store = Self {
            inner: MemoryCatalogStore::new(catalog),
            faults: Arc::clone(&faults),
        };
        (store, faults)
    }
}

impl CatalogStore for FlakyStore {
    fn get(&mut self) -> Result<&Catalog> {
        if self.faults.fail_reads.load(Ordering::SeqCst) {
            return Err(CatalogError::Store("read failed".to_string()));
        }
        self.inner.get()
    }

    fn set(&mut self, patch: CatalogPatch) -> Result<()> {
        let allowed = self.faults.writes_allowed.load(Ordering::SeqCst);
        if allowed == 0 {
            return Err(CatalogError::Store("write failed".to_string()));
        }
        if allowed != usize::MAX {
            self.faults.writes_allowed.store(allowed - 1, Ordering::SeqCst);
        }
        self.faults.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(patch)
    }

    fn get_sync(&self) -> &Catalog {
        self.inner.get_sync()
    }
}

// ---------------------------------------------------------------------------
// Service harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub service: ThemeService,
    pub observer: RecordingObserver,
    pub transport: FakeTransport,
    pub faults: Arc<StoreFaults>,
}

/// A service over `catalog` with the default bundle, not yet initialized.
pub fn harness(catalog: Catalog) -> Harness {
    let (store, faults) = FlakyStore::new(catalog);
    let transport = FakeTransport::new();
    let observer = RecordingObserver::default();
    let mut service = ThemeService::new(store, default_bundle(), transport.clone());
    service.subscribe(observer.clone());
    Harness {
        service,
        observer,
        transport,
        faults,
    }
}

/// A first-run service, initialized with the default definition, with the
/// observer log cleared.
pub fn initialized() -> Harness {
    let mut h = harness(empty_catalog());
    h.service.init(&default_definition()).unwrap();
    h.observer.clear();
    h
}
