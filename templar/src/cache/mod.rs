//! Template cache.
//!
//! Maps template names to URLs, fetches and compiles each template once,
//! and renders compiled templates by name.
//!
//! Creating a cache starts fetching every registered template in the background.
//! Once all of them are compiled, the `on_all_loaded` callback runs, exactly once.
//! Templates that aren't cached yet are fetched on demand:
//!
//! * [`TemplateCache::render`] renders cached templates immediately; for anything
//!   else it starts a background fetch and returns `None`,
//! * [`TemplateCache::render_async`] waits for the fetch and always returns the HTML,
//! * [`TemplateCache::render_sync`] and [`TemplateCache::fetch`] block the calling thread.
//!
//! Blocking calls made from inside a Tokio runtime require the multi-threaded runtime.
//! On the current-thread runtime they return [`Error::BlockingInCurrentThread`] unless
//! the template is already cached.
pub mod completion;
pub mod registry;
pub mod target;

pub use completion::{LoadEvent, OnAllLoaded};
pub use registry::Registry;
pub use target::Target;

use completion::Completion;

use crate::colors::MaybeColorize;
use crate::config::get_config;
use crate::template::{Context, IntoContext, Syntax, Template};
use crate::transport::{HttpTransport, Transport};
use crate::Error;

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::broadcast::{channel, Receiver, Sender};
use tokio::task;
use tracing::{debug, error, info, warn};

/// Cache of compiled templates, fetched by name.
///
/// Cloning the cache is cheap; clones share the same registry and compiled templates.
#[derive(Clone)]
pub struct TemplateCache {
    inner: Arc<Inner>,
}

struct Inner {
    registry: RwLock<Registry>,
    compiled: RwLock<HashMap<String, Arc<Template>>>,
    completion: Mutex<Completion>,
    syntax: Syntax,
    transport: Arc<dyn Transport>,
    events: Sender<LoadEvent>,
    handle: Handle,
}

/// Configure and create a [`TemplateCache`].
pub struct Builder {
    registry: Registry,
    on_all_loaded: Option<OnAllLoaded>,
    syntax: Option<Syntax>,
    transport: Option<Arc<dyn Transport>>,
    handle: Option<Handle>,
    events: usize,
}

impl Builder {
    /// Run this once every template registered at creation is compiled.
    pub fn on_all_loaded(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_all_loaded = Some(Box::new(callback));
        self
    }

    /// Interpolation delimiters. Defaults to the configured syntax.
    pub fn syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    /// Where template sources come from. Defaults to [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Runtime used for background fetches. Defaults to the current runtime.
    pub fn handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// How many undelivered events a slow subscriber can fall behind by.
    pub fn events(mut self, capacity: usize) -> Self {
        self.events = capacity.max(1);
        self
    }

    /// Create the cache and start fetching every registered template.
    pub fn create(self) -> Result<TemplateCache, Error> {
        let handle = match self.handle {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| Error::NoRuntime)?,
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new().map_err(Error::Client)?),
        };

        let syntax = self.syntax.unwrap_or_else(|| get_config().syntax.clone());
        let on_all_loaded = self
            .on_all_loaded
            .unwrap_or_else(|| Box::new(|| info!("all templates {}", "loaded".green())));

        let (events, _) = channel(self.events);
        let names = self.registry.names().map(String::from).collect::<Vec<_>>();

        let cache = TemplateCache {
            inner: Arc::new(Inner {
                completion: Mutex::new(Completion::new(
                    self.registry.names(),
                    on_all_loaded,
                )),
                registry: RwLock::new(self.registry),
                compiled: RwLock::new(HashMap::new()),
                syntax,
                transport,
                events,
                handle,
            }),
        };

        debug!("fetching {} templates", names.len());

        for name in names {
            cache.spawn_load(name, |_, _| ());
        }

        // Nothing to wait for.
        let callback = cache.inner.completion.lock().check();
        if let Some(callback) = callback {
            callback();
        }

        Ok(cache)
    }
}

impl TemplateCache {
    /// Start configuring a cache for the given templates.
    pub fn builder(registry: impl Into<Registry>) -> Builder {
        Builder {
            registry: registry.into(),
            on_all_loaded: None,
            syntax: None,
            transport: None,
            handle: None,
            events: 1024,
        }
    }

    /// Create a cache with the default transport and syntax,
    /// and start fetching every registered template.
    pub fn create(
        registry: impl Into<Registry>,
        on_all_loaded: Option<OnAllLoaded>,
    ) -> Result<Self, Error> {
        let mut builder = Self::builder(registry);
        builder.on_all_loaded = on_all_loaded;
        builder.create()
    }

    /// Render a template.
    ///
    /// Returns `None` if the template isn't cached yet. In that case, it's fetched
    /// in the background and rendered once it arrives; the output of that render is
    /// discarded, so use [`TemplateCache::render_async`] if you need it.
    pub fn render(&self, name: &str, variables: impl IntoContext) -> Result<Option<String>, Error> {
        let context = Self::context(name, variables)?;

        if let Some(template) = self.template(name) {
            return Self::evaluate(name, &template, &context).map(Some);
        }

        self.ensure_registered(name)?;
        debug!("template \"{}\" is not cached, fetching it", name);

        let owned = name.to_string();
        self.spawn_load(name.to_string(), move |cache, template| {
            if let Err(err) = Self::evaluate(&owned, &template, &context) {
                cache.failed(&owned, err);
            }
        });

        Ok(None)
    }

    /// Render a template, fetching it first if it isn't cached.
    pub async fn render_async(
        &self,
        name: &str,
        variables: impl IntoContext,
    ) -> Result<String, Error> {
        let context = Self::context(name, variables)?;
        let template = self.ensure(name).await?;

        Self::evaluate(name, &template, &context)
    }

    /// Render a template and append the result to the target.
    ///
    /// If the template isn't cached, it's fetched in the background and appended
    /// once it arrives. Background failures are reported through [`TemplateCache::subscribe`].
    pub fn render_in_target<T>(
        &self,
        name: &str,
        variables: impl IntoContext,
        target: Arc<T>,
    ) -> Result<(), Error>
    where
        T: Target + ?Sized + 'static,
    {
        let context = Self::context(name, variables)?;

        if let Some(template) = self.template(name) {
            target.append(&Self::evaluate(name, &template, &context)?);
            return Ok(());
        }

        self.ensure_registered(name)?;
        debug!("template \"{}\" is not cached, fetching it", name);

        let owned = name.to_string();
        self.spawn_load(name.to_string(), move |cache, template| {
            match Self::evaluate(&owned, &template, &context) {
                Ok(html) => target.append(&html),
                Err(err) => cache.failed(&owned, err),
            }
        });

        Ok(())
    }

    /// Render a template and append the result to the target, fetching it first if it isn't cached.
    pub async fn render_in_target_async<T>(
        &self,
        name: &str,
        variables: impl IntoContext,
        target: &T,
    ) -> Result<(), Error>
    where
        T: Target + ?Sized,
    {
        let html = self.render_async(name, variables).await?;
        target.append(&html);
        Ok(())
    }

    /// Render a template without variables, blocking until it's fetched if it isn't cached.
    pub fn render_sync(&self, name: &str) -> Result<String, Error> {
        let template = match self.template(name) {
            Some(template) => template,
            None => self.block_on(self.ensure(name))?,
        };

        Self::evaluate(name, &template, &Context::default())
    }

    /// Fetch and store a template in the background. Always fetches, even if it's cached.
    pub fn prefetch(&self, name: &str) {
        match self.ensure_registered(name) {
            Ok(()) => self.spawn_load(name.to_string(), |_, _| ()),
            Err(err) => self.failed(name, err),
        }
    }

    /// Fetch and store a template, blocking the calling thread. Does nothing if it's cached.
    pub fn fetch(&self, name: &str) -> Result<(), Error> {
        if self.is_cached(name) {
            return Ok(());
        }

        self.block_on(self.fetch_async(name))
    }

    /// Fetch and store a template. Does nothing if it's cached.
    pub async fn fetch_async(&self, name: &str) -> Result<(), Error> {
        self.ensure(name).await.map(|_| ())
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.inner.compiled.read().contains_key(name)
    }

    /// Compile the template source and store it, replacing any previously stored version.
    pub fn store(&self, name: &str, raw: &str) -> Result<(), Error> {
        self.insert(name, raw).map(|_| ())
    }

    /// URL of the template, `None` if it isn't registered.
    pub fn url_for(&self, name: &str) -> Option<String> {
        self.inner.registry.read().url_for(name).map(String::from)
    }

    /// Register a template so it can be fetched later.
    /// Returns the previous URL if the name was already registered.
    pub fn register(&self, name: impl ToString, url: impl ToString) -> Option<String> {
        self.inner.registry.write().insert(name, url)
    }

    /// Copy of the registry.
    pub fn registry(&self) -> Registry {
        self.inner.registry.read().clone()
    }

    /// Templates registered at creation that haven't been compiled yet.
    pub fn pending(&self) -> Vec<String> {
        self.inner.completion.lock().pending()
    }

    /// Receive an event for every stored template and every background failure.
    pub fn subscribe(&self) -> Receiver<LoadEvent> {
        self.inner.events.subscribe()
    }

    pub fn syntax(&self) -> &Syntax {
        &self.inner.syntax
    }

    fn template(&self, name: &str) -> Option<Arc<Template>> {
        self.inner.compiled.read().get(name).cloned()
    }

    fn ensure_registered(&self, name: &str) -> Result<(), Error> {
        if self.inner.registry.read().contains(name) {
            Ok(())
        } else {
            Err(Error::TemplateNotRegistered(name.to_string()))
        }
    }

    // Cached template, or fetch it.
    async fn ensure(&self, name: &str) -> Result<Arc<Template>, Error> {
        match self.template(name) {
            Some(template) => Ok(template),
            None => self.load(name).await,
        }
    }

    // Fetch, compile and store.
    async fn load(&self, name: &str) -> Result<Arc<Template>, Error> {
        let url = self
            .url_for(name)
            .ok_or_else(|| Error::TemplateNotRegistered(name.to_string()))?;

        debug!("{} template \"{}\" from {}", "fetching".purple(), name, url);

        let raw = self
            .inner
            .transport
            .get(&url)
            .await
            .map_err(|source| Error::Transport {
                name: name.to_string(),
                source,
            })?;

        self.insert(name, &raw)
    }

    fn insert(&self, name: &str, raw: &str) -> Result<Arc<Template>, Error> {
        self.ensure_registered(name)?;

        let template = match Template::compile(raw, &self.inner.syntax) {
            Ok(template) => Arc::new(template),
            Err(err) => {
                warn!("{}\n{}", "compile error".yellow(), err.clone().pretty(raw, Some(name)));
                return Err(Error::TemplateCompile {
                    name: name.to_string(),
                    source: err,
                });
            }
        };

        self.inner
            .compiled
            .write()
            .insert(name.to_string(), template.clone());

        debug!("template \"{}\" stored", name);

        let callback = self.inner.completion.lock().loaded(name);
        if let Some(callback) = callback {
            callback();
        }

        // No receivers is fine.
        let _ = self.inner.events.send(LoadEvent::Loaded {
            name: name.to_string(),
        });

        Ok(template)
    }

    // Fetch in the background, then hand the stored template to `then`.
    fn spawn_load<F>(&self, name: String, then: F)
    where
        F: FnOnce(&TemplateCache, Arc<Template>) + Send + 'static,
    {
        let cache = self.clone();

        self.inner.handle.spawn(async move {
            match cache.load(&name).await {
                Ok(template) => then(&cache, template),
                Err(err) => cache.failed(&name, err),
            }
        });
    }

    fn failed(&self, name: &str, err: Error) {
        error!("{} {}", "failed".red(), err);

        let _ = self.inner.events.send(LoadEvent::Failed {
            name: name.to_string(),
            error: Arc::new(err),
        });
    }

    // `block_in_place` panics on the current-thread runtime, so that's an error instead.
    fn block_on<T, F>(&self, future: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                Err(Error::BlockingInCurrentThread)
            }
            Ok(handle) => task::block_in_place(move || handle.block_on(future)),
            Err(_) => self.inner.handle.block_on(future),
        }
    }

    fn context(name: &str, variables: impl IntoContext) -> Result<Context, Error> {
        variables.into_context().map_err(|source| Error::Render {
            name: name.to_string(),
            source,
        })
    }

    fn evaluate(name: &str, template: &Template, context: &Context) -> Result<String, Error> {
        template.render(context).map_err(|source| Error::Render {
            name: name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Http;
    use crate::transport;

    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio::time::{sleep, timeout};

    // Serves bodies from memory. Requests to a gated URL wait until it's released.
    #[derive(Default)]
    struct MemoryTransport {
        bodies: Mutex<HashMap<String, String>>,
        gates: Mutex<HashMap<String, Arc<Notify>>>,
        requests: AtomicUsize,
    }

    impl MemoryTransport {
        fn with(bodies: &[(&str, &str)]) -> Arc<Self> {
            let transport = Self::default();
            for (url, body) in bodies {
                transport.set(url, body);
            }
            Arc::new(transport)
        }

        fn set(&self, url: &str, body: &str) {
            self.bodies.lock().insert(url.to_string(), body.to_string());
        }

        fn gate(&self, url: &str) {
            self.gates
                .lock()
                .insert(url.to_string(), Arc::new(Notify::new()));
        }

        fn release(&self, url: &str) {
            if let Some(gate) = self.gates.lock().remove(url) {
                gate.notify_one();
            }
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn get(&self, url: &str) -> Result<String, transport::Error> {
            self.requests.fetch_add(1, Ordering::SeqCst);

            let gate = self.gates.lock().get(url).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            let body = self.bodies.lock().get(url).cloned();
            body.ok_or_else(|| transport::Error::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn cache(registry: impl Into<Registry>, transport: &Arc<MemoryTransport>) -> TemplateCache {
        TemplateCache::builder(registry)
            .transport(transport.clone())
            .create()
            .expect("cache")
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        (fired, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn wait_for(events: &mut Receiver<LoadEvent>, name: &str) -> LoadEvent {
        timeout(Duration::from_secs(5), async {
            loop {
                match events.recv().await {
                    Ok(event) if event.name() == name => return event,
                    Ok(_) => continue,
                    Err(err) => panic!("event channel: {:?}", err),
                }
            }
        })
        .await
        .expect("timed out waiting for event")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_then_render() -> Result<(), Error> {
        let transport = MemoryTransport::with(&[("mem://greet", "Hello {{ name }}!")]);
        let cache = cache(Registry::new(), &transport);

        cache.register("greet", "mem://greet");
        assert!(!cache.is_cached("greet"));

        cache.fetch("greet")?;
        assert!(cache.is_cached("greet"));
        assert_eq!(transport.requests(), 1);

        assert_eq!(
            cache.render("greet", [("name", "World")])?.as_deref(),
            Some("Hello World!")
        );
        assert_eq!(
            cache.render("greet", [("name", "Templar")])?.as_deref(),
            Some("Hello Templar!")
        );

        // Cached, no more requests.
        cache.fetch("greet")?;
        assert_eq!(transport.requests(), 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_all_loaded_waits_for_every_template() -> Result<(), Error> {
        let transport = MemoryTransport::with(&[("mem://a", "A"), ("mem://b", "B")]);
        transport.gate("mem://a");
        transport.gate("mem://b");

        let (fired, callback) = counter();
        let cache = TemplateCache::builder([("a", "mem://a"), ("b", "mem://b")])
            .transport(transport.clone())
            .on_all_loaded(callback)
            .create()?;
        let mut events = cache.subscribe();

        transport.release("mem://a");
        wait_for(&mut events, "a").await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(cache.pending(), vec!["b".to_string()]);

        transport.release("mem://b");
        wait_for(&mut events, "b").await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(cache.pending().is_empty());

        // Storing again doesn't fire it again.
        cache.store("a", "A again")?;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_all_loaded_not_fired_on_failure() -> Result<(), Error> {
        let transport = MemoryTransport::with(&[("mem://a", "A")]);
        transport.gate("mem://b");

        let (fired, callback) = counter();
        let cache = TemplateCache::builder([("a", "mem://a"), ("b", "mem://b")])
            .transport(transport.clone())
            .on_all_loaded(callback)
            .create()?;
        let mut events = cache.subscribe();

        transport.release("mem://b");

        match wait_for(&mut events, "b").await {
            LoadEvent::Failed { error, .. } => {
                assert!(matches!(
                    *error,
                    Error::Transport {
                        source: transport::Error::Status { status: 404, .. },
                        ..
                    }
                ));
            }
            event => panic!("expected failure, got {:?}", event),
        }

        assert!(!cache.is_cached("b"));
        assert_eq!(cache.pending(), vec!["b".to_string()]);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        // The caller retries once the template is available.
        transport.set("mem://b", "B");
        cache.fetch_async("b").await?;

        timeout(Duration::from_secs(5), async {
            while fired.load(Ordering::SeqCst) == 0 {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("all templates loaded");

        assert!(cache.is_cached("a"));
        assert!(cache.pending().is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_registry_fires_immediately() -> Result<(), Error> {
        let transport = MemoryTransport::with(&[]);
        let (fired, callback) = counter();

        let _cache = TemplateCache::builder(Registry::new())
            .transport(transport.clone())
            .on_all_loaded(callback)
            .create()?;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_later_registrations_dont_rearm() -> Result<(), Error> {
        let transport = MemoryTransport::with(&[("mem://a", "A"), ("mem://c", "C")]);
        transport.gate("mem://a");

        let (fired, callback) = counter();
        let cache = TemplateCache::builder([("a", "mem://a")])
            .transport(transport.clone())
            .on_all_loaded(callback)
            .create()?;
        let mut events = cache.subscribe();

        transport.release("mem://a");
        wait_for(&mut events, "a").await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        cache.register("c", "mem://c");
        cache.fetch_async("c").await?;
        assert!(cache.is_cached("c"));
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_render_miss_fetches_in_background() -> Result<(), Error> {
        let transport = MemoryTransport::with(&[("mem://greet", "Hello {{ name }}!")]);
        let cache = cache(Registry::new(), &transport);
        cache.register("greet", "mem://greet");

        let mut events = cache.subscribe();
        assert_eq!(cache.render("greet", [("name", "World")])?, None);

        wait_for(&mut events, "greet").await;

        assert_eq!(
            cache.render("greet", [("name", "World")])?.as_deref(),
            Some("Hello World!")
        );
        assert_eq!(transport.requests(), 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_not_registered() {
        let transport = MemoryTransport::with(&[]);
        let cache = cache(Registry::new(), &transport);

        assert_eq!(cache.url_for("missing"), None);
        assert!(!cache.is_cached("missing"));
        assert!(matches!(
            cache.render("missing", ()),
            Err(Error::TemplateNotRegistered(name)) if name == "missing"
        ));
        assert!(matches!(
            cache.fetch("missing"),
            Err(Error::TemplateNotRegistered(_))
        ));
        assert!(matches!(
            cache.store("missing", "<p></p>"),
            Err(Error::TemplateNotRegistered(_))
        ));
        assert!(matches!(
            cache.render_async("missing", ()).await,
            Err(Error::TemplateNotRegistered(_))
        ));
        assert_eq!(transport.requests(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_render_in_target() -> Result<(), Error> {
        let transport = MemoryTransport::with(&[("mem://item", "<li>{{ name }}</li>")]);
        let cache = cache(Registry::new(), &transport);
        cache.register("item", "mem://item");

        let target = Arc::new(Mutex::new(String::new()));

        // Not cached: appended once the fetch completes.
        cache.render_in_target("item", [("name", "a")], target.clone())?;

        timeout(Duration::from_secs(5), async {
            while target.lock().is_empty() {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("appended");

        assert_eq!(*target.lock(), "<li>a</li>");

        // Cached: appended immediately, no I/O.
        cache.render_in_target("item", [("name", "b")], target.clone())?;
        assert_eq!(*target.lock(), "<li>a</li><li>b</li>");
        assert_eq!(transport.requests(), 1);

        let items = Mutex::new(Vec::<String>::new());
        cache
            .render_in_target_async("item", [("name", "c")], &items)
            .await?;
        assert_eq!(*items.lock(), vec!["<li>c</li>".to_string()]);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_render_sync() -> Result<(), Error> {
        let transport = MemoryTransport::with(&[("mem://page", "<p>static</p>")]);
        let cache = cache(Registry::new(), &transport);
        cache.register("page", "mem://page");
        cache.register("broken", "mem://nowhere");

        assert_eq!(cache.render_sync("page")?, "<p>static</p>");
        assert!(cache.is_cached("page"));

        assert!(matches!(
            cache.render_sync("broken"),
            Err(Error::Transport { name, .. }) if name == "broken"
        ));
        assert!(!cache.is_cached("broken"));

        Ok(())
    }

    #[tokio::test]
    async fn test_blocking_on_current_thread() -> Result<(), Error> {
        let transport = MemoryTransport::with(&[("mem://page", "<p>static</p>")]);
        let cache = cache(Registry::new(), &transport);
        cache.register("page", "mem://page");

        assert!(matches!(
            cache.render_sync("page"),
            Err(Error::BlockingInCurrentThread)
        ));
        assert!(matches!(
            cache.fetch("page"),
            Err(Error::BlockingInCurrentThread)
        ));
        assert_eq!(transport.requests(), 0);

        // Nothing to wait for once it's cached.
        cache.fetch_async("page").await?;
        cache.fetch("page")?;
        assert_eq!(cache.render_sync("page")?, "<p>static</p>");
        assert_eq!(transport.requests(), 1);

        Ok(())
    }

    #[test]
    fn test_render_sync_outside_runtime() -> Result<(), Error> {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let transport = MemoryTransport::with(&[("mem://page", "<p>{{ 2 * 21 }}</p>")]);

        let cache = TemplateCache::builder(Registry::new())
            .transport(transport.clone())
            .handle(runtime.handle().clone())
            .create()?;
        cache.register("page", "mem://page");

        assert_eq!(cache.render_sync("page")?, "<p>42</p>");
        Ok(())
    }

    #[test]
    fn test_no_runtime() {
        let transport = MemoryTransport::with(&[]);
        let result = TemplateCache::builder(Registry::new())
            .transport(transport)
            .create();

        assert!(matches!(result, Err(Error::NoRuntime)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_store() -> Result<(), Error> {
        let transport = MemoryTransport::with(&[]);
        let cache = cache(Registry::new(), &transport);
        cache.register("row", "mem://row");

        let raw = "<tr><td>{{ id }}</td><td>{{ email.downcase }}</td></tr>";
        let variables = [("id", "7"), ("email", "ADA@EXAMPLE.COM")];

        cache.store("row", raw)?;
        let first = cache.render("row", variables)?;
        cache.store("row", raw)?;
        let second = cache.render("row", variables)?;

        assert_eq!(first, second);
        assert_eq!(
            first.as_deref(),
            Some("<tr><td>7</td><td>ada@example.com</td></tr>")
        );

        // A bad version doesn't replace the good one.
        assert!(matches!(
            cache.store("row", "<tr>{{ id </tr>"),
            Err(Error::TemplateCompile { name, .. }) if name == "row"
        ));
        assert_eq!(cache.render("row", variables)?, first);

        assert!(matches!(
            cache.render("row", ()),
            Err(Error::Render {
                source: crate::template::Error::UndefinedVariable(_),
                ..
            })
        ));
        assert_eq!(transport.requests(), 0);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_prefetch() -> Result<(), Error> {
        let transport = MemoryTransport::with(&[("mem://nav", "<nav></nav>")]);
        let cache = cache(Registry::new(), &transport);
        cache.register("nav", "mem://nav");

        let mut events = cache.subscribe();

        cache.prefetch("nav");
        assert!(matches!(
            wait_for(&mut events, "nav").await,
            LoadEvent::Loaded { .. }
        ));
        assert!(cache.is_cached("nav"));

        cache.prefetch("missing");
        match wait_for(&mut events, "missing").await {
            LoadEvent::Failed { error, .. } => {
                assert!(matches!(*error, Error::TemplateNotRegistered(_)))
            }
            event => panic!("expected failure, got {:?}", event),
        }

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_render_async_with_syntax() -> Result<(), Error> {
        let transport =
            MemoryTransport::with(&[("mem://total", "{{ literal }} total: [[ price * qty ]]")]);
        let cache = TemplateCache::builder(Registry::new())
            .transport(transport.clone())
            .syntax(Syntax::new("[[", "]]").expect("syntax"))
            .create()?;
        cache.register("total", "mem://total");

        let html = cache
            .render_async("total", serde_json::json!({"price": 2.5, "qty": 4}))
            .await?;

        assert_eq!(html, "{{ literal }} total: 10");
        assert_eq!(cache.syntax().open(), "[[");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_http_end_to_end() -> Result<(), Error> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/greet.html")
            .with_body("Hello {{ name }}!")
            .expect(1)
            .create_async()
            .await;

        let (tx, rx) = tokio::sync::oneshot::channel();
        let transport = HttpTransport::from_config(&Http::default()).map_err(Error::Client)?;

        let cache =
            TemplateCache::builder([("greet", format!("{}/greet.html", server.url()))])
                .transport(Arc::new(transport))
                .on_all_loaded(move || {
                    let _ = tx.send(());
                })
                .create()?;

        timeout(Duration::from_secs(5), rx)
            .await
            .expect("all templates loaded")
            .expect("callback");

        cache.fetch("greet")?;
        assert_eq!(
            cache.render("greet", [("name", "World")])?.as_deref(),
            Some("Hello World!")
        );

        mock.assert_async().await;
        Ok(())
    }
}
