// Copyright 2025 Cowboy AI, LLC.

//! Composition of services from extensions
//!
//! The injector builds each named service from its component extensions:
//! providers are instantiated, merged by an aggregator when there are
//! several, then wrapped by decorators in priority order. Every service is
//! built once and shared for the lifetime of the injector.
//!
//! Dependency names follow three conventions:
//! - `category[]` injects the raw extensions of a category
//! - a `constants` key injects that constant's value
//! - `$injector` grants late-bound access through [`Lazy`]
//!
//! Anything else must name a service with at least one provider.

use super::extension::{ComponentKind, Extension};
use super::implementation::{ImplementationRegistry, Instance};
use super::registry::ExtensionRegistry;
use crate::errors::{CompositionError, FrameworkError, FrameworkResult};
use indexmap::IndexMap;
use parking_lot::{Mutex, ReentrantMutex};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};
use tracing::{debug, error, info, warn};

/// Name that grants late-bound access to the injector
pub const INJECTOR: &str = "$injector";

/// Category holding `{key, value}` constants
pub const CONSTANTS: &str = "constants";

/// Category of startup hooks constructed once during bootstrap
pub const RUNS: &str = "runs";

fn downcast<T: Clone + 'static>(instance: &Instance, name: &str) -> FrameworkResult<T> {
    let any: &(dyn Any + Send + Sync) = &**instance;
    any.downcast_ref::<T>().cloned().ok_or_else(|| {
        CompositionError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>().to_string(),
        }
        .into()
    })
}

/// A non-component extension with its implementation instantiated
#[derive(Clone)]
pub struct ResolvedExtension {
    extension: Arc<Extension>,
    instance: Option<Instance>,
}

impl ResolvedExtension {
    /// The underlying extension
    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    /// Extension key
    pub fn key(&self) -> Option<&str> {
        self.extension.key()
    }

    /// Metadata field
    pub fn metadata(&self, field: &str) -> Option<&Value> {
        self.extension.metadata(field)
    }

    /// Whether an implementation was instantiated
    pub fn has_implementation(&self) -> bool {
        self.instance.is_some()
    }

    /// Instantiated implementation as `T`
    pub fn implementation<T: Clone + 'static>(&self) -> FrameworkResult<T> {
        let name = self.extension.log_name();
        match &self.instance {
            Some(instance) => downcast(instance, &name),
            None => Err(CompositionError::MissingImplementation {
                path: "<none>".to_string(),
                extension: name,
            }
            .into()),
        }
    }

    /// Definition fields (including metadata) deserialized as `T`
    pub fn definition_as<T: DeserializeOwned>(&self) -> FrameworkResult<T> {
        let value = serde_json::to_value(self.extension.definition())?;
        Ok(serde_json::from_value(value)?)
    }
}

impl fmt::Debug for ResolvedExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedExtension")
            .field("extension", &self.extension.log_name())
            .field("instantiated", &self.instance.is_some())
            .finish()
    }
}

/// Something injected into a constructor
#[derive(Clone)]
pub enum Injected {
    /// A composed service
    Service(Instance),
    /// Raw extensions of a category
    Extensions(Arc<Vec<ResolvedExtension>>),
    /// A constant value
    Constant(Value),
    /// Late-bound injector access
    Injector,
}

/// Dependencies handed to a constructor
pub struct Injection {
    extension: Arc<Extension>,
    injector: Weak<Injector>,
    dependencies: IndexMap<String, Injected>,
    providers: Vec<Instance>,
    decorated: Option<Instance>,
}

impl Injection {
    /// The extension being constructed
    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    fn lookup(&self, name: &str) -> FrameworkResult<&Injected> {
        self.dependencies.get(name).ok_or_else(|| {
            CompositionError::UndeclaredDependency {
                dependency: name.to_string(),
                extension: self.extension.log_name(),
            }
            .into()
        })
    }

    fn mismatch(&self, name: &str, expected: &str) -> FrameworkError {
        CompositionError::TypeMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
        }
        .into()
    }

    /// A declared service dependency as `T`
    pub fn service<T: Clone + 'static>(&self, name: &str) -> FrameworkResult<T> {
        match self.lookup(name)? {
            Injected::Service(instance) => downcast(instance, name),
            _ => Err(self.mismatch(name, "service")),
        }
    }

    /// A declared `category[]` dependency
    pub fn extensions(&self, name: &str) -> FrameworkResult<Arc<Vec<ResolvedExtension>>> {
        match self.lookup(name)? {
            Injected::Extensions(extensions) => Ok(extensions.clone()),
            _ => Err(self.mismatch(name, "extension array")),
        }
    }

    /// A declared constant
    pub fn constant(&self, name: &str) -> FrameworkResult<Value> {
        match self.lookup(name)? {
            Injected::Constant(value) => Ok(value.clone()),
            _ => Err(self.mismatch(name, "constant")),
        }
    }

    /// A declared constant deserialized as `T`
    pub fn constant_as<T: DeserializeOwned>(&self, name: &str) -> FrameworkResult<T> {
        Ok(serde_json::from_value(self.constant(name)?)?)
    }

    /// Late-bound handle to a service; requires `$injector` in `depends`
    pub fn lazy<T: Clone + Send + Sync + 'static>(&self, name: &str) -> FrameworkResult<Lazy<T>> {
        match self.lookup(INJECTOR)? {
            Injected::Injector => Ok(Lazy::new(name, self.injector.clone())),
            _ => Err(self.mismatch(INJECTOR, "injector")),
        }
    }

    /// Instance being decorated (decorators only)
    pub fn decorated<T: Clone + 'static>(&self) -> FrameworkResult<T> {
        let name = self.extension.provided_service();
        match &self.decorated {
            Some(instance) => downcast(instance, name),
            None => Err(self.mismatch(name, "decorated instance")),
        }
    }

    /// Provider instances in priority order (aggregators only)
    pub fn providers<T: Clone + 'static>(&self) -> FrameworkResult<Vec<T>> {
        let name = self.extension.provided_service();
        self.providers
            .iter()
            .map(|instance| downcast(instance, name))
            .collect()
    }
}

struct LazyInner<T> {
    name: String,
    injector: Weak<Injector>,
    cell: OnceLock<T>,
}

/// Service handle resolved on first use
///
/// Breaks construction cycles such as capabilities that need the object
/// service which in turn needs the capability service.
pub struct Lazy<T> {
    inner: Arc<LazyInner<T>>,
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Lazy<T> {
    fn new(name: &str, injector: Weak<Injector>) -> Self {
        Self {
            inner: Arc::new(LazyInner {
                name: name.to_string(),
                injector,
                cell: OnceLock::new(),
            }),
        }
    }

    /// A handle that is already resolved
    pub fn ready(name: &str, value: T) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(value);
        Self {
            inner: Arc::new(LazyInner {
                name: name.to_string(),
                injector: Weak::new(),
                cell,
            }),
        }
    }

    /// Resolve, or return the already resolved service
    pub fn get(&self) -> FrameworkResult<T> {
        if let Some(value) = self.inner.cell.get() {
            return Ok(value.clone());
        }
        let injector = self
            .inner
            .injector
            .upgrade()
            .ok_or_else(|| CompositionError::InjectorDropped(self.inner.name.clone()))?;
        let value = injector.service::<T>(&self.inner.name)?;
        Ok(self.inner.cell.get_or_init(|| value).clone())
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("name", &self.inner.name)
            .field("resolved", &self.inner.cell.get().is_some())
            .finish()
    }
}

#[derive(Default)]
struct InjectorState {
    services: HashMap<String, Option<Instance>>,
    arrays: HashMap<String, Arc<Vec<ResolvedExtension>>>,
    resolving: Vec<String>,
}

/// Resolves services and extension arrays from a registry
pub struct Injector {
    registry: ExtensionRegistry,
    implementations: ImplementationRegistry,
    constants: IndexMap<String, Value>,
    me: Weak<Injector>,
    guard: ReentrantMutex<()>,
    state: Mutex<InjectorState>,
}

impl Injector {
    /// Create an injector over a registry
    pub fn new(registry: ExtensionRegistry, implementations: ImplementationRegistry) -> Arc<Self> {
        let mut constants = IndexMap::new();
        for extension in registry.extensions(CONSTANTS) {
            match (extension.key(), extension.metadata("value")) {
                (Some(key), Some(value)) => {
                    if !constants.contains_key(key) {
                        constants.insert(key.to_string(), value.clone());
                    }
                }
                _ => warn!(
                    extension = %extension.log_name(),
                    "Constant needs both key and value; skipping"
                ),
            }
        }

        Arc::new_cyclic(|me| Injector {
            registry,
            implementations,
            constants,
            me: me.clone(),
            guard: ReentrantMutex::new(()),
            state: Mutex::new(InjectorState::default()),
        })
    }

    /// Registry the injector composes from
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Constant value by key
    pub fn constant(&self, key: &str) -> Option<&Value> {
        self.constants.get(key)
    }

    /// Compose a service; `None` when nothing provides it
    pub fn resolve(&self, service: &str) -> FrameworkResult<Option<Instance>> {
        let _guard = self.guard.lock();
        if let Some(cached) = self.state.lock().services.get(service) {
            return Ok(cached.clone());
        }

        self.enter(service)?;
        let result = self.compose(service);
        self.leave();
        let composed = result?;

        self.state
            .lock()
            .services
            .insert(service.to_string(), composed.clone());
        Ok(composed)
    }

    /// Compose a service that must exist, as `T`
    pub fn service<T: Clone + 'static>(&self, name: &str) -> FrameworkResult<T> {
        match self.resolve(name)? {
            Some(instance) => downcast(&instance, name),
            None => Err(CompositionError::MissingDependency {
                dependency: name.to_string(),
                extension: INJECTOR.to_string(),
            }
            .into()),
        }
    }

    /// Raw extensions of a category with implementations instantiated
    pub fn extensions(&self, category: &str) -> FrameworkResult<Arc<Vec<ResolvedExtension>>> {
        let _guard = self.guard.lock();
        if let Some(cached) = self.state.lock().arrays.get(category) {
            return Ok(cached.clone());
        }

        self.enter(&format!("{category}[]"))?;
        let result = self.instantiate_all(category);
        self.leave();
        let resolved = Arc::new(result?);

        self.state
            .lock()
            .arrays
            .insert(category.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Compose every provided service and run startup hooks
    ///
    /// Any failure is fatal; the caller must not continue with a partial graph.
    pub fn bootstrap(&self) -> FrameworkResult<()> {
        let services = self.registry.service_names();
        for service in &services {
            if let Err(e) = self.resolve(service) {
                error!(service = %service, error = %e, "Service composition failed");
                return Err(e);
            }
        }
        let runs = self.extensions(RUNS)?;
        info!(
            services = services.len(),
            runs = runs.len(),
            bundles = self.registry.bundles().len(),
            "Service graph composed"
        );
        Ok(())
    }

    fn enter(&self, name: &str) -> FrameworkResult<()> {
        let mut state = self.state.lock();
        if state.resolving.iter().any(|n| n == name) {
            let mut chain = state.resolving.clone();
            chain.push(name.to_string());
            error!(chain = %chain.join(" -> "), "Cyclic dependency");
            return Err(CompositionError::CyclicDependency { chain }.into());
        }
        state.resolving.push(name.to_string());
        Ok(())
    }

    fn leave(&self) {
        self.state.lock().resolving.pop();
    }

    fn compose(&self, service: &str) -> FrameworkResult<Option<Instance>> {
        let components = self.registry.components(service);
        if components.is_empty() {
            return Ok(None);
        }

        let of_kind = |kind: ComponentKind| -> Vec<&Arc<Extension>> {
            components
                .iter()
                .filter(|c| c.component_kind() == Some(kind))
                .collect()
        };
        let providers = of_kind(ComponentKind::Provider);
        let aggregators = of_kind(ComponentKind::Aggregator);
        let decorators = of_kind(ComponentKind::Decorator);

        let base = match (providers.len(), aggregators.len()) {
            (_, count) if count > 1 => {
                error!(service = %service, aggregators = count, "Multiple aggregators");
                return Err(CompositionError::MultipleAggregators {
                    service: service.to_string(),
                    count,
                }
                .into());
            }
            (0, 0) => None,
            (1, 0) => Some(self.construct(providers[0], Vec::new(), None)?),
            (count, 0) => {
                error!(
                    service = %service,
                    providers = count,
                    bundles = ?providers.iter().map(|p| p.bundle()).collect::<Vec<_>>(),
                    "Multiple providers without an aggregator"
                );
                return Err(CompositionError::MultipleProvidersWithoutAggregator {
                    service: service.to_string(),
                    count,
                }
                .into());
            }
            (_, _) => {
                let instances = providers
                    .iter()
                    .map(|p| self.construct(p, Vec::new(), None))
                    .collect::<FrameworkResult<Vec<_>>>()?;
                Some(self.construct(aggregators[0], instances, None)?)
            }
        };

        let Some(mut current) = base else {
            for decorator in &decorators {
                warn!(
                    extension = %decorator.log_name(),
                    "Nothing to decorate; skipping"
                );
            }
            return Ok(None);
        };

        // Lowest priority wraps first so the highest ends up outermost.
        for decorator in decorators.iter().rev() {
            current = self.construct(decorator, Vec::new(), Some(current))?;
        }

        debug!(service = %service, components = components.len(), "Composed service");
        Ok(Some(current))
    }

    fn instantiate_all(&self, category: &str) -> FrameworkResult<Vec<ResolvedExtension>> {
        self.registry
            .extensions(category)
            .into_iter()
            .map(|extension| {
                let instance = if extension.has_implementation() {
                    Some(self.construct(&extension, Vec::new(), None)?)
                } else {
                    None
                };
                Ok(ResolvedExtension {
                    extension,
                    instance,
                })
            })
            .collect()
    }

    fn construct(
        &self,
        extension: &Arc<Extension>,
        providers: Vec<Instance>,
        decorated: Option<Instance>,
    ) -> FrameworkResult<Instance> {
        let path = extension.implementation_path().unwrap_or("<none>");
        let constructor = self.implementations.get(path).ok_or_else(|| {
            error!(
                extension = %extension.log_name(),
                path = %path,
                "No implementation registered"
            );
            CompositionError::MissingImplementation {
                path: path.to_string(),
                extension: extension.log_name(),
            }
        })?;

        let mut dependencies = IndexMap::new();
        for name in extension.depends() {
            let injected = self.inject(name, extension)?;
            dependencies.insert(name.clone(), injected);
        }

        let injection = Injection {
            extension: extension.clone(),
            injector: self.me.clone(),
            dependencies,
            providers,
            decorated,
        };

        constructor(&injection).map_err(|e| match e {
            FrameworkError::Composition(_) => e,
            other => {
                error!(extension = %extension.log_name(), error = %other, "Constructor failed");
                CompositionError::ConstructionFailed {
                    extension: extension.log_name(),
                    reason: other.to_string(),
                }
                .into()
            }
        })
    }

    fn inject(&self, name: &str, extension: &Extension) -> FrameworkResult<Injected> {
        if name == INJECTOR {
            return Ok(Injected::Injector);
        }
        if let Some(category) = name.strip_suffix("[]") {
            return Ok(Injected::Extensions(self.extensions(category)?));
        }
        if let Some(value) = self.constants.get(name) {
            return Ok(Injected::Constant(value.clone()));
        }
        match self.resolve(name)? {
            Some(instance) => Ok(Injected::Service(instance)),
            None => {
                error!(
                    dependency = %name,
                    extension = %extension.log_name(),
                    bundle = %extension.bundle(),
                    "Unresolved dependency"
                );
                Err(CompositionError::MissingDependency {
                    dependency: name.to_string(),
                    extension: extension.log_name(),
                }
                .into())
            }
        }
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("bundles", &self.registry.bundles())
            .field("constants", &self.constants.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::bundle::{Bundle, BundleDefinition};
    use crate::framework::extension::ExtensionDefinition;
    use crate::framework::implementation::instance;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Greeter: Send + Sync {
        fn greet(&self, log: &mut Vec<String>);
    }

    struct Base(&'static str);

    impl Greeter for Base {
        fn greet(&self, log: &mut Vec<String>) {
            log.push(self.0.to_string());
        }
    }

    struct Decorating {
        name: String,
        inner: Arc<dyn Greeter>,
    }

    impl Greeter for Decorating {
        fn greet(&self, log: &mut Vec<String>) {
            log.push(self.name.clone());
            self.inner.greet(log);
        }
    }

    struct Merging(Vec<Arc<dyn Greeter>>);

    impl Greeter for Merging {
        fn greet(&self, log: &mut Vec<String>) {
            for provider in &self.0 {
                provider.greet(log);
            }
        }
    }

    fn implementations() -> ImplementationRegistry {
        let mut implementations = ImplementationRegistry::new();
        implementations
            .register("t/src/a", |_| Ok(instance(Arc::new(Base("a")) as Arc<dyn Greeter>)))
            .register("t/src/b", |_| Ok(instance(Arc::new(Base("b")) as Arc<dyn Greeter>)))
            .register("t/src/merge", |injection| {
                let providers = injection.providers::<Arc<dyn Greeter>>()?;
                Ok(instance(Arc::new(Merging(providers)) as Arc<dyn Greeter>))
            })
            .register("t/src/decorate", |injection| {
                let name = injection
                    .extension()
                    .key()
                    .unwrap_or("anonymous")
                    .to_string();
                let inner = injection.decorated::<Arc<dyn Greeter>>()?;
                Ok(instance(Arc::new(Decorating { name, inner }) as Arc<dyn Greeter>))
            });
        implementations
    }

    fn injector(definition: BundleDefinition) -> Arc<Injector> {
        let mut registry = ExtensionRegistry::new();
        registry.register_bundle(&Bundle::new("t", definition));
        Injector::new(registry, implementations())
    }

    fn provider(path: &str) -> ExtensionDefinition {
        ExtensionDefinition::default()
            .implementation(path)
            .component(ComponentKind::Provider, "greeter")
    }

    fn decorator(key: &str, priority: Option<&str>) -> ExtensionDefinition {
        let definition = ExtensionDefinition::keyed(key)
            .implementation("decorate")
            .component(ComponentKind::Decorator, "greeter");
        match priority {
            Some(p) => definition.priority(p),
            None => definition,
        }
    }

    fn greet(injector: &Injector) -> Vec<String> {
        let greeter = injector.service::<Arc<dyn Greeter>>("greeter").unwrap();
        let mut log = Vec::new();
        greeter.greet(&mut log);
        log
    }

    #[test]
    fn test_decorators_run_mandatory_then_default_then_fallback() {
        let injector = injector(
            BundleDefinition::named("Test")
                .extension("components", decorator("fallback", Some("fallback")))
                .extension("components", decorator("unspecified", None))
                .extension("components", provider("a"))
                .extension("components", decorator("mandatory", Some("mandatory"))),
        );

        assert_eq!(greet(&injector), vec!["mandatory", "unspecified", "fallback", "a"]);
    }

    #[test]
    fn test_decorator_ties_follow_declaration_order() {
        let injector = injector(
            BundleDefinition::named("Test")
                .extension("components", provider("a"))
                .extension("components", decorator("first", None))
                .extension("components", decorator("second", None)),
        );

        assert_eq!(greet(&injector), vec!["first", "second", "a"]);
    }

    #[test]
    fn test_multiple_providers_require_aggregator() {
        let injector = injector(
            BundleDefinition::named("Test")
                .extension("components", provider("a"))
                .extension("components", provider("b")),
        );

        let err = injector.resolve("greeter").unwrap_err();
        assert_eq!(
            err,
            FrameworkError::Composition(CompositionError::MultipleProvidersWithoutAggregator {
                service: "greeter".to_string(),
                count: 2,
            })
        );
        assert!(injector.bootstrap().is_err());
    }

    #[test]
    fn test_aggregator_receives_providers_in_priority_order() {
        let injector = injector(
            BundleDefinition::named("Test")
                .extension("components", provider("a"))
                .extension("components", provider("b").priority("preferred"))
                .extension(
                    "components",
                    ExtensionDefinition::default()
                        .implementation("merge")
                        .component(ComponentKind::Aggregator, "greeter"),
                ),
        );

        assert_eq!(greet(&injector), vec!["b", "a"]);
    }

    #[test]
    fn test_resolution_is_memoized() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let mut implementations = implementations();
        implementations.register("t/src/counted", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(instance(Arc::new(Mutex::new(Vec::<String>::new()))))
        });
        let mut registry = ExtensionRegistry::new();
        registry.register_bundle(&Bundle::new(
            "t",
            BundleDefinition::named("Test").extension(
                "components",
                ExtensionDefinition::default()
                    .implementation("counted")
                    .component(ComponentKind::Provider, "cache"),
            ),
        ));
        let injector = Injector::new(registry, implementations);

        let first = injector.service::<Arc<Mutex<Vec<String>>>>("cache").unwrap();
        let second = injector.service::<Arc<Mutex<Vec<String>>>>("cache").unwrap();
        first.lock().push("shared".to_string());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second.lock(), vec!["shared".to_string()]);
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_service_resolves_to_none() {
        let injector = injector(
            BundleDefinition::named("Test").extension("components", decorator("lonely", None)),
        );
        assert!(injector.resolve("greeter").unwrap().is_none());
        assert!(injector.resolve("nothing").unwrap().is_none());
        assert!(injector.extensions("nothing").unwrap().is_empty());
    }

    #[test]
    fn test_missing_dependency_is_fatal() {
        let injector = injector(
            BundleDefinition::named("Test")
                .extension("components", provider("a").depends(["modelService"])),
        );

        let err = injector.bootstrap().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err,
            FrameworkError::Composition(CompositionError::MissingDependency {
                dependency: "modelService".to_string(),
                extension: "components(<no key>) from Test (t)".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_implementation_is_fatal() {
        let injector = injector(
            BundleDefinition::named("Test").extension("components", provider("nowhere")),
        );
        let err = injector.resolve("greeter").unwrap_err();
        assert!(matches!(
            err,
            FrameworkError::Composition(CompositionError::MissingImplementation { .. })
        ));
    }

    #[test]
    fn test_cycles_are_detected() {
        let mut implementations = ImplementationRegistry::new();
        implementations.register("t/src/noop", |_| Ok(instance(())));
        let mut registry = ExtensionRegistry::new();
        registry.register_bundle(&Bundle::new(
            "t",
            BundleDefinition::named("Test")
                .extension(
                    "components",
                    ExtensionDefinition::default()
                        .implementation("noop")
                        .depends(["b"])
                        .component(ComponentKind::Provider, "a"),
                )
                .extension(
                    "components",
                    ExtensionDefinition::default()
                        .implementation("noop")
                        .depends(["a"])
                        .component(ComponentKind::Provider, "b"),
                ),
        ));
        let injector = Injector::new(registry, implementations);

        let err = injector.resolve("a").unwrap_err();
        assert_eq!(
            err,
            FrameworkError::Composition(CompositionError::CyclicDependency {
                chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
            })
        );
    }

    #[test]
    fn test_constants_arrays_and_lazy_handles() {
        let mut implementations = implementations();
        implementations.register("t/src/reader", |injection| {
            let space: String = injection.constant_as("SPACE")?;
            let types = injection.extensions("types[]")?;
            let lazy = injection.lazy::<Arc<dyn Greeter>>("greeter")?;
            let keys: Vec<String> = types.iter().filter_map(|t| t.key().map(String::from)).collect();
            Ok(instance((space, keys, lazy)))
        });
        let mut registry = ExtensionRegistry::new();
        registry.register_bundle(&Bundle::new(
            "t",
            BundleDefinition::named("Test")
                .extension("constants", ExtensionDefinition::keyed("SPACE").with("value", json!("mct")))
                .extension("types", ExtensionDefinition::keyed("folder"))
                .extension("types", ExtensionDefinition::keyed("root").priority("mandatory"))
                .extension("components", provider("a"))
                .extension(
                    "components",
                    ExtensionDefinition::default()
                        .implementation("reader")
                        .depends(["SPACE", "types[]", "$injector"])
                        .component(ComponentKind::Provider, "reader"),
                ),
        ));
        let injector = Injector::new(registry, implementations);

        let (space, keys, lazy) = injector
            .service::<(String, Vec<String>, Lazy<Arc<dyn Greeter>>)>("reader")
            .unwrap();
        assert_eq!(space, "mct");
        assert_eq!(keys, vec!["root", "folder"]);

        let mut log = Vec::new();
        lazy.get().unwrap().greet(&mut log);
        assert_eq!(log, vec!["a"]);
    }

    #[test]
    fn test_undeclared_dependency_rejected() {
        let mut implementations = ImplementationRegistry::new();
        implementations.register("t/src/sneaky", |injection| {
            let _ = injection.constant("SECRET")?;
            Ok(instance(()))
        });
        let mut registry = ExtensionRegistry::new();
        registry.register_bundle(&Bundle::new(
            "t",
            BundleDefinition::named("Test").extension(
                "components",
                ExtensionDefinition::default()
                    .implementation("sneaky")
                    .component(ComponentKind::Provider, "sneaky"),
            ),
        ));
        let injector = Injector::new(registry, implementations);

        assert!(matches!(
            injector.resolve("sneaky").unwrap_err(),
            FrameworkError::Composition(CompositionError::UndeclaredDependency { .. })
        ));
    }
}
