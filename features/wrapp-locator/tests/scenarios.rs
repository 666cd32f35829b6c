use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use wrapp_locator::{
    provide, Close, ComponentDescriptor, Configuration, DependencyGraphError, DynError, Instance,
    LoadError, LoaderConfig, Locator, WiringError, WiringHook, WiringTarget,
};

/// Task handed around between components
struct Task(Box<dyn Fn() + Send + Sync>);

#[derive(Default)]
struct Services {
    captured: Arc<Mutex<(i32, String)>>,
}

impl Configuration for Services {
    fn components(self: Arc<Self>) -> Vec<ComponentDescriptor> {
        vec![
            ComponentDescriptor::bound("intService", self.clone(), Vec::<&str>::new(), |_, _| {
                provide(6_i32)
            }),
            ComponentDescriptor::bound("stringService", self.clone(), Vec::<&str>::new(), |_, _| {
                provide("anders".to_string())
            }),
            ComponentDescriptor::bound(
                "paramService",
                self.clone(),
                ["intService", "stringService"],
                |owner, args| {
                    let number = args.get::<i32>(0)?;
                    let name = args.get::<String>(1)?;
                    let captured = owner.captured.clone();
                    provide(Task(Box::new(move || {
                        *captured.lock().unwrap() = (*number, name.to_string());
                    })))
                },
            ),
            ComponentDescriptor::bound(
                "aggregateService",
                self.clone(),
                ["paramService"],
                |owner, args| {
                    (args.get::<Task>(0)?.0)();
                    let captured = owner.captured.lock().unwrap().clone();
                    provide(captured)
                },
            ),
            ComponentDescriptor::bound("unrelated", self, Vec::<&str>::new(), |_, _| {
                provide(Task(Box::new(|| {})))
            }),
        ]
    }
}

/// Second configuration which uses a component of [Services]
#[derive(Default)]
struct Extra {
    captured: Arc<Mutex<(i32, String)>>,
}

impl Configuration for Extra {
    fn components(self: Arc<Self>) -> Vec<ComponentDescriptor> {
        vec![
            ComponentDescriptor::bound("seven", self.clone(), Vec::<&str>::new(), |_, _| {
                provide(7_i32)
            }),
            ComponentDescriptor::bound("privacy", self, ["paramService"], |owner, args| {
                (args.get::<Task>(0)?.0)();
                let untouched = *owner.captured.lock().unwrap() == (0, String::new());
                provide(untouched)
            }),
        ]
    }
}

#[test]
fn scenario_a_loads_and_passes_arguments_in_order() {
    let services = Services::default();
    let captured = services.captured.clone();

    let loaded = Locator::new()
        .fail_on_null_instance()
        .add_configuration(services)
        .load()
        .unwrap();

    assert_eq!(loaded.registry.len(), 5);
    let observed = loaded
        .registry
        .get_as::<(i32, String)>("aggregateService")
        .unwrap();
    assert_eq!(*observed, (6, "anders".to_string()));
    assert_eq!(*captured.lock().unwrap(), (6, "anders".to_string()));
    assert!(loaded.wiring.is_clean());
}

#[test]
fn scenario_b_mutual_requirement_is_a_cycle() {
    let result = Locator::new()
        .add_component(ComponentDescriptor::free("b", ["c"], |_| Ok(None)))
        .add_component(ComponentDescriptor::free("c", ["b"], |_| Ok(None)))
        .load();

    match result {
        Err(LoadError::DependencyGraph(DependencyGraphError::CircularDependency { from, to })) => {
            let mut names = [from.as_str().to_string(), to.as_str().to_string()];
            names.sort();
            assert_eq!(names, ["b", "c"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn scenario_c_self_requirement_is_a_cycle() {
    let result = Locator::new()
        .add_component(ComponentDescriptor::free("a", ["A"], |_| Ok(None)))
        .load();

    assert!(matches!(
        result,
        Err(LoadError::DependencyGraph(DependencyGraphError::CircularDependency { from, to }))
            if from.as_str() == "a" && to.as_str() == "a"
    ));
}

#[test]
fn scenario_d_unknown_requirement_is_missing() {
    let result = Locator::new()
        .add_component(ComponentDescriptor::free("logic", ["thisNameShouldNotExist"], |_| {
            provide("test")
        }))
        .load();

    match result {
        Err(LoadError::DependencyGraph(DependencyGraphError::MissingDependency {
            component,
            required,
            resolved,
        })) => {
            assert_eq!(component.as_str(), "logic");
            assert_eq!(required.len(), 1);
            assert_eq!(required[0].as_str(), "thisnameshouldnotexist");
            assert!(resolved.is_empty());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn configurations_do_not_leak_state() {
    let services = Services::default();
    let extra = Extra::default();
    let services_state = services.captured.clone();
    let extra_state = extra.captured.clone();

    let loaded = Locator::new()
        .fail_on_null_instance()
        .add_configuration(extra)
        .add_configuration(services)
        .load()
        .unwrap();

    assert_eq!(loaded.registry.len(), 7);
    assert!(*loaded.registry.get_as::<bool>("privacy").unwrap());
    assert_eq!(*extra_state.lock().unwrap(), (0, String::new()));
    assert_eq!(services_state.lock().unwrap().0, 6);
}

#[test]
fn independent_components_all_load_in_any_order() {
    let names = ["e", "c", "a", "d", "b"];
    for rotation in 0..names.len() {
        let mut locator = Locator::new().fail_on_null_instance();
        for name in names.iter().cycle().skip(rotation).take(names.len()) {
            let value = name.to_string();
            locator = locator.add_component(ComponentDescriptor::free(
                *name,
                Vec::<&str>::new(),
                move |_| provide(value.clone()),
            ));
        }

        let registry = locator.load().unwrap().registry;
        assert_eq!(registry.len(), names.len());
        for name in names {
            assert_eq!(*registry.get_as::<String>(name).unwrap(), name);
        }
    }
}

#[test]
fn duplicates_fail_before_anything_is_instantiated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = |name: &str| {
        let calls = calls.clone();
        ComponentDescriptor::free(name, Vec::<&str>::new(), move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            provide(())
        })
    };

    let result = Locator::new()
        .add_component(counted("first"))
        .add_component(counted("Service"))
        .add_instance("SERVICE", 1_u8)
        .load();

    assert!(matches!(
        result,
        Err(LoadError::DependencyGraph(DependencyGraphError::Duplicate(name))) if name.as_str() == "service"
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn failing_factory_is_reported_as_null_instance() {
    let strict = Locator::new()
        .fail_on_null_instance()
        .add_component(ComponentDescriptor::free("broken", Vec::<&str>::new(), |_| {
            Err("no database".into())
        }))
        .load();
    assert!(matches!(
        strict,
        Err(LoadError::NullInstance(names)) if names.len() == 1 && names[0].as_str() == "broken"
    ));

    let lenient = Locator::new()
        .add_component(ComponentDescriptor::free("broken", Vec::<&str>::new(), |_| {
            Err("no database".into())
        }))
        .add_instance("healthy", true)
        .load()
        .unwrap();
    assert!(lenient.registry.get("broken").is_none());
    assert!(lenient.registry.contains("healthy"));
}

struct Connection {
    closed: Arc<AtomicBool>,
}
impl Close for Connection {
    fn close(&self) -> Result<(), DynError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct Stubborn;
impl Close for Stubborn {
    fn close(&self) -> Result<(), DynError> {
        Err("still busy".into())
    }
}

#[test]
fn shutdown_closes_every_closeable_component() {
    let closed = Arc::new(AtomicBool::new(false));
    let flag = closed.clone();

    let registry = Locator::new()
        .add_prebuilt("stubborn", Instance::closeable(Stubborn))
        .add_component(ComponentDescriptor::free("zconnection", ["url"], move |args| {
            assert_eq!(*args.get::<&str>(0)?, "db://local");
            Ok(Some(Instance::closeable(Connection {
                closed: flag.clone(),
            })))
        }))
        .add_instance("url", "db://local")
        .load()
        .unwrap()
        .registry;

    assert_eq!(registry.closeables().len(), 2);
    assert_eq!(registry.close(), 1);
    assert!(closed.load(Ordering::SeqCst));
}

/// Components which know each other, something the dependency graph does not allow
struct Peer {
    name: &'static str,
    other: Mutex<Option<Arc<Peer>>>,
}

fn peer(name: &'static str, other: &'static str) -> ComponentDescriptor {
    ComponentDescriptor::free(name, Vec::<&str>::new(), move |_| {
        provide(Peer {
            name,
            other: Mutex::new(None),
        })
    })
    .with_wiring([other], |instance, args| {
        let this = instance.downcast::<Peer>().map_err(|e| e.to_string())?;
        *this.other.lock().unwrap() = Some(args.get::<Peer>(0)?);
        Ok(())
    })
}

#[test]
fn deferred_wiring_connects_components_after_install() {
    let observed = Arc::new(Mutex::new(None));
    let sink = observed.clone();

    let loaded = Locator::new()
        .add_component(peer("ping", "pong"))
        .add_component(peer("pong", "ping"))
        .add_wiring_target(WiringTarget::new("observer").with_hook(["PING"], move |args| {
            *sink.lock().unwrap() = Some(args.get::<Peer>(0)?.name);
            Ok(())
        }))
        .load()
        .unwrap();

    assert!(loaded.wiring.is_clean());
    assert_eq!(loaded.wiring.invoked, 3);
    assert_eq!(*observed.lock().unwrap(), Some("ping"));

    let ping = loaded.registry.get_as::<Peer>("ping").unwrap();
    let pong = ping.other.lock().unwrap().clone().unwrap();
    assert_eq!(pong.name, "pong");
    assert_eq!(pong.other.lock().unwrap().as_ref().unwrap().name, "ping");
}

struct Wired {
    seen: Arc<AtomicUsize>,
}

impl Configuration for Wired {
    fn name(&self) -> String {
        "wired".to_string()
    }

    fn components(self: Arc<Self>) -> Vec<ComponentDescriptor> {
        vec![ComponentDescriptor::free("number", Vec::<&str>::new(), |_| provide(41_usize))]
    }

    fn wiring(self: Arc<Self>) -> Vec<WiringHook> {
        vec![WiringHook::new(["number"], move |args| {
            self.seen.store(*args.get::<usize>(0)? + 1, Ordering::SeqCst);
            Ok(())
        })]
    }
}

#[test]
fn unresolved_wiring_parameter_is_skipped_when_lenient() {
    let seen = Arc::new(AtomicUsize::new(0));

    let loaded = Locator::new()
        .add_configuration(Wired { seen: seen.clone() })
        .add_wiring_target(WiringTarget::new("lost").with_hook(["nobody"], |_| Ok(())))
        .load()
        .unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 42);
    assert_eq!(loaded.wiring.invoked, 1);
    assert!(matches!(
        loaded.wiring.failures.as_slice(),
        [WiringError::UnresolvedParameter { target, .. }] if target == "lost"
    ));
}

#[test]
fn unresolved_wiring_parameter_fails_when_strict() {
    let seen = Arc::new(AtomicUsize::new(0));

    let result = Locator::new()
        .with_config(LoaderConfig::strict())
        .add_configuration(Wired { seen: seen.clone() })
        .add_wiring_target(WiringTarget::new("lost").with_hook(["nobody"], |_| Ok(())))
        .load();

    assert!(matches!(
        result,
        Err(LoadError::Wiring(WiringError::UnresolvedParameter { parameter, .. }))
            if parameter.as_str() == "nobody"
    ));
    // No hook runs once the check failed
    assert_eq!(seen.load(Ordering::SeqCst), 0);
}

#[test]
fn async_load_completes_after_wiring() {
    let wired = Arc::new(AtomicBool::new(false));
    let flag = wired.clone();

    let handle = Locator::new()
        .add_configuration(Services::default())
        .add_wiring_target(WiringTarget::new("late").with_hook(["aggregateService"], move |_| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        }))
        .load_async();

    let loaded = futures::executor::block_on(handle).unwrap();
    assert!(wired.load(Ordering::SeqCst));
    assert_eq!(loaded.registry.len(), 5);
}

#[test]
fn async_load_reports_fatal_errors() {
    let handle = Locator::new()
        .add_component(ComponentDescriptor::free("a", ["b"], |_| provide(())))
        .add_component(ComponentDescriptor::free("b", ["a"], |_| provide(())))
        .load_async();

    assert!(matches!(
        futures::executor::block_on(handle),
        Err(LoadError::DependencyGraph(DependencyGraphError::CircularDependency { .. }))
    ));
}
