use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;
use wrapp_locator::{provide, ComponentDescriptor, Configuration, Locator, WiringTarget};

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
                        if let Ok(mut captured) = captured.lock() {
                            *captured = (*number, name.to_string());
                        }
                    })))
                },
            ),
            ComponentDescriptor::bound(
                "aggregateService",
                self,
                ["paramService"],
                |owner, args| {
                    let task = args.get::<Task>(0)?;
                    (task.0)();
                    let captured = owner.captured.lock().map_err(|e| e.to_string())?.clone();
                    provide(captured)
                },
            ),
        ]
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let locator = Locator::new()
        .add_configuration(Services::default())
        .add_wiring_target(WiringTarget::new("printer").with_hook(["aggregateService"], |args| {
            let observed = args.get::<(i32, String)>(0)?;
            let (number, name) = &*observed;
            println!("aggregateService observed {number} and {name}");
            Ok(())
        }));

    match futures::executor::block_on(locator.load_async()) {
        Ok(loaded) => {
            println!("{:?}", loaded.registry);
            loaded.registry.close();
        }
        Err(error) => eprintln!("{error}"),
    }
}
