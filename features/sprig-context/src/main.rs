use sprig_context::{
    ApplicationEvent, ApplicationListener, ComponentDescriptor, ComponentRegistry, ContextBuilder,
    DynError, FactoryPostProcessor, Instance, LifecyclePostProcessor, RegistryPostProcessor,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut context = ContextBuilder::new()
        .component(
            "personRegistrar",
            ComponentDescriptor::registry_processor(|_| Ok(PersonRegistrar)),
        )
        .component(
            "nameFormat",
            ComponentDescriptor::factory_processor(|_| Ok(UppercaseNames)).ordered(),
        )
        .component(
            "greetingAware",
            ComponentDescriptor::lifecycle_processor(|_| Ok(GreetingAware)),
        )
        .component("startupLog", ComponentDescriptor::listener(|_| Ok(StartupLog)))
        .build()?;

    let person = context.require::<Person>("person")?;
    println!("{:?}", person);
    println!("{:?}", context);

    context.close();
    Ok(())
}

#[derive(Debug)]
struct Person {
    name: String,
}

#[derive(Debug, Clone, Copy)]
struct NameFormat {
    uppercase: bool,
}

/// Registers the person component
struct PersonRegistrar;
impl FactoryPostProcessor for PersonRegistrar {
    fn post_process_factory(&self, _: &mut ComponentRegistry) -> Result<(), DynError> {
        Ok(())
    }
}
impl RegistryPostProcessor for PersonRegistrar {
    fn post_process_registry(&self, registry: &mut ComponentRegistry) -> Result<(), DynError> {
        let person = ComponentDescriptor::new(|ctx| {
            let name = ctx.property("name").unwrap_or("anonymous").to_string();
            let format = ctx
                .config::<NameFormat>()
                .map(|format| *format)
                .unwrap_or(NameFormat { uppercase: false });
            let name = if format.uppercase {
                name.to_uppercase()
            } else {
                name
            };
            Ok(Person { name })
        })
        .with_property("name", "Ferris");
        registry.register_descriptor("person", person)?;
        Ok(())
    }
}

struct UppercaseNames;
impl FactoryPostProcessor for UppercaseNames {
    fn post_process_factory(&self, registry: &mut ComponentRegistry) -> Result<(), DynError> {
        registry
            .config_mut()
            .replace(NameFormat { uppercase: true });
        Ok(())
    }
}

struct GreetingAware;
impl LifecyclePostProcessor for GreetingAware {
    fn after_initialization(
        &self,
        instance: Instance,
        name: &str,
        _: &ComponentRegistry,
    ) -> Result<Instance, DynError> {
        if let Ok(person) = instance.downcast::<Person>() {
            tracing::info!("Hello {}, you are known as '{name}'", person.name);
        }
        Ok(instance)
    }
}

struct StartupLog;
impl ApplicationListener for StartupLog {
    fn on_event(&self, event: &ApplicationEvent) {
        tracing::info!("Received {event:?}");
    }
}

