use std::sync::Arc;

use rewire_di::{autowire, implements, ContainerOptions, DiContainer, ResolveError};

trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

#[derive(Default)]
struct ConsoleGreeter;
impl Greeter for ConsoleGreeter {
    fn greet(&self, name: &str) -> String {
        format!("Hello, {name}!")
    }
}
autowire!(impl ConsoleGreeter;);
implements!(ConsoleGreeter => dyn Greeter);

#[derive(Debug)]
struct Settings {
    audience: String,
}

struct Welcome {
    greeter: Arc<dyn Greeter>,
    settings: Arc<Settings>,
}
impl Welcome {
    fn new(greeter: Arc<dyn Greeter>, settings: Arc<Settings>) -> Self {
        Welcome { greeter, settings }
    }

    fn run(&self) -> String {
        self.greeter.greet(&self.settings.audience)
    }
}
autowire! {
    impl Welcome {
        fn new(greeter: dyn Greeter, settings: Settings);
    }
}

fn main() -> Result<(), ResolveError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let container = DiContainer::builder()
        .options(ContainerOptions {
            max_depth: Some(16),
            ..ContainerOptions::default()
        })
        .build();
    container
        .register::<ConsoleGreeter>()
        .register::<Welcome>()
        .singleton_to::<dyn Greeter, ConsoleGreeter>()
        .singleton_factory::<Settings, _, _>(|_| {
            Ok::<_, ResolveError>(Arc::new(Settings {
                audience: "world".to_string(),
            }))
        })
        .bind::<Welcome>();

    if let Err(errors) = container.validate() {
        eprintln!("{errors}");
    }

    let welcome = container.resolve::<Welcome>()?;
    println!("{}", welcome.run());
    println!("{container:?}");

    Ok(())
}
