//! Same wiring as `wiring`, with container events logged through tracing.
//!
//! Run with `RUST_LOG=debug` to see registration, construction and
//! cache-hit events.

use armature::{BeanDef, Beans, ContainerBuilder};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug)]
struct Repository {
    conn_str: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut builder = ContainerBuilder::new();
    builder.register_value("conn_str", "sqlite::memory:".to_string())?;
    builder.register(
        BeanDef::new("repository")
            .depends_on(["conn_str"])
            .constructor(|deps: &Beans, _: &Beans| {
                Ok(Repository { conn_str: deps.get_cloned("conn_str")? })
            }),
    )?;

    let container = builder.build();

    // first call constructs, second hits the cache
    let repository = container.resolve::<Repository>("repository")?;
    let again = container.resolve::<Repository>("repository")?;

    println!("{} (shared: {})", repository.conn_str, std::sync::Arc::ptr_eq(&repository, &again));
    Ok(())
}
