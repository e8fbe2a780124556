//! Wires a small config -> repository -> service graph and resolves it.

use armature::{BeanDef, Beans, ContainerBuilder};
use std::sync::Arc;

#[derive(Debug)]
struct Repository {
    conn_str: String,
}

#[derive(Debug)]
struct Greeter {
    repository: Arc<Repository>,
    greeting: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = ContainerBuilder::new();

    builder.register_value("conn_str", "sqlite::memory:".to_string())?;
    builder.register(
        BeanDef::new("repository")
            .depends_on(["conn_str"])
            .constructor(|deps: &Beans, _: &Beans| {
                Ok(Repository { conn_str: deps.get_cloned("conn_str")? })
            }),
    )?;
    builder.register(
        BeanDef::new("greeter")
            .depends_on(["repository"])
            .param("greeting", "hello".to_string())
            .constructor(|deps: &Beans, params: &Beans| {
                Ok(Greeter {
                    repository: deps.get("repository")?,
                    greeting: params.get_cloned("greeting")?,
                })
            }),
    )?;

    let container = builder.build();
    let greeter = container.resolve::<Greeter>("greeter")?;

    println!("{} from {}", greeter.greeting, greeter.repository.conn_str);
    Ok(())
}
