use std::{sync::Arc, thread, time::Duration};

use booter::{Booter, Cleanup, Container, ContainerError};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let shutdown = Booter::new()
        .add_instance("config.dsn", "postgres://localhost/demo".to_string())
        .add_unit(database)
        .add_unit(http)
        .boot();

    println!("{:?}", shutdown.container());
    let report = shutdown.shutdown();
    println!("{report:?}");
}

#[derive(Debug)]
struct Database {
    dsn: Arc<String>,
}

fn database(container: Container) -> Option<Cleanup> {
    if let Err(e) = container.register("db", |c: &Container| {
        // Pretend connecting takes a while
        thread::sleep(Duration::from_millis(50));
        Ok::<_, ContainerError>(Database {
            dsn: c.get_as::<String>("config.dsn")?,
        })
    }) {
        tracing::error!("{e}");
        return None;
    }

    let db = container.get_as::<Database>("db").ok()?;
    tracing::info!("Connected to {}", db.dsn);
    Some(Box::new(move || tracing::info!("Closing connection to {}", db.dsn)))
}

fn http(container: Container) -> Option<Cleanup> {
    container.cache("http.addr", "127.0.0.1:8080");
    container.alias("http.addr", "listen").ok()?;

    let addr = container.must_get_as::<&str>("listen");
    tracing::info!("Listening on {addr}");
    Some(Box::new(move || tracing::info!("Stopped listening on {addr}")))
}
