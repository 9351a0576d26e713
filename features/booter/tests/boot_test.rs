use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use booter::{boot, BootUnit, Booter, Cleanup, Container, ContainerError};

#[test]
fn boot_returns_shutdown() {
    let unit: BootUnit = Box::new(|_: Container| -> Option<Cleanup> { Some(Box::new(|| {})) });

    let report = boot(vec![unit]).shutdown();

    assert_eq!(report.units, 1);
    assert_eq!(report.cleanups_run, 1);
}

#[derive(Debug)]
struct Repository {
    dsn: Arc<String>,
}

#[test]
fn units_build_services_from_each_other() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let closed = Arc::new(AtomicUsize::new(0));

    let storage = {
        let constructed = constructed.clone();
        let closed = closed.clone();
        move |c: Container| -> Option<Cleanup> {
            c.register("repository", move |c: &Container| {
                constructed.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ContainerError>(Repository {
                    dsn: c.get_as::<String>("dsn")?,
                })
            })
            .ok()?;
            c.alias("repository", "repo").ok()?;

            // Several units may race for the repository, it is still built once
            c.get("repo").ok()?;
            Some(Box::new(move || {
                closed.fetch_add(1, Ordering::SeqCst);
            }))
        }
    };

    let shutdown = Booter::new()
        .add_instance("dsn", "sqlite::memory:".to_string())
        .add_unit(storage)
        .boot();

    let container = shutdown.container().clone();
    let report = shutdown.shutdown();

    assert_eq!(report.cleanups_run, 1);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert_eq!(constructed.load(Ordering::SeqCst), 1);

    let repo = container.get_as::<Repository>("repository").unwrap();
    assert_eq!(*repo.dsn, "sqlite::memory:");
    assert!(Arc::ptr_eq(&container.get_as::<Repository>("repo").unwrap(), &repo));
}

#[test]
fn circular_services_surface_as_errors() {
    let container = Container::new();
    container
        .register("a", |c: &Container| {
            c.get("b")?;
            Ok::<_, ContainerError>("a")
        })
        .unwrap();
    container
        .register("b", |c: &Container| {
            c.get("a")?;
            Ok::<_, ContainerError>("b")
        })
        .unwrap();

    let err = container.get("a").unwrap_err();
    assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
}
