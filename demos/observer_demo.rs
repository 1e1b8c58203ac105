//! # Example: observer_demo
//!
//! Two modules observe the same topic on one shared bus. One of them has a
//! broken observer; the other keeps receiving notifications. Unloading the
//! first module removes only its observers.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example observer_demo
//! ```

use std::sync::Arc;

use observer_service::{
    Bus, Config, Loader, Notification, ObserverError, ObserverFn, ObserverRef, Payload,
    PlainTextConsole,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();

    let bus = Bus::new();

    // Module A: reports failures on stderr.
    let module_a = Loader::builder(bus.clone())
        .with_config(Config::for_program("module-a"))
        .with_sink(Arc::new(PlainTextConsole::stderr()))
        .build();
    // Module B: default tracing sink.
    let module_b = Loader::builder(bus.clone())
        .with_config(Config::for_program("module-b"))
        .build();

    let a = module_a.registry();
    let b = module_b.registry();

    let printer: ObserverRef = ObserverFn::arc("printer", |n: &Notification| {
        println!(
            "[printer] topic={} seq={} data={:?}",
            n.topic,
            n.seq,
            n.data_str().unwrap_or("<none>")
        );
        Ok(())
    });
    let broken: ObserverRef = ObserverFn::arc("broken", |_n: &Notification| {
        Err(ObserverError::new("always fails"))
    });

    a.add("status", broken)?;
    a.add("status", Arc::clone(&printer))?;
    b.add("status", Arc::clone(&printer))?;

    let reached = a.notify("status", None, Some(Payload::text("first")));
    println!("first broadcast reached {reached} listeners");

    module_a.unload();

    let reached = b.notify("status", None, Some(Payload::text("second")));
    println!("second broadcast reached {reached} listeners");

    Ok(())
}
