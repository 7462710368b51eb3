use harbor_commands::{CommandError, CommandRegistry, CommandRouter, DispatchOutcome, Invocation};
use harbor_domain::constants::MUTE;
use harbor_kernel::output::CapturedOutput;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_distinct_registrations_are_independently_retrievable() {
    let registry = CommandRegistry::new();
    let names = ["/alpha", "/beta", "/gamma"];
    for name in names {
        registry.register(name, |_: &Invocation| Ok(()), format!("help for {name}"), true).unwrap();
    }

    for name in names {
        let entry = registry.lookup(name).expect("registered");
        assert_eq!(entry.help, format!("help for {name}"));
    }
    let listed: Vec<_> = registry.list_visible(false).into_iter().map(|e| e.name).collect();
    assert_eq!(listed, names);
}

#[test]
fn test_failing_handler_does_not_stop_later_dispatches() {
    let registry = Arc::new(CommandRegistry::new());
    let output = Arc::new(CapturedOutput::default());
    let router = CommandRouter::new(registry.clone(), output.clone());

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    registry
        .register(
            "/flaky",
            move |_: &Invocation| {
                if counter.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                    Err(CommandError::handler(std::io::Error::other("disk full")))
                } else {
                    Ok(())
                }
            },
            "",
            true,
        )
        .unwrap();

    let outcomes: Vec<_> = (0..4).map(|_| router.dispatch("/flaky")).collect();
    assert_eq!(
        outcomes,
        [DispatchOutcome::Failed, DispatchOutcome::Handled, DispatchOutcome::Failed, DispatchOutcome::Handled]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(output.errors().len(), 2);
}

#[test]
fn test_unregistered_command_runs_nothing() {
    let registry = Arc::new(CommandRegistry::new());
    let output = Arc::new(CapturedOutput::default());
    let router = CommandRouter::new(registry.clone(), output.clone());

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    registry
        .register(MUTE, move |_: &Invocation| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }, "", true)
        .unwrap();

    assert_eq!(router.dispatch("/xlmutex ugly word"), DispatchOutcome::Unknown);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(output.lines().is_empty());
}

#[test]
fn test_concurrent_dispatch_is_safe() {
    let registry = Arc::new(CommandRegistry::new());
    let output = Arc::new(CapturedOutput::default());
    let router = CommandRouter::new(registry.clone(), output);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    registry
        .register("/record", move |inv: &Invocation| {
            sink.lock().push(inv.args.clone());
            Ok(())
        }, "", true)
        .unwrap();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let router = router.clone();
            scope.spawn(move || {
                for i in 0..25 {
                    assert_eq!(router.dispatch(&format!("/record {worker}-{i}")), DispatchOutcome::Handled);
                }
            });
        }
    });

    assert_eq!(seen.lock().len(), 100);
}
