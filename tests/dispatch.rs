use anyhow::Result;
use anyedn::dispatch::{Dispatch, DispatchError, TypeGraph};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn diamond() -> TypeGraph<&'static str> {
    // Object <- A <- B, C <- D, with D listing B before C
    TypeGraph::builder("Object")
        .declare("A", vec![])
        .declare("B", vec!["A"])
        .declare("C", vec!["A"])
        .declare("D", vec!["B", "C"])
        .build()
}

#[test]
fn linearization() -> Result<()> {
    let g = diamond();
    assert_eq!(g.linearize(&"D")?, ["D", "B", "C", "A", "Object"]);
    assert_eq!(g.linearize(&"C")?, ["C", "A", "Object"]);
    assert_eq!(g.linearize(&"Object")?, ["Object"]);
    assert_eq!(g.linearize(&"Undeclared")?, ["Undeclared", "Object"]);
    assert!(! g.is_declared(&"Undeclared"));
    assert_eq!(g.supertypes(&"A"), ["Object"]);
    Ok(())
}

#[test]
fn linearization_keeps_local_precedence() -> Result<()> {
    // the classic example from the Dylan paper
    let g = TypeGraph::builder("object")
        .declare("boat", vec![])
        .declare("day-boat", vec!["boat"])
        .declare("wheel-boat", vec!["boat"])
        .declare("engine-less", vec!["day-boat"])
        .declare("small-multihull", vec!["day-boat"])
        .declare("pedal-wheel-boat", vec!["engine-less", "wheel-boat"])
        .declare("small-catamaran", vec!["small-multihull"])
        .declare("pedalo", vec!["pedal-wheel-boat", "small-catamaran"])
        .build();
    assert_eq!(g.linearize(&"pedalo")?,
               ["pedalo", "pedal-wheel-boat", "engine-less", "small-catamaran",
                "small-multihull", "day-boat", "wheel-boat", "boat", "object"]);
    Ok(())
}

#[test]
fn inconsistent_order_is_an_error() {
    let g = TypeGraph::builder("Object")
        .declare("X", vec![])
        .declare("Y", vec![])
        .declare("A", vec!["X", "Y"])
        .declare("B", vec!["Y", "X"])
        .declare("Z", vec!["A", "B"])
        .build();
    assert!(matches!(g.linearize(&"Z"), Err(DispatchError::InconsistentOrder { .. })));
    // types not involved are unaffected
    assert!(g.linearize(&"A").is_ok());

    let table = Dispatch::builder(g, "nil").bind("Object", "object").build();
    assert!(matches!(table.lookup(Some(&"Z")),
                     Err(DispatchError::InconsistentOrder { .. })));
    assert_eq!(table.lookup(Some(&"B")), Ok(Some("object")));
}

#[test]
fn cycles_are_an_error() {
    let g = TypeGraph::builder("Object")
        .declare("A", vec!["B"])
        .declare("B", vec!["A"])
        .build();
    assert!(matches!(g.linearize(&"A"), Err(DispatchError::Cycle(_))));
}

#[test]
fn lookup_picks_the_most_specific_binding() {
    let table = Dispatch::builder(diamond(), "nil")
        .bind("A", "a")
        .bind("C", "c")
        .build();
    assert_eq!(table.lookup(Some(&"D")), Ok(Some("c")));
    assert_eq!(table.lookup(Some(&"B")), Ok(Some("a")));
    assert_eq!(table.lookup(Some(&"A")), Ok(Some("a")));
    assert_eq!(table.lookup(Some(&"Object")), Ok(None));
    assert_eq!(table.lookup(Some(&"Undeclared")), Ok(None));
    assert_eq!(table.lookup(None), Ok(Some("nil")));

    let table = Dispatch::builder(diamond(), "nil")
        .bind("A", "a")
        .bind("B", "b")
        .bind("C", "c")
        .build();
    // B precedes C in D's declaration
    assert_eq!(table.lookup(Some(&"D")), Ok(Some("b")));
}

#[test]
fn later_bindings_replace_earlier_ones() {
    let table = Dispatch::builder(diamond(), 0)
        .bind("A", 1)
        .bind("A", 2)
        .build();
    assert_eq!(table.lookup(Some(&"D")), Ok(Some(2)));
}

#[test]
fn resolved_handlers_are_remembered() {
    // handlers that count how often the table hands them out via
    // cloning
    #[derive(Debug)]
    struct Counted(Arc<AtomicUsize>);
    impl Clone for Counted {
        fn clone(&self) -> Self {
            self.0.fetch_add(1, Ordering::SeqCst);
            Counted(self.0.clone())
        }
    }
    let clones = Arc::new(AtomicUsize::new(0));
    let table = Dispatch::builder(diamond(), Counted(Arc::new(AtomicUsize::new(0))))
        .bind("A", Counted(clones.clone()))
        .build();
    assert!(table.lookup(Some(&"D")).unwrap().is_some());
    let after_first = clones.load(Ordering::SeqCst);
    assert!(table.lookup(Some(&"D")).unwrap().is_some());
    // the second lookup only clones the cached entry for the caller
    assert_eq!(clones.load(Ordering::SeqCst), after_first + 1);
    assert_eq!(table.lookup(Some(&"Object")).unwrap().map(|_| ()), None);
    assert_eq!(table.lookup(Some(&"Object")).unwrap().map(|_| ()), None);
}

#[test]
fn lookups_from_many_threads() {
    let table = Arc::new(Dispatch::builder(diamond(), "nil")
                         .bind("B", "b")
                         .bind("C", "c")
                         .build());
    let handles: Vec<_> = (0..8).map(|i| {
        let table = table.clone();
        std::thread::spawn(move || {
            let ty = if i % 2 == 0 { "D" } else { "C" };
            (0..100).map(|_| table.lookup(Some(&ty)))
                .all(|r| r == Ok(Some(if i % 2 == 0 { "b" } else { "c" })))
        })
    }).collect();
    for h in handles {
        assert!(h.join().unwrap());
    }
}
