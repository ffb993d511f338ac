// Frame lifetime, name resolution, limits and atomic rejection

use memsim::config::SimConfig;
use memsim::interpreter::engine::{Executor, Outcome};
use pretty_assertions::assert_eq;

fn run_ok(executor: &mut Executor, lines: &[&str]) {
    for line in lines {
        let outcome = executor.run(line);
        assert!(outcome.ok, "{line}: {}", outcome.message);
    }
}

#[test]
fn test_leave_collects_cascading_references() {
    let mut executor = Executor::new(&SimConfig::default());
    run_ok(
        &mut executor,
        &[
            "object keep = new object(id = 0);",
            "enter f();",
            "object a = new object(id = 2);",
            "object[] arr = {a, a};",
        ],
    );
    assert_eq!(executor.snapshot().heap.len(), 3);
    assert_eq!(executor.snapshot().referent_of("a").map(|e| e.ref_count), Some(3));

    let outcome = executor.run("leave;");
    assert_eq!(outcome, Outcome::success("left frame 'f'; collected 0x5, 0x3"));

    let snapshot = executor.snapshot();
    assert_eq!(snapshot.frames.len(), 1);
    assert_eq!(snapshot.heap.len(), 1);
    assert_eq!(snapshot.referent_of("keep").map(|e| e.ref_count), Some(1));
}

#[test]
fn test_outer_frames_are_invisible() {
    let mut executor = Executor::new(&SimConfig::default());
    run_ok(&mut executor, &["object p = new object(id = 1);", "enter f(p);"]);

    assert_eq!(
        executor.run("object q = p;"),
        Outcome::failure("undeclared variable 'p' in frame 'f'")
    );
    run_ok(&mut executor, &["object p = null;", "leave;"]);
    assert_eq!(executor.snapshot().referent_of("p").map(|e| e.ref_count), Some(1));
}

#[test]
fn test_frame_ids_keep_growing() {
    let mut executor = Executor::new(&SimConfig::default());
    assert_eq!(executor.run("enter a();"), Outcome::success("entered frame 'a' (#1)"));
    run_ok(&mut executor, &["leave;"]);
    assert_eq!(executor.run("enter b();"), Outcome::success("entered frame 'b' (#2)"));
}

#[test]
fn test_root_frame_is_permanent() {
    let config = SimConfig::default().with_root_frame("global");
    let mut executor = Executor::new(&config);

    for _ in 0..3 {
        assert_eq!(
            executor.run("leave;"),
            Outcome::failure("cannot leave the root frame 'global'")
        );
    }
    assert_eq!(executor.snapshot().frames[0].name, "global");
}

#[test]
fn test_stack_limit() {
    let mut executor = Executor::new(&SimConfig::default().with_max_frames(3));
    run_ok(&mut executor, &["enter a();", "enter b();"]);

    let before = executor.snapshot();
    assert_eq!(
        executor.run("enter c();"),
        Outcome::failure("stack overflow: frame limit of 3 reached")
    );
    assert_eq!(executor.snapshot(), before);
}

#[test]
fn test_heap_limit() {
    let mut executor = Executor::new(&SimConfig::default().with_max_heap_entries(2));
    run_ok(
        &mut executor,
        &["object a = new object(id = 1);", "int[] ns = {1};", "object b = null;"],
    );

    let before = executor.snapshot();
    for line in ["object c = new object(id = 3);", "b = new object(id = 3);", "int[] ms = {2};"] {
        assert_eq!(
            executor.run(line),
            Outcome::failure("out of heap: limit of 2 live entries reached"),
            "{line}"
        );
        assert_eq!(executor.snapshot(), before, "{line}");
    }

    // Freeing an entry makes room again
    run_ok(&mut executor, &["a = null;", "b = new object(id = 3);"]);
}

#[test]
fn test_rejection_is_idempotent() {
    let mut executor = Executor::new(&SimConfig::default());
    run_ok(&mut executor, &["int x = 1;", "object p = new object(id = 1);"]);
    let before = executor.snapshot();

    for line in ["int x = 5;", "x = p;", "p = x;", "p = new Persona(id = 1);", "short s = 40000;"] {
        let first = executor.run(line);
        let second = executor.run(line);
        assert!(!first.ok, "{line}");
        assert_eq!(first, second, "{line}");
        assert_eq!(executor.snapshot(), before, "{line}");
    }
}

#[test]
fn test_self_assignment_keeps_counts() {
    let mut executor = Executor::new(&SimConfig::default());
    run_ok(&mut executor, &["object p = new object(id = 1);", "p = p;"]);
    assert_eq!(executor.snapshot().referent_of("p").map(|e| e.ref_count), Some(1));
}

#[test]
fn test_enter_then_leave_restores_the_snapshot() {
    let mut executor = Executor::new(&SimConfig::default());
    run_ok(
        &mut executor,
        &["int x = 3;", "object p = new object(id = 1);", "object[] ps = {p, null};"],
    );
    let before = executor.snapshot();

    run_ok(&mut executor, &["enter f();", "leave;"]);
    assert_eq!(executor.snapshot(), before);

    // Frame-local allocations are collected on the way out
    run_ok(
        &mut executor,
        &[
            "enter g();",
            "int y = 5;",
            "object r = new object(id = 2);",
            "object[] rs = {r, r};",
            "int[] ns = {y, 4};",
            "leave;",
        ],
    );
    assert_eq!(executor.snapshot(), before);
}
