//! Property-based tests for the memory model.
//!
//! Random command sequences over a handful of names, checking after every
//! command that:
//! 1. Reference counts equal the number of holders and nothing dangles
//! 2. A rejected command leaves the snapshot exactly as it was

use memsim::config::SimConfig;
use memsim::interpreter::engine::Executor;
use proptest::prelude::*;

// -- Command Generation Strategies --

fn name_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["a", "b", "c", "n"])
}

fn literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (-200i64..200).prop_map(|n| n.to_string()),
        Just("true".to_string()),
        Just("\"s\"".to_string()),
        Just("null".to_string()),
    ]
}

/// Declarations, assignments and scope commands, valid or not.
fn command_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (name_strategy(), literal_strategy()).prop_map(|(n, v)| format!("int {n} = {v};")),
        (name_strategy(), 0i64..10).prop_map(|(n, k)| format!("object {n} = new object(id = {k});")),
        name_strategy().prop_map(|n| format!("object {n} = null;")),
        (name_strategy(), name_strategy()).prop_map(|(n, m)| format!("object {n} = {m};")),
        (name_strategy(), name_strategy(), name_strategy())
            .prop_map(|(n, m, k)| format!("object[] {n} = {{{m}, {k}, null}};")),
        (name_strategy(), literal_strategy()).prop_map(|(n, v)| format!("int[] {n} = {{{v}, 1}};")),
        (name_strategy(), name_strategy()).prop_map(|(n, m)| format!("{n} = {m};")),
        name_strategy().prop_map(|n| format!("{n} = null;")),
        name_strategy().prop_map(|n| format!("{n} = new object(id = 1);")),
        (name_strategy(), literal_strategy()).prop_map(|(n, v)| format!("{n} = {v};")),
        Just("enter f();".to_string()),
        Just("leave;".to_string()),
    ]
}

// -- Properties --

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn invariants_hold_after_every_command(commands in prop::collection::vec(command_strategy(), 1..40)) {
        let config = SimConfig::default().with_max_frames(4).with_max_heap_entries(6);
        let mut executor = Executor::new(&config);

        for command in &commands {
            let before = executor.snapshot();
            let outcome = executor.run(command);

            prop_assert!(
                executor.memory().check_invariants().is_ok(),
                "after {:?}: {:?}",
                command,
                executor.memory().check_invariants()
            );
            if !outcome.ok {
                prop_assert_eq!(&executor.snapshot(), &before, "{} mutated the model", command);
            }
        }
    }

    #[test]
    fn leaving_every_frame_restores_the_root_heap(commands in prop::collection::vec(command_strategy(), 1..30)) {
        let mut executor = Executor::new(&SimConfig::default());
        let root_heap = executor.snapshot().heap.len();

        executor.run("enter scratch();");
        for command in commands.iter().filter(|command| command.as_str() != "leave;") {
            executor.run(command);
        }
        while executor.run("leave;").ok {}

        // Root frame was empty, so nothing can survive it
        let snapshot = executor.snapshot();
        prop_assert_eq!(snapshot.frames.len(), 1);
        prop_assert_eq!(snapshot.heap.len(), root_heap);
    }
}
