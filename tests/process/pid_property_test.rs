/*!
 * PID Allocation Properties
 * Random create/exit/reap sequences against the table invariants
 */

use kproc::{Pid, Process, ProcError, ProcessManager, MAX_PID, MIN_PID};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Create,
    Exit(usize),
    Reap(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Create),
        1 => any::<usize>().prop_map(Op::Exit),
        1 => any::<usize>().prop_map(Op::Reap),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_live_pids_unique_and_bounded(limit in 2usize..16, ops in prop::collection::vec(op(), 1..120)) {
        let pm = ProcessManager::builder().with_pid_limit(limit).build();
        let mut live: Vec<Arc<Process>> = Vec::new();
        let mut reaped: HashSet<Pid> = HashSet::new();

        for op in ops {
            match op {
                Op::Create => match pm.create("p", Some(pm.kproc())) {
                    Ok(p) => {
                        // A reused PID must have been reaped first
                        reaped.remove(&p.pid());
                        live.push(p);
                    }
                    Err(err) => {
                        prop_assert_eq!(live.len() + 1, limit);
                        prop_assert!(matches!(err, ProcError::ResourceExhausted { .. }), "unexpected error: {:?}", err);
                    }
                },
                Op::Exit(i) if !live.is_empty() => {
                    let p = &live[i % live.len()];
                    if p.state().is_running() {
                        pm.exit(p, i as i32).unwrap();
                    }
                }
                Op::Reap(i) if !live.is_empty() => {
                    let p = live.swap_remove(i % live.len());
                    if p.state().is_running() {
                        pm.exit(&p, 0).unwrap();
                    }
                    pm.wait(pm.kproc(), p.pid()).unwrap();
                    prop_assert!(!pm.table().contains(p.pid()));
                    reaped.insert(p.pid());
                }
                _ => {}
            }

            let pids: Vec<Pid> = pm.list_processes().iter().map(|i| i.pid).collect();
            let unique: HashSet<Pid> = pids.iter().copied().collect();
            prop_assert_eq!(unique.len(), pids.len());
            prop_assert_eq!(pids.len(), live.len() + 1);
            prop_assert!(pids.iter().all(|pid| (MIN_PID..MAX_PID).contains(pid)));
            prop_assert!(pids.iter().all(|pid| !reaped.contains(pid)));
        }
    }
}
