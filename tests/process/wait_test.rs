/*!
 * Exit/Wait Concurrency Tests
 * Blocking waits, targeted wakeups and racing waiters
 */

use kproc::{Process, ProcError, ProcessManager};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn wait_for_waiters(process: &Process, count: usize) {
    while process.waiter_count() < count {
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_wait_blocks_until_exit() {
    let pm = Arc::new(ProcessManager::bootstrap());
    let child = pm.create("sleeper", Some(pm.kproc())).unwrap();
    let pid = child.pid();

    let waiter = {
        let pm = Arc::clone(&pm);
        thread::spawn(move || pm.wait(pm.kproc(), pid))
    };

    wait_for_waiters(&child, 1);
    assert!(!waiter.is_finished());

    pm.exit(&child, 42).unwrap();
    assert_eq!(waiter.join().unwrap(), Ok(42));
    assert!(!pm.table().contains(pid));
}

#[test]
fn test_exit_wakes_only_its_own_waiter() {
    let pm = Arc::new(ProcessManager::bootstrap());
    let child_a = pm.create("a", Some(pm.kproc())).unwrap();
    let child_b = pm.create("b", Some(pm.kproc())).unwrap();

    let spawn_waiter = |pid: kproc::Pid| {
        let pm = Arc::clone(&pm);
        thread::spawn(move || pm.wait(pm.kproc(), pid))
    };
    let waiter_a = spawn_waiter(child_a.pid());
    let waiter_b = spawn_waiter(child_b.pid());

    wait_for_waiters(&child_a, 1);
    wait_for_waiters(&child_b, 1);

    pm.exit(&child_a, 10).unwrap();
    assert_eq!(waiter_a.join().unwrap(), Ok(10));

    thread::sleep(Duration::from_millis(20));
    assert!(!waiter_b.is_finished());
    assert_eq!(child_b.waiter_count(), 1);

    pm.exit(&child_b, 11).unwrap();
    assert_eq!(waiter_b.join().unwrap(), Ok(11));
}

#[test]
fn test_exit_before_wait_is_not_missed() {
    let pm = Arc::new(ProcessManager::bootstrap());
    let child = pm.create("quick", Some(pm.kproc())).unwrap();
    let pid = child.pid();

    let exiter = {
        let pm = Arc::clone(&pm);
        thread::spawn(move || pm.exit(&child, 5))
    };
    exiter.join().unwrap().unwrap();

    assert_eq!(pm.wait(pm.kproc(), pid), Ok(5));
}

#[test]
fn test_racing_waiters_reap_exactly_once() {
    let pm = Arc::new(ProcessManager::bootstrap());
    let parent = pm.create("parent", Some(pm.kproc())).unwrap();
    let child = pm.create("contested", Some(&parent)).unwrap();
    let pid = child.pid();

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let pm = Arc::clone(&pm);
            let parent = Arc::clone(&parent);
            thread::spawn(move || pm.wait(&parent, pid))
        })
        .collect();

    wait_for_waiters(&child, 4);
    pm.exit(&child, 8).unwrap();

    let results: Vec<_> = waiters.into_iter().map(|w| w.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| **r == Ok(8)).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| **r == Err(ProcError::NotFound(pid)))
            .count(),
        3
    );
}

#[test]
fn test_concurrent_create_and_reap() {
    let pm = Arc::new(ProcessManager::bootstrap());

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let pm = Arc::clone(&pm);
            thread::spawn(move || {
                for round in 0..50 {
                    let child = pm.create("worker", Some(pm.kproc())).unwrap();
                    let code = i * 100 + round;
                    pm.exit(&child, code).unwrap();
                    assert_eq!(pm.wait(pm.kproc(), child.pid()), Ok(code));
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(pm.user_process_count(), 0);
}

#[test]
fn test_wait_for_user_processes() {
    let pm = Arc::new(ProcessManager::bootstrap());
    let programs: Vec<_> = (0..3)
        .map(|_| pm.create_runprogram("program").unwrap())
        .collect();

    let kernel_menu = {
        let pm = Arc::clone(&pm);
        thread::spawn(move || pm.wait_for_user_processes())
    };

    thread::sleep(Duration::from_millis(20));
    assert!(!kernel_menu.is_finished());

    for program in &programs {
        pm.exit(program, 0).unwrap();
    }
    kernel_menu.join().unwrap();
    assert_eq!(pm.user_process_count(), 0);
}

#[test]
fn test_create_racing_parent_exit_leaves_no_zombies() {
    for _ in 0..200 {
        let pm = Arc::new(ProcessManager::bootstrap());
        let parent = pm.create("parent", Some(pm.kproc())).unwrap();

        let exiter = {
            let pm = Arc::clone(&pm);
            let parent = Arc::clone(&parent);
            thread::spawn(move || pm.exit(&parent, 3))
        };
        let created = pm.create("child", Some(&parent));
        exiter.join().unwrap().unwrap();

        match created {
            Ok(child) => {
                assert_eq!(child.ppid(), None);
                pm.exit(&child, 0).unwrap();
            }
            Err(err) => assert!(matches!(err, ProcError::InvalidState { .. })),
        }
        assert_eq!(pm.wait(pm.kproc(), parent.pid()), Ok(3));
        assert_eq!(pm.user_process_count(), 0);
    }
}

#[test]
fn test_children_exiting_alongside_parent_are_all_reaped() {
    for _ in 0..100 {
        let pm = Arc::new(ProcessManager::bootstrap());
        let parent = pm.create("parent", Some(pm.kproc())).unwrap();
        let children: Vec<_> = (0..6)
            .map(|_| pm.create("child", Some(&parent)).unwrap())
            .collect();

        let exiters: Vec<_> = children
            .into_iter()
            .map(|child| {
                let pm = Arc::clone(&pm);
                thread::spawn(move || pm.exit(&child, 1))
            })
            .collect();
        pm.exit(&parent, 3).unwrap();
        for exiter in exiters {
            exiter.join().unwrap().unwrap();
        }

        assert_eq!(pm.wait(pm.kproc(), parent.pid()), Ok(3));
        assert_eq!(pm.user_process_count(), 0);
    }
}
