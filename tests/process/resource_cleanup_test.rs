/*!
 * Resource Cleanup Tests
 * Address space, working directory and console release on exit and reap
 */

use kproc::{AddressSpace, DirectoryHandle, ProcessManager};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    activated: AtomicUsize,
    deactivated: AtomicUsize,
    destroyed: AtomicUsize,
}

#[derive(Debug)]
struct TrackedSpace(Arc<Counters>);

impl AddressSpace for TrackedSpace {
    fn activate(&self) {
        self.0.activated.fetch_add(1, Ordering::SeqCst);
    }

    fn deactivate(&self) {
        self.0.deactivated.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(self: Box<Self>) {
        self.0.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct Dir(String);

impl DirectoryHandle for Dir {
    fn path(&self) -> &str {
        &self.0
    }
}

#[test]
fn test_exit_destroys_address_space_once() {
    let pm = ProcessManager::bootstrap();
    let counters = Arc::new(Counters::default());
    let child = pm.create("vm", Some(pm.kproc())).unwrap();

    child.replace_address_space(Some(Box::new(TrackedSpace(Arc::clone(&counters)))));
    child.with_address_space(|space| space.unwrap().activate());

    pm.exit(&child, 0).unwrap();
    assert!(!child.address_space_is_set());
    pm.wait(pm.kproc(), child.pid()).unwrap();

    assert_eq!(counters.activated.load(Ordering::SeqCst), 1);
    assert_eq!(counters.deactivated.load(Ordering::SeqCst), 1);
    assert_eq!(counters.destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_reap_drops_cwd_reference() {
    let root: Arc<dyn DirectoryHandle> = Arc::new(Dir("/".into()));
    let pm = ProcessManager::builder()
        .with_kernel_cwd(Arc::clone(&root))
        .build();

    let child = pm.create("sh", Some(pm.kproc())).unwrap();
    let pid = child.pid();
    drop(child);
    assert_eq!(Arc::strong_count(&root), 3);

    let child = pm.lookup(pid).unwrap();
    pm.exit(&child, 0).unwrap();
    // Zombies keep their directory until reaped
    assert_eq!(Arc::strong_count(&root), 3);

    pm.wait(pm.kproc(), pid).unwrap();
    assert_eq!(Arc::strong_count(&root), 2);
}

#[test]
fn test_chdir_swaps_reference() {
    let pm = ProcessManager::bootstrap();
    let child = pm.create("walker", Some(pm.kproc())).unwrap();
    assert!(child.cwd().is_none());

    let home: Arc<dyn DirectoryHandle> = Arc::new(Dir("/home".into()));
    assert!(child.replace_cwd(Some(Arc::clone(&home))).is_none());
    assert_eq!(child.cwd().unwrap().path(), "/home");

    let grandchild = pm.create("inherits", Some(&child)).unwrap();
    assert_eq!(grandchild.cwd().unwrap().path(), "/home");
}

#[cfg(feature = "console")]
#[test]
fn test_console_released_on_reap() {
    use kproc::process::DeviceHandle;

    #[derive(Debug)]
    struct Console;

    impl DeviceHandle for Console {
        fn device_name(&self) -> &str {
            "con:"
        }
    }

    let pm = ProcessManager::bootstrap();
    let console: Arc<dyn DeviceHandle> = Arc::new(Console);
    let child = pm.create("tty", Some(pm.kproc())).unwrap();
    child.set_console(Some(Arc::clone(&console)));
    assert_eq!(child.console().unwrap().device_name(), "con:");

    pm.exit(&child, 0).unwrap();
    pm.wait(pm.kproc(), child.pid()).unwrap();
    assert_eq!(Arc::strong_count(&console), 1);
}
