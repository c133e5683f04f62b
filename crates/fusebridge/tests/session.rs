//! Whole sessions through the fake native layer: table construction,
//! startup arguments, init/destroy, private data and fault handling.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use fusebridge::abi::{ConnInfo, FuseConfig, NativeRecord};
use fusebridge::{
    Attrs, FaultPolicy, FileRef, FuseError, FuseResult, MountError, OpSet, Operations, PrivateData, session,
};
use fusebridge_memfs::MemFs;

use common::{GID, PID, UID, exits, mount_config, run, session};

#[test]
fn test_startup_arguments() {
    let config = mount_config()
        .debug(true)
        .nothreads(true)
        .option("allow_other", true)
        .option("ro", false);
    let outcome = session(MemFs::new(), &config, |_| 0);
    outcome.result.unwrap();
    assert_eq!(
        outcome.args,
        vec!["fusebridge", "-f", "-d", "-s", "-o", "fsname=MemFs,allow_other", "/mnt/test"]
    );
}

#[test]
fn test_invalid_config_never_reaches_native_layer() {
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    let config = mount_config().option("fsname", "mem,allow_other");
    let outcome = session(MemFs::new(), &config, move |_| {
        flag.store(true, Ordering::SeqCst);
        0
    });
    assert!(matches!(outcome.result, Err(MountError::InvalidArgument(_))));
    assert!(outcome.args.is_empty());
    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn test_table_matches_supported_set() {
    let expected = MemFs::new().supported().op_names();
    run(MemFs::new(), &mount_config(), move |s| {
        let populated: Vec<String> = s.table.populated().iter().map(|n| n.to_string()).collect();
        assert_eq!(populated, expected);
        assert!(s.table.flush.is_none());
        assert!(s.table.init.is_none());
        0
    })
    .unwrap();
}

struct GetattrOnly;

impl Operations for GetattrOnly {
    fn supported(&self) -> OpSet {
        OpSet::GETATTR
    }

    fn getattr(&self, _path: Option<&str>, _fh: Option<FileRef<'_>>) -> FuseResult<Attrs> {
        Ok(Attrs::new().mode(0o40755))
    }

    // Implemented but not listed: must not be reachable.
    fn readlink(&self, _path: &str) -> FuseResult<String> {
        Ok("unreachable".into())
    }
}

#[test]
fn test_unsupported_operations_have_empty_slots() {
    run(GetattrOnly, &mount_config(), |s| {
        assert_eq!(s.table.populated(), vec!["getattr"]);
        assert!(s.table.readlink.is_none());
        assert!(s.table.read.is_none());
        assert_eq!(s.getattr("/").0, 0);
        0
    })
    .unwrap();
}

/// Records lifecycle events and exposes private data through getattr.
struct Lifecycle {
    destroyed: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
    fail_init: bool,
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

impl Operations for Lifecycle {
    fn supported(&self) -> OpSet {
        OpSet::INIT | OpSet::DESTROY | OpSet::GETATTR
    }

    fn init(&self, conn: &mut ConnInfo, config: &mut FuseConfig) -> FuseResult<Option<PrivateData>> {
        if self.fail_init {
            return Err(FuseError::errno(libc::EIO));
        }
        conn.max_readahead = 0;
        config.attr_timeout = 5.0;
        Ok(Some(Arc::new(String::from("session state"))))
    }

    fn destroy(&self) -> FuseResult<()> {
        self.destroyed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn getattr(&self, _path: Option<&str>, _fh: Option<FileRef<'_>>) -> FuseResult<Attrs> {
        let ctx = session::context().ok_or_else(|| FuseError::other("no context"))?;
        let size = session::private_data()
            .and_then(|data| data.downcast_ref::<String>().map(String::len))
            .unwrap_or(0);
        Ok(Attrs::new()
            .mode(0o100644)
            .owner(ctx.uid, ctx.gid)
            .with("st_size", size as u64)
            .with("st_nlink", ctx.pid as i64))
    }
}

#[test]
fn test_init_value_is_private_data() {
    let destroyed = Arc::new(AtomicBool::new(false));
    let dropped = Arc::new(AtomicBool::new(false));
    let ops = Lifecycle {
        destroyed: destroyed.clone(),
        dropped: dropped.clone(),
        fail_init: false,
    };
    run(ops, &mount_config(), |s| {
        let (status, st) = s.getattr("/f");
        assert_eq!(status, 0);
        assert_eq!(st.get_field("st_size"), Some("session state".len() as i64));
        assert_eq!(st.get_field("st_uid"), Some(UID as i64));
        assert_eq!(st.get_field("st_gid"), Some(GID as i64));
        assert_eq!(st.get_field("st_nlink"), Some(PID as i64));
        0
    })
    .unwrap();
    assert!(destroyed.load(Ordering::SeqCst));
    assert!(dropped.load(Ordering::SeqCst));
    assert!(session::private_data().is_none());
}

#[test]
fn test_init_failure_is_not_fatal() {
    let ops = Lifecycle {
        destroyed: Arc::new(AtomicBool::new(false)),
        dropped: Arc::new(AtomicBool::new(false)),
        fail_init: true,
    };
    let outcome = session(ops, &mount_config(), |s| {
        let (status, st) = s.getattr("/f");
        assert_eq!(status, 0);
        assert_eq!(st.get_field("st_size"), Some(0));
        0
    });
    outcome.result.unwrap();
    assert_eq!(outcome.exits, 0);
}

struct Faulty {
    calls: Arc<AtomicUsize>,
    panic_in_init: bool,
}

impl Operations for Faulty {
    fn supported(&self) -> OpSet {
        OpSet::INIT | OpSet::GETATTR | OpSet::UNLINK
    }

    fn init(&self, _conn: &mut ConnInfo, _config: &mut FuseConfig) -> FuseResult<Option<PrivateData>> {
        if self.panic_in_init {
            panic!("init exploded");
        }
        Ok(None)
    }

    fn getattr(&self, _path: Option<&str>, _fh: Option<FileRef<'_>>) -> FuseResult<Attrs> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("getattr exploded");
    }

    fn unlink(&self, _path: &str) -> FuseResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_panic_terminates_session_and_is_reported() {
    let calls = Arc::new(AtomicUsize::new(0));
    let ops = Faulty {
        calls: calls.clone(),
        panic_in_init: false,
    };
    let outcome = session(ops, &mount_config(), |s| {
        assert_eq!(s.getattr("/").0, -libc::EFAULT);
        assert_eq!(exits(), 1);
        // Requests still in flight after the fault never reach the set.
        assert_eq!(s.unlink("/x"), -libc::EFAULT);
        assert_eq!(s.getattr("/").0, -libc::EFAULT);
        0
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.exits, 1);
    match outcome.result.unwrap_err() {
        MountError::Fault { op, message } => {
            assert_eq!(op, "getattr");
            assert_eq!(message, "getattr exploded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fault_wins_over_native_status() {
    let ops = Faulty {
        calls: Arc::new(AtomicUsize::new(0)),
        panic_in_init: false,
    };
    let err = run(ops, &mount_config(), |s| {
        s.getattr("/");
        7
    })
    .unwrap_err();
    assert!(matches!(err, MountError::Fault { op: "getattr", .. }));
}

#[test]
fn test_fail_request_policy_keeps_serving() {
    let calls = Arc::new(AtomicUsize::new(0));
    let ops = Faulty {
        calls: calls.clone(),
        panic_in_init: false,
    };
    let config = mount_config().fault_policy(FaultPolicy::FailRequest);
    let outcome = session(ops, &config, |s| {
        assert_eq!(s.getattr("/").0, -libc::EIO);
        assert_eq!(s.unlink("/x"), 0);
        assert_eq!(s.getattr("/").0, -libc::EIO);
        0
    });
    outcome.result.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(outcome.exits, 0);
}

#[test]
fn test_panic_in_init_terminates() {
    let ops = Faulty {
        calls: Arc::new(AtomicUsize::new(0)),
        panic_in_init: true,
    };
    let outcome = session(ops, &mount_config(), |s| {
        assert_eq!(s.unlink("/x"), -libc::EFAULT);
        0
    });
    assert!(matches!(outcome.result, Err(MountError::Fault { op: "init", .. })));
    assert_eq!(outcome.exits, 1);
}

#[test]
fn test_nonzero_native_status() {
    let err = run(MemFs::new(), &mount_config(), |_| 1).unwrap_err();
    assert!(matches!(err, MountError::Status(1)));
}

struct Errors;

impl Operations for Errors {
    fn supported(&self) -> OpSet {
        OpSet::MKDIR | OpSet::UNLINK | OpSet::RMDIR | OpSet::READLINK
    }

    fn mkdir(&self, _path: &str, _mode: u32) -> FuseResult<()> {
        Err(FuseError::errno(libc::EACCES))
    }

    fn unlink(&self, _path: &str) -> FuseResult<()> {
        Err(FuseError::errno(0))
    }

    fn rmdir(&self, _path: &str) -> FuseResult<()> {
        Err(FuseError::other("disk on fire"))
    }

    fn readlink(&self, _path: &str) -> FuseResult<String> {
        Err(std::io::Error::from_raw_os_error(libc::ENOENT).into())
    }
}

#[test]
fn test_errors_translate_to_negative_errno() {
    let outcome = session(Errors, &mount_config(), |s| {
        assert_eq!(s.mkdir("/d", 0o755), -libc::EACCES);
        assert_eq!(s.unlink("/f"), -libc::EINVAL);
        assert_eq!(s.rmdir("/d"), -libc::EINVAL);
        assert_eq!(s.readlink("/l", 16).0, -libc::ENOENT);
        0
    });
    outcome.result.unwrap();
    assert_eq!(outcome.exits, 0);
}

#[test]
fn test_accessors_outside_a_request() {
    // Install the fake handle with a trivial session first.
    run(MemFs::new(), &mount_config(), |_| 0).unwrap();
    assert!(session::context().is_none());
    assert!(session::private_data().is_none());
    session::exit();
}
