//! End-to-end provisioning scenarios against a real (temporary) filesystem.

use std::os::unix::fs as unix_fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use homestead::adapters::PrivilegeBroker;
use homestead::api::{ApiError, Homestead};
use homestead::logging::{AuditSink, FactsEmitter};
use homestead::policy::Policy;
use rustix::fs::Mode;
use rustix::process::{getgid, getuid, umask};
use serial_test::serial;

/// Captures facts and leveled diagnostics for assertions.
#[derive(Default, Clone)]
struct Collector(Arc<CollectorInner>);

#[derive(Default)]
struct CollectorInner {
    facts: Mutex<Vec<(String, String, serde_json::Value)>>,
    logs: Mutex<Vec<(log::Level, String)>>,
}

impl Collector {
    fn facts_for(&self, event: &str) -> Vec<(String, serde_json::Value)> {
        self.0
            .facts
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _, _)| e == event)
            .map(|(_, d, f)| (d.clone(), f.clone()))
            .collect()
    }

    fn warnings(&self) -> Vec<String> {
        self.0
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == log::Level::Warn)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl FactsEmitter for Collector {
    fn emit(&self, _subsystem: &str, event: &str, decision: &str, fields: serde_json::Value) {
        self.0
            .facts
            .lock()
            .unwrap()
            .push((event.to_string(), decision.to_string(), fields));
    }
}

impl AuditSink for Collector {
    fn log(&self, level: log::Level, msg: &str) {
        self.0.logs.lock().unwrap().push((level, msg.to_string()));
    }
}

/// Counts elevate/relinquish pairs.
#[derive(Default, Clone)]
struct Broker(Arc<BrokerInner>);

#[derive(Default)]
struct BrokerInner {
    elevated: AtomicU32,
    released: AtomicU32,
}

impl PrivilegeBroker for Broker {
    fn elevate(&self) {
        self.0.elevated.fetch_add(1, Ordering::SeqCst);
    }
    fn relinquish(&self) {
        self.0.released.fetch_add(1, Ordering::SeqCst);
    }
}

fn uid() -> u32 {
    getuid().as_raw()
}

fn gid() -> u32 {
    getgid().as_raw()
}

fn provisioner(policy: Policy) -> (Homestead<Collector, Collector>, Collector, Broker) {
    let collector = Collector::default();
    let broker = Broker::default();
    let api = Homestead::new(collector.clone(), collector.clone(), policy)
        .with_privilege_broker(Box::new(broker.clone()));
    (api, collector, broker)
}

fn mode_of(path: &Path) -> u32 {
    std::fs::symlink_metadata(path).unwrap().mode() & 0o7777
}

#[test]
#[serial]
fn disabled_policy_is_a_silent_noop() {
    let td = tempfile::tempdir().unwrap();
    let home = td.path().join("alice");
    let (api, collector, broker) = provisioner(Policy::default());

    let report = api.provision_home(&home, "alice", uid(), gid()).unwrap();

    assert!(!report.enabled);
    assert!(!home.exists());
    assert_eq!(broker.0.elevated.load(Ordering::SeqCst), 0);
    assert!(collector.0.facts.lock().unwrap().is_empty());
}

#[test]
#[serial]
fn provisions_leaf_with_configured_identity_and_mode() {
    let td = tempfile::tempdir().unwrap();
    let home = td.path().join("alice");
    let mut policy = Policy::enabled_preset();
    policy.leaf_mode = 0o750;
    let (api, collector, broker) = provisioner(policy);

    let report = api.provision_home(&home, "alice", uid(), gid()).unwrap();

    assert!(report.enabled);
    assert_eq!(report.path.created, vec![home.clone()]);
    let md = std::fs::metadata(&home).unwrap();
    assert_eq!(md.mode() & 0o7777, 0o750);
    assert_eq!((md.uid(), md.gid()), (uid(), gid()));

    // One privilege bracket, fully released.
    assert_eq!(broker.0.elevated.load(Ordering::SeqCst), 1);
    assert_eq!(broker.0.released.load(Ordering::SeqCst), 1);

    let results = collector.facts_for("provision.result");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "success");
    assert_eq!(results[0].1["user"], "alice");
}

#[test]
#[serial]
fn provisioning_twice_is_idempotent() {
    let td = tempfile::tempdir().unwrap();
    let home = td.path().join("alice");
    let (api, _collector, _broker) = provisioner(Policy::enabled_preset());

    let first = api.provision_home(&home, "alice", uid(), gid()).unwrap();
    let md_first = std::fs::metadata(&home).unwrap();

    let second = api.provision_home(&home, "alice", uid(), gid()).unwrap();
    let md_second = std::fs::metadata(&home).unwrap();

    assert_eq!(first.path.created.len(), 1);
    assert!(second.path.already_present);
    assert!(second.path.created.is_empty());
    assert_eq!(md_first.mode(), md_second.mode());
    assert_eq!(md_first.uid(), md_second.uid());
    assert_eq!(md_first.gid(), md_second.gid());
}

#[test]
#[serial]
fn preexisting_intermediate_is_never_altered() {
    let td = tempfile::tempdir().unwrap();
    let homes = td.path().join("homes");
    std::fs::create_dir(&homes).unwrap();
    let orig = std::fs::metadata(&homes).unwrap();
    // A mode the provisioner would never choose by itself.
    rustix::fs::chmod(&homes, Mode::from_bits_truncate(0o777)).unwrap();

    let (api, _collector, _broker) = provisioner(Policy::enabled_preset());
    api.provision_home(&homes.join("alice"), "alice", uid(), gid())
        .unwrap();

    let md = std::fs::metadata(&homes).unwrap();
    assert_eq!(md.mode() & 0o7777, 0o777);
    assert_eq!(md.uid(), orig.uid());
    assert_eq!(md.gid(), orig.gid());
    assert!(homes.join("alice").is_dir());
}

#[test]
#[serial]
fn skeleton_population_rewrites_links_and_strips_setid() {
    let td = tempfile::tempdir().unwrap();
    let skel = td.path().join("skel");
    let home = td.path().join("alice");
    std::fs::create_dir_all(skel.join("sub")).unwrap();
    std::fs::write(skel.join("sub/rc"), b"export EDITOR=vi\n").unwrap();
    std::fs::write(skel.join("tool"), b"#!/bin/sh\n").unwrap();
    rustix::fs::chmod(&skel.join("tool"), Mode::from_bits_truncate(0o6755)).unwrap();
    unix_fs::symlink(skel.join("sub/rc"), skel.join("rc_link")).unwrap();
    unix_fs::symlink("/etc/hostname", skel.join("host_link")).unwrap();

    let mut policy = Policy::enabled_preset();
    policy.skel_dir = Some(skel.clone());
    let (api, collector, _broker) = provisioner(policy);

    let report = api.provision_home(&home, "alice", uid(), gid()).unwrap();
    let sr = report.skel.expect("skeleton copy ran");
    assert_eq!(sr.failed, 0, "{:?}", sr.errors);
    assert_eq!(sr.skipped, 0);

    // Structure mirrored, file content intact.
    assert_eq!(
        std::fs::read(home.join("sub/rc")).unwrap(),
        b"export EDITOR=vi\n"
    );
    // setuid/setgid stripped, remaining bits kept.
    assert_eq!(mode_of(&home.join("tool")), 0o755);
    // Intra-skeleton link re-pointed into the new home.
    assert_eq!(
        std::fs::read_link(home.join("rc_link")).unwrap(),
        home.join("sub/rc")
    );
    // External link copied verbatim.
    assert_eq!(
        std::fs::read_link(home.join("host_link")).unwrap(),
        Path::new("/etc/hostname")
    );

    let skel_facts = collector.facts_for("skel");
    assert_eq!(skel_facts.len(), 1);
    assert_eq!(skel_facts[0].0, "success");
}

#[test]
#[serial]
fn one_bad_skeleton_entry_does_not_stop_the_copy() {
    let td = tempfile::tempdir().unwrap();
    let skel = td.path().join("skel");
    let home = td.path().join("alice");
    std::fs::create_dir(&skel).unwrap();
    std::fs::write(skel.join("good"), b"ok").unwrap();
    std::fs::write(skel.join("taken"), b"skel version").unwrap();
    // Pre-create the home with a conflicting entry: exclusive create must
    // fail that entry alone.
    std::fs::create_dir(&home).unwrap();
    std::fs::write(home.join("taken"), b"kept").unwrap();

    let mut policy = Policy::enabled_preset();
    policy.skel_dir = Some(skel.clone());
    let (api, collector, _broker) = provisioner(policy);

    let report = api.provision_home(&home, "alice", uid(), gid()).unwrap();
    let sr = report.skel.expect("skeleton copy ran");
    assert_eq!(sr.copied, 1);
    assert_eq!(sr.failed, 1);
    assert_eq!(std::fs::read(home.join("good")).unwrap(), b"ok");
    assert_eq!(std::fs::read(home.join("taken")).unwrap(), b"kept");

    // Degraded copy is a warn-level fact, still an overall success.
    let skel_facts = collector.facts_for("skel");
    assert_eq!(skel_facts[0].0, "warn");
    let results = collector.facts_for("provision.result");
    assert_eq!(results[0].0, "success");
}

#[test]
#[serial]
fn fatal_path_failure_reports_and_releases_privileges() {
    let td = tempfile::tempdir().unwrap();
    // A regular file where a directory is needed poisons the chain.
    std::fs::write(td.path().join("block"), b"x").unwrap();
    let home = td.path().join("block/alice");
    let (api, collector, broker) = provisioner(Policy::enabled_preset());

    let err = api
        .provision_home(&home, "alice", uid(), gid())
        .unwrap_err();
    let ApiError::PathCreation(msg) = err;
    assert!(msg.contains("block"), "{msg}");

    // The bracket was entered once and fully released despite the failure.
    assert_eq!(broker.0.elevated.load(Ordering::SeqCst), 1);
    assert_eq!(broker.0.released.load(Ordering::SeqCst), 1);

    assert!(!collector.warnings().is_empty());
    let results = collector.facts_for("provision.result");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "failure");
}

#[test]
#[serial]
fn umask_is_restored_and_modes_are_exact() {
    let td = tempfile::tempdir().unwrap();
    let home = td.path().join("alice");
    let mut policy = Policy::enabled_preset();
    policy.leaf_mode = 0o755;
    let (api, _collector, _broker) = provisioner(policy);

    let prev = umask(Mode::from_bits_truncate(0o077));
    api.provision_home(&home, "alice", uid(), gid()).unwrap();
    let after = umask(prev);

    // A restrictive ambient mask neither leaks into the created mode nor
    // survives past the call.
    assert_eq!(after, Mode::from_bits_truncate(0o077));
    assert_eq!(mode_of(&home), 0o755);
}

#[test]
#[serial]
fn full_chain_ownership_when_run_as_root() {
    if uid() != 0 {
        return;
    }
    let td = tempfile::tempdir().unwrap();
    let home = td.path().join("home/alice");
    let mut policy = Policy::enabled_preset();
    policy.dir_mode = 0o711;
    policy.leaf_mode = 0o755;
    let (api, _collector, _broker) = provisioner(policy);

    api.provision_home(&home, "alice", 1001, 1001).unwrap();

    let mid = std::fs::metadata(td.path().join("home")).unwrap();
    assert_eq!(mid.mode() & 0o7777, 0o711);
    assert_eq!((mid.uid(), mid.gid()), (0, 0));

    let leaf = std::fs::metadata(&home).unwrap();
    assert_eq!(leaf.mode() & 0o7777, 0o755);
    assert_eq!((leaf.uid(), leaf.gid()), (1001, 1001));
}
