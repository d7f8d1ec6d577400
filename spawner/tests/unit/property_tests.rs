//! Property-based tests for the port pool and workload naming.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use sandbox_spawner::application::AccountStore;
use sandbox_spawner::domain::workload_names;
use sandbox_spawner::infra::store::FileAccountStore;
use tempfile::TempDir;

use crate::store_tests::record;

#[derive(Debug, Clone)]
enum Op {
    /// Allocate a port and record it for the identity, unless it already exists.
    Create(u8),
    Remove(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![(0u8..6).prop_map(Op::Create), (0u8..6).prop_map(Op::Remove)]
}

fn is_dns_label(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name.starts_with(|c: char| c.is_ascii_lowercase())
        && !name.ends_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

proptest! {
    #[test]
    fn used_ports_track_live_records(ops in prop::collection::vec(op(), 1..40)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("data");
        let store = FileAccountStore::open(&path);
        let mut model: BTreeMap<String, u16> = BTreeMap::new();

        rt.block_on(async {
            for op in ops {
                match op {
                    Op::Create(n) => {
                        let identity = format!("user{n}");
                        if store.find(&identity).await.expect("find").is_none() {
                            let port = store.allocate_port().await.expect("port");
                            store
                                .record(&identity, record(&identity, port))
                                .await
                                .expect("record");
                            model.insert(identity, port);
                        }
                    }
                    Op::Remove(n) => {
                        let identity = format!("user{n}");
                        store.remove(&identity).await.expect("remove");
                        model.remove(&identity);
                    }
                }
            }
        });

        let live: BTreeSet<u16> = model.values().copied().collect();
        prop_assert_eq!(live.len(), model.len(), "ports must be unique");
        prop_assert_eq!(store.used_ports(), live);

        let reloaded = FileAccountStore::open(&path);
        prop_assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[test]
    fn derived_names_are_dns_labels(identity in "\\PC{0,80}") {
        let names = workload_names(&identity);
        prop_assert!(is_dns_label(&names.workload), "{}", names.workload);
        prop_assert!(is_dns_label(&names.service), "{}", names.service);
        prop_assert!(is_dns_label(&names.secret), "{}", names.secret);
    }

    #[test]
    fn distinct_identities_get_distinct_workloads(
        a in "[a-zA-Z@._-]{1,20}",
        b in "[a-zA-Z@._-]{1,20}",
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(workload_names(&a).workload, workload_names(&b).workload);
    }
}
