//! Store Module Tests
//!
//! Covers the snapshot lifecycle (create-if-missing, round-trip through
//! disk), table bookkeeping, and the persisted wire format.

#[cfg(test)]
mod tests {
    use crate::planner::engine::plan_job;
    use crate::store::memory::GridStore;
    use crate::store::types::{Matrix, RawDataset, UnitStatus};

    fn matrix(value: f64) -> Matrix {
        vec![vec![value]]
    }

    fn dataset(values: &[f64]) -> RawDataset {
        RawDataset {
            coreid: "core-1".to_string(),
            matrixes: values.iter().copied().map(matrix).collect(),
        }
    }

    // ============================================================
    // TEST 1: Snapshot creation
    // ============================================================

    #[tokio::test]
    async fn test_snapshot_created_when_missing() {
        // ARRANGE: a path whose parent directory does not exist yet
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("database.json");

        // ACT
        let store = GridStore::load_or_create(&path).unwrap();

        // ASSERT: an empty snapshot was written with the expected keys
        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["projectId"], "");
        assert_eq!(json["coreId"], "");
        assert_eq!(json["completedJobsCount"], 0);
        assert_eq!(store.queued_units().await, 0);
    }

    // ============================================================
    // TEST 2: Snapshot round-trip
    // ============================================================

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");

        // ARRANGE: a store with identity and one planned job
        let store = GridStore::load_or_create(&path).unwrap();
        store.set_project_id("project-7".to_string()).await;
        store.set_core_id("core-7".to_string()).await;

        let mut job = plan_job(dataset(&[1.0, 2.0, 3.0]), 1_000);
        job.adopt_id("job-7".to_string());
        store.insert_job(job).await;

        // ACT: flush and reload from disk
        store.flush().await.unwrap();
        let reloaded = GridStore::load_or_create(&path).unwrap();

        // ASSERT: everything survived the round-trip
        assert_eq!(reloaded.project_id().await, "project-7");
        assert_eq!(reloaded.core_id().await, "core-7");
        assert_eq!(reloaded.queued_units().await, 2);
        reloaded
            .read_state(|state| {
                let job = &state.jobs["job-7"];
                assert_eq!(job.unit_count, 2);
                assert_eq!(job.units[0].operand_a, Some(matrix(1.0)));
                assert_eq!(job.units[0].operand_b, Some(matrix(2.0)));
                assert_eq!(job.units[1].operand_a, Some(matrix(3.0)));
                assert_eq!(job.open_slots.len(), 1);
            })
            .await;
    }

    // ============================================================
    // TEST 3: Insert replaces by job id
    // ============================================================

    #[tokio::test]
    async fn test_insert_job_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = GridStore::load_or_create(dir.path().join("db.json")).unwrap();

        let mut first = plan_job(dataset(&[1.0, 2.0, 3.0]), 0);
        first.adopt_id("job-1".to_string());
        store.insert_job(first).await;

        let mut second = plan_job(dataset(&[1.0, 2.0, 3.0, 4.0]), 0);
        second.adopt_id("job-1".to_string());
        store.insert_job(second).await;

        store
            .read_state(|state| {
                assert_eq!(state.jobs.len(), 1);
                assert_eq!(state.jobs["job-1"].unit_count, 3);
            })
            .await;
    }

    // ============================================================
    // TEST 4: Queue depth accounting
    // ============================================================

    #[tokio::test]
    async fn test_queued_units_sums_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let store = GridStore::load_or_create(dir.path().join("db.json")).unwrap();

        let mut a = plan_job(dataset(&[1.0, 2.0, 3.0]), 0);
        a.adopt_id("job-a".to_string());
        a.completed_count = 1;
        let mut b = plan_job(dataset(&[1.0, 2.0, 3.0, 4.0]), 0);
        b.adopt_id("job-b".to_string());

        store.insert_job(a).await;
        store.insert_job(b).await;

        // job-a has 1 of 2 left, job-b all 3
        assert_eq!(store.queued_units().await, 4);
    }

    // ============================================================
    // TEST 5: Lease state wire format
    // ============================================================

    #[test]
    fn test_unit_status_serialization() {
        let status = UnitStatus::Leased {
            token: "worker-9".to_string(),
            leased_at: 42,
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "leased");
        assert_eq!(json["token"], "worker-9");

        let restored: UnitStatus = serde_json::from_value(json).unwrap();
        assert_eq!(restored, status);
    }
}
