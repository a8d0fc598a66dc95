//! Planner Module Tests
//!
//! Covers dataset decomposition (unit counts, exhaustive operand
//! assignment, fill order), the slot queue, and job registration with a
//! stubbed grid server.

#[cfg(test)]
mod tests {
    use crate::planner::coordinator::{register_job, JobRegistrar};
    use crate::planner::engine::{assign_operand, plan_job};
    use crate::store::types::{JobRecord, Matrix, OperandSlot, RawDataset, Side};

    use anyhow::Result;

    fn matrix(value: f64) -> Matrix {
        vec![vec![value]]
    }

    fn dataset(count: usize) -> RawDataset {
        RawDataset {
            coreid: "core-1".to_string(),
            matrixes: (0..count).map(|i| matrix(i as f64)).collect(),
        }
    }

    struct StubRegistrar {
        fail: bool,
    }

    impl JobRegistrar for StubRegistrar {
        async fn register(&self, _job: &JobRecord, _project_id: &str) -> Result<String> {
            if self.fail {
                Err(anyhow::anyhow!("grid server unreachable"))
            } else {
                Ok("grid-42".to_string())
            }
        }
    }

    // ============================================================
    // TEST 1: Unit count
    // ============================================================

    #[test]
    fn test_plan_job_unit_count() {
        // n matrices reduce in n - 1 pairwise steps
        for n in 2..=6 {
            let job = plan_job(dataset(n), 0);
            assert_eq!(job.unit_count, n - 1);
            assert_eq!(job.units.len(), n - 1);
            assert_eq!(job.completed_count, 0);
        }

        let positions: Vec<usize> = plan_job(dataset(5), 0)
            .units
            .iter()
            .map(|unit| unit.position_index)
            .collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    // ============================================================
    // TEST 2: Every matrix lands in exactly one slot
    // ============================================================

    #[test]
    fn test_plan_job_assigns_every_matrix_once() {
        let n = 7;
        let job = plan_job(dataset(n), 0);

        let mut seen: Vec<f64> = job
            .units
            .iter()
            .flat_map(|unit| [unit.operand_a.as_ref(), unit.operand_b.as_ref()])
            .flatten()
            .map(|m| m[0][0])
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let expected: Vec<f64> = (0..n).map(|i| i as f64).collect();
        assert_eq!(seen, expected);
    }

    // ============================================================
    // TEST 3: Fill order
    // ============================================================

    #[test]
    fn test_plan_job_fill_order() {
        // [A, B, C] -> unit0 holds (A, B) and is ready, unit1 holds (C, _)
        let job = plan_job(dataset(3), 0);

        assert_eq!(job.units[0].operand_a, Some(matrix(0.0)));
        assert_eq!(job.units[0].operand_b, Some(matrix(1.0)));
        assert!(job.units[0].is_ready());

        assert_eq!(job.units[1].operand_a, Some(matrix(2.0)));
        assert_eq!(job.units[1].operand_b, None);
        assert!(!job.units[1].is_ready());
    }

    // ============================================================
    // TEST 4: Slot queue bookkeeping
    // ============================================================

    #[test]
    fn test_open_slots_consumed_front_first() {
        let mut job = plan_job(dataset(3), 0);

        // 2 units seed 4 slots; the 3 dataset matrices consumed 3 of them
        assert_eq!(
            job.open_slots.front(),
            Some(&OperandSlot {
                unit: 1,
                side: Side::B
            })
        );

        let slot = assign_operand(&mut job, matrix(9.0)).unwrap();
        assert_eq!(slot.unit, 1);
        assert_eq!(slot.side, Side::B);
        assert_eq!(job.units[1].operand_b, Some(matrix(9.0)));

        // chain is saturated now
        assert!(job.open_slots.is_empty());
        assert!(assign_operand(&mut job, matrix(10.0)).is_none());
    }

    // ============================================================
    // TEST 5: Registration adopts the coordinator id
    // ============================================================

    #[tokio::test]
    async fn test_register_job_adopts_coordinator_id() {
        let job = plan_job(dataset(4), 0);

        let job = register_job(job, "project-1", &StubRegistrar { fail: false }).await;

        assert_eq!(job.job_id, "grid-42");
        assert!(job.units.iter().all(|unit| unit.owner_job_id == "grid-42"));
    }

    // ============================================================
    // TEST 6: Registration failure falls back to a local id
    // ============================================================

    #[tokio::test]
    async fn test_register_job_failure_mints_local_id() {
        let job = plan_job(dataset(4), 0);

        let job = register_job(job, "project-1", &StubRegistrar { fail: true }).await;

        assert!(job.job_id.starts_with("local-"));
        assert!(job
            .units
            .iter()
            .all(|unit| unit.owner_job_id == job.job_id));
    }
}
