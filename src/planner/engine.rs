//! Decomposition of a raw dataset into a chain of reduction units.

use crate::store::types::{JobRecord, Matrix, OperandSlot, RawDataset, Side, UnitStatus, WorkUnit};

use std::collections::VecDeque;

/// Builds a job from a raw dataset.
///
/// An n-ary pairwise reduction of `n` matrices needs `n - 1` combination
/// steps, so the job gets `n - 1` empty units. The dataset's matrices are
/// then written into operand slots in fill order (unit 0 slot A, unit 0
/// slot B, unit 1 slot A, ...), which makes units ready in position order
/// as long as operands arrive purely from the initial dataset. The job id
/// stays empty until registration assigns one.
pub fn plan_job(raw: RawDataset, now: u64) -> JobRecord {
    let unit_count = raw.matrixes.len().saturating_sub(1);

    let mut units = Vec::with_capacity(unit_count);
    let mut open_slots = VecDeque::with_capacity(unit_count * 2);
    for position in 0..unit_count {
        units.push(WorkUnit {
            owner_job_id: String::new(),
            position_index: position,
            status: UnitStatus::Unassigned,
            operand_a: None,
            operand_b: None,
        });
        open_slots.push_back(OperandSlot {
            unit: position,
            side: Side::A,
        });
        open_slots.push_back(OperandSlot {
            unit: position,
            side: Side::B,
        });
    }

    let mut job = JobRecord {
        job_id: String::new(),
        core_id: raw.coreid,
        units,
        unit_count,
        completed_count: 0,
        creation_time: now,
        completion_time: None,
        final_result: None,
        open_slots,
    };

    for matrix in raw.matrixes {
        assign_operand(&mut job, matrix);
    }

    job
}

/// Writes a matrix into the job's next empty operand slot.
///
/// Slots are consumed strictly front-first, which is exactly the order a
/// position-ordered scan for "first empty slot" would produce. Both the
/// initial dataset fill and the fan-in of unit results go through here, so
/// every slot is written at most once. Returns the slot that was filled, or
/// `None` when the chain has no empty slot left.
pub fn assign_operand(job: &mut JobRecord, matrix: Matrix) -> Option<OperandSlot> {
    let slot = job.open_slots.pop_front()?;

    let unit = job.units.get_mut(slot.unit)?;
    match slot.side {
        Side::A => unit.operand_a = Some(matrix),
        Side::B => unit.operand_b = Some(matrix),
    }

    Some(slot)
}
