//! Jump resolution.
//!
//! Lowering leaves every control transfer pointing at a [`SentinelId`].
//! [`resolve`] makes one pass to find where each sentinel landed and a
//! second to rewrite every pending target as a relative offset
//! `destination - source`.

use std::collections::HashMap;

use basalt_foundation::{Error, Result};
use tracing::trace;

use crate::operation::{JumpTarget, Operation, SentinelId};

/// Replaces every pending jump target with its relative offset.
///
/// # Errors
///
/// Fails when a target names a sentinel that was never emitted, when a
/// sentinel is emitted twice, or when an offset does not fit the operand.
pub fn resolve(mut operations: Vec<Operation>) -> Result<Vec<Operation>> {
    let positions = sentinel_positions(&operations)?;

    let mut patched = 0usize;
    for (index, operation) in operations.iter_mut().enumerate() {
        let retarget = |target: &mut JumpTarget| -> Result<()> {
            if let JumpTarget::Pending(sentinel) = *target {
                let destination = positions
                    .get(&sentinel)
                    .copied()
                    .ok_or_else(|| Error::missing_sentinel(sentinel.0))?;
                *target = JumpTarget::Offset(offset(index, destination)?);
            }
            Ok(())
        };
        match operation {
            Operation::Jump(_, target) | Operation::EndTry(target) => {
                retarget(target)?;
                patched += 1;
            }
            Operation::Try { catch, finally } => {
                for target in catch.iter_mut().chain(finally.iter_mut()) {
                    retarget(target)?;
                    patched += 1;
                }
            }
            _ => {}
        }
    }

    trace!(sentinels = positions.len(), patched, "resolved jumps");
    Ok(operations)
}

/// Returns true if no operation still carries a pending target.
#[must_use]
pub fn is_resolved(operations: &[Operation]) -> bool {
    operations.iter().all(|op| {
        op.targets()
            .iter()
            .all(|target| matches!(target, JumpTarget::Offset(_)))
    })
}

fn sentinel_positions(operations: &[Operation]) -> Result<HashMap<SentinelId, usize>> {
    let mut positions = HashMap::new();
    for (index, operation) in operations.iter().enumerate() {
        if let Operation::Sentinel(id) = operation {
            if positions.insert(*id, index).is_some() {
                return Err(Error::internal(format!("sentinel {} emitted twice", id.0)));
            }
        }
    }
    Ok(positions)
}

fn offset(source: usize, destination: usize) -> Result<i32> {
    let wide = i64::try_from(destination).unwrap_or(i64::MAX)
        - i64::try_from(source).unwrap_or(i64::MAX);
    i32::try_from(wide).map_err(|_| Error::jump_out_of_range(wide))
}
