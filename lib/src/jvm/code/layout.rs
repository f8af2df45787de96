use super::opcodes::*;
use super::{Instruction, Operand};
use crate::jvm::Error;
use std::collections::BTreeMap;

/// Where each instruction boundary of the original code ended up after [`assemble`]
///
/// Holds every original instruction start, plus the original code length (mapped to the new code
/// length) so that exclusive range ends also resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetMap(BTreeMap<u32, u32>);

impl OffsetMap {
    pub fn get(&self, old: u32) -> Result<u32, Error> {
        self.0.get(&old).copied().ok_or_else(|| {
            Error::MalformedClass(format!("offset {} is not an instruction boundary", old))
        })
    }

    /// Same as [`OffsetMap::get`], for the `u16` offsets stored in attributes
    pub fn get_u16(&self, old: u16) -> Result<u16, Error> {
        let new = self.get(old as u32)?;
        u16::try_from(new).map_err(|_| Error::MethodCodeOverflow(new as usize))
    }

    /// Whether no instruction moved
    pub fn is_identity(&self) -> bool {
        self.0.iter().all(|(old, new)| old == new)
    }
}

/// Encode instructions (decoded from a code array of length `code_length`) into a new code array
///
/// An `ldc` whose constant index no longer fits in a byte becomes `ldc_w`. Offsets are then
/// recomputed until stable: a `goto`/`jsr` whose displacement leaves the signed 16-bit range is
/// promoted to `goto_w`/`jsr_w`, which may grow the code and push other jumps out of range. The
/// process terminates because promotions never revert. Conditional jumps have no wide form, so an
/// out of range conditional jump is an error.
pub fn assemble(
    instructions: &mut [Instruction],
    code_length: u32,
) -> Result<(Vec<u8>, OffsetMap), Error> {
    for instruction in instructions.iter_mut() {
        if let (LDC, Operand::Constant(index)) = (instruction.opcode, &instruction.operand) {
            if index.0 > u8::MAX as u16 {
                instruction.opcode = LDC_W;
            }
        }
    }

    // Original offset to instruction index (the end of the code being one past the last)
    let mut old_index: BTreeMap<u32, usize> = BTreeMap::new();
    for (idx, instruction) in instructions.iter().enumerate() {
        old_index.insert(instruction.offset, idx);
    }
    old_index.insert(code_length, instructions.len());

    let target_index = |instruction: &Instruction, rel: i32| -> Result<usize, Error> {
        let target = instruction.offset as i64 + rel as i64;
        u32::try_from(target)
            .ok()
            .and_then(|target| old_index.get(&target).copied())
            .ok_or_else(|| {
                Error::MalformedClass(format!(
                    "jump at {} to {} does not land on an instruction",
                    instruction.offset, target
                ))
            })
    };

    let mut new_offsets = layout_offsets(instructions);
    loop {
        let mut promoted = false;
        for idx in 0..instructions.len() {
            let instruction = &instructions[idx];
            if !matches!(instruction.opcode, GOTO | JSR) {
                continue;
            }
            if let Operand::Branch(rel) = instruction.operand {
                let target = target_index(instruction, rel)?;
                let displacement = new_offsets[target] as i64 - new_offsets[idx] as i64;
                if i16::try_from(displacement).is_err() {
                    let instruction = &mut instructions[idx];
                    instruction.opcode = if instruction.opcode == GOTO { GOTO_W } else { JSR_W };
                    promoted = true;
                }
            }
        }
        if !promoted {
            break;
        }
        new_offsets = layout_offsets(instructions);
    }

    let new_length = new_offsets[instructions.len()];
    if new_length > u16::MAX as u32 {
        return Err(Error::MethodCodeOverflow(new_length as usize));
    }

    // Rewrite jumps against the new layout
    for idx in 0..instructions.len() {
        let relative = instructions[idx].relative_targets();
        if relative.is_empty() {
            continue;
        }
        let mut retargeted = Vec::with_capacity(relative.len());
        for rel in relative {
            let target = target_index(&instructions[idx], rel)?;
            let displacement = new_offsets[target] as i64 - new_offsets[idx] as i64;
            let narrow = matches!(instructions[idx].operand, Operand::Branch(_))
                && !matches!(instructions[idx].opcode, GOTO_W | JSR_W);
            if narrow && i16::try_from(displacement).is_err() {
                return Err(Error::BranchOffsetOverflow {
                    offset: new_offsets[idx],
                    target: new_offsets[target],
                });
            }
            retargeted.push(displacement as i32);
        }
        instructions[idx].set_relative_targets(&retargeted);
    }

    let mut code = Vec::with_capacity(new_length as usize);
    for (idx, instruction) in instructions.iter().enumerate() {
        instruction.encode(new_offsets[idx], &mut code)?;
    }

    let map = old_index
        .into_iter()
        .map(|(old, idx)| (old, new_offsets[idx]))
        .collect();

    for (instruction, offset) in instructions.iter_mut().zip(&new_offsets) {
        instruction.offset = *offset;
    }

    Ok((code, OffsetMap(map)))
}

/// Offsets of every instruction in sequence, plus the total length at the end
fn layout_offsets(instructions: &[Instruction]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(instructions.len() + 1);
    let mut offset = 0;
    for instruction in instructions {
        offsets.push(offset);
        offset += instruction.encoded_len(offset);
    }
    offsets.push(offset);
    offsets
}
