use super::opcodes::*;
use crate::jvm::class_file::ConstantIndex;
use crate::jvm::Error;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// Decoded instruction at a known offset in the original code array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub offset: u32,
    pub opcode: u8,
    pub operand: Operand,
}

/// Operands, grouped by what re-encoding needs to know about them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    None,

    /// Immediates that never change (local slots, `bipush`/`sipush`, `iinc`, `newarray`, and the
    /// whole body of a `wide` instruction including its modified opcode)
    Bytes(Vec<u8>),

    /// Constant pool index (`ldc` stores it in one byte, everything else in two)
    Constant(ConstantIndex),
    InvokeInterface {
        method: ConstantIndex,
        count: u8,
    },
    InvokeDynamic(ConstantIndex),
    MultiANewArray {
        class: ConstantIndex,
        dimensions: u8,
    },

    /// Jump relative to the start of this instruction
    Branch(i32),
    TableSwitch {
        default: i32,
        low: i32,
        high: i32,
        offsets: Vec<i32>,
    },
    LookupSwitch {
        default: i32,
        pairs: Vec<(i32, i32)>,
    },
}

impl Instruction {
    /// Constant pool index used by the instruction, if any
    pub fn constant(&self) -> Option<ConstantIndex> {
        match self.operand {
            Operand::Constant(index)
            | Operand::InvokeInterface { method: index, .. }
            | Operand::InvokeDynamic(index)
            | Operand::MultiANewArray { class: index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn constant_mut(&mut self) -> Option<&mut ConstantIndex> {
        match &mut self.operand {
            Operand::Constant(index)
            | Operand::InvokeInterface { method: index, .. }
            | Operand::InvokeDynamic(index)
            | Operand::MultiANewArray { class: index, .. } => Some(index),
            _ => None,
        }
    }

    /// Relative jump offsets, in encoding order
    pub fn relative_targets(&self) -> Vec<i32> {
        match &self.operand {
            Operand::Branch(rel) => vec![*rel],
            Operand::TableSwitch {
                default, offsets, ..
            } => std::iter::once(*default).chain(offsets.iter().copied()).collect(),
            Operand::LookupSwitch { default, pairs } => std::iter::once(*default)
                .chain(pairs.iter().map(|(_, rel)| *rel))
                .collect(),
            _ => vec![],
        }
    }

    /// Replace the relative jump offsets (same order as [`Instruction::relative_targets`])
    pub fn set_relative_targets(&mut self, targets: &[i32]) {
        match &mut self.operand {
            Operand::Branch(rel) => *rel = targets[0],
            Operand::TableSwitch {
                default, offsets, ..
            } => {
                *default = targets[0];
                offsets.copy_from_slice(&targets[1..]);
            }
            Operand::LookupSwitch { default, pairs } => {
                *default = targets[0];
                for (pair, target) in pairs.iter_mut().zip(&targets[1..]) {
                    pair.1 = *target;
                }
            }
            _ => (),
        }
    }

    /// Switch operands are aligned on a four byte boundary relative to the start of the code
    fn switch_padding(offset: u32) -> u32 {
        (4 - (offset + 1) % 4) % 4
    }

    /// Number of bytes the instruction takes when placed at `offset`
    pub fn encoded_len(&self, offset: u32) -> u32 {
        1 + match &self.operand {
            Operand::None => 0,
            Operand::Bytes(bytes) => bytes.len() as u32,
            Operand::Constant(_) if self.opcode == LDC => 1,
            Operand::Constant(_) => 2,
            Operand::InvokeInterface { .. } | Operand::InvokeDynamic(_) => 4,
            Operand::MultiANewArray { .. } => 3,
            Operand::Branch(_) if matches!(self.opcode, GOTO_W | JSR_W) => 4,
            Operand::Branch(_) => 2,
            Operand::TableSwitch { offsets, .. } => {
                Self::switch_padding(offset) + 12 + 4 * offsets.len() as u32
            }
            Operand::LookupSwitch { pairs, .. } => {
                Self::switch_padding(offset) + 8 + 8 * pairs.len() as u32
            }
        }
    }

    /// Write the instruction as if it were placed at `offset`
    ///
    /// Operands must already fit their encoding (one byte `ldc` index, 16-bit branch offsets
    /// outside of `goto_w`/`jsr_w`).
    pub fn encode(&self, offset: u32, out: &mut Vec<u8>) -> std::io::Result<()> {
        out.write_u8(self.opcode)?;
        match &self.operand {
            Operand::None => (),
            Operand::Bytes(bytes) => out.extend_from_slice(bytes),
            Operand::Constant(index) if self.opcode == LDC => out.write_u8(index.0 as u8)?,
            Operand::Constant(index) => out.write_u16::<BigEndian>(index.0)?,
            Operand::InvokeInterface { method, count } => {
                out.write_u16::<BigEndian>(method.0)?;
                out.write_u8(*count)?;
                out.write_u8(0)?;
            }
            Operand::InvokeDynamic(index) => {
                out.write_u16::<BigEndian>(index.0)?;
                out.write_u16::<BigEndian>(0)?;
            }
            Operand::MultiANewArray { class, dimensions } => {
                out.write_u16::<BigEndian>(class.0)?;
                out.write_u8(*dimensions)?;
            }
            Operand::Branch(rel) if matches!(self.opcode, GOTO_W | JSR_W) => {
                out.write_i32::<BigEndian>(*rel)?
            }
            Operand::Branch(rel) => out.write_i16::<BigEndian>(*rel as i16)?,
            Operand::TableSwitch {
                default,
                low,
                high,
                offsets,
            } => {
                for _ in 0..Self::switch_padding(offset) {
                    out.write_u8(0)?;
                }
                out.write_i32::<BigEndian>(*default)?;
                out.write_i32::<BigEndian>(*low)?;
                out.write_i32::<BigEndian>(*high)?;
                for rel in offsets {
                    out.write_i32::<BigEndian>(*rel)?;
                }
            }
            Operand::LookupSwitch { default, pairs } => {
                for _ in 0..Self::switch_padding(offset) {
                    out.write_u8(0)?;
                }
                out.write_i32::<BigEndian>(*default)?;
                out.write_i32::<BigEndian>(pairs.len() as i32)?;
                for (key, rel) in pairs {
                    out.write_i32::<BigEndian>(*key)?;
                    out.write_i32::<BigEndian>(*rel)?;
                }
            }
        }
        Ok(())
    }
}

/// Decode a whole code array
pub fn decode(code: &[u8]) -> Result<Vec<Instruction>, Error> {
    let mut reader = Cursor::new(code);
    let mut instructions = vec![];
    while (reader.position() as usize) < code.len() {
        let offset = reader.position() as u32;
        let opcode = reader.read_u8().map_err(truncated)?;
        let operand = decode_operand(&mut reader, offset, opcode)?;
        instructions.push(Instruction {
            offset,
            opcode,
            operand,
        });
    }
    Ok(instructions)
}

fn truncated(_: std::io::Error) -> Error {
    Error::MalformedClass(String::from("truncated bytecode"))
}

fn read_vec(reader: &mut Cursor<&[u8]>, len: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = vec![0u8; len];
    std::io::Read::read_exact(reader, &mut bytes).map_err(truncated)?;
    Ok(bytes)
}

fn decode_operand(reader: &mut Cursor<&[u8]>, offset: u32, opcode: u8) -> Result<Operand, Error> {
    let u16_index = |reader: &mut Cursor<&[u8]>| -> Result<ConstantIndex, Error> {
        reader
            .read_u16::<BigEndian>()
            .map(ConstantIndex)
            .map_err(truncated)
    };

    let operand = match opcode {
        BIPUSH | ILOAD..=ALOAD | ISTORE..=ASTORE | RET | NEWARRAY => {
            Operand::Bytes(read_vec(reader, 1)?)
        }
        SIPUSH | IINC => Operand::Bytes(read_vec(reader, 2)?),
        LDC => Operand::Constant(ConstantIndex(reader.read_u8().map_err(truncated)? as u16)),
        LDC_W | LDC2_W | GETSTATIC..=INVOKESTATIC | NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => {
            Operand::Constant(u16_index(reader)?)
        }
        INVOKEINTERFACE => {
            let method = u16_index(reader)?;
            let count = reader.read_u8().map_err(truncated)?;
            reader.read_u8().map_err(truncated)?;
            Operand::InvokeInterface { method, count }
        }
        INVOKEDYNAMIC => {
            let index = u16_index(reader)?;
            reader.read_u16::<BigEndian>().map_err(truncated)?;
            Operand::InvokeDynamic(index)
        }
        MULTIANEWARRAY => {
            let class = u16_index(reader)?;
            let dimensions = reader.read_u8().map_err(truncated)?;
            Operand::MultiANewArray { class, dimensions }
        }
        IFEQ..=JSR | IFNULL | IFNONNULL => {
            Operand::Branch(reader.read_i16::<BigEndian>().map_err(truncated)? as i32)
        }
        GOTO_W | JSR_W => Operand::Branch(reader.read_i32::<BigEndian>().map_err(truncated)?),
        TABLESWITCH => {
            read_vec(reader, Instruction::switch_padding(offset) as usize)?;
            let default = reader.read_i32::<BigEndian>().map_err(truncated)?;
            let low = reader.read_i32::<BigEndian>().map_err(truncated)?;
            let high = reader.read_i32::<BigEndian>().map_err(truncated)?;
            if high < low {
                return Err(Error::MalformedClass(format!(
                    "tableswitch at {} has high {} below low {}",
                    offset, high, low
                )));
            }
            let count = (high as i64 - low as i64 + 1) as usize;
            if count > reader.get_ref().len() / 4 {
                return Err(Error::MalformedClass(String::from("truncated bytecode")));
            }
            let mut offsets = Vec::with_capacity(count);
            for _ in 0..count {
                offsets.push(reader.read_i32::<BigEndian>().map_err(truncated)?);
            }
            Operand::TableSwitch {
                default,
                low,
                high,
                offsets,
            }
        }
        LOOKUPSWITCH => {
            read_vec(reader, Instruction::switch_padding(offset) as usize)?;
            let default = reader.read_i32::<BigEndian>().map_err(truncated)?;
            let npairs = reader.read_i32::<BigEndian>().map_err(truncated)?;
            if npairs < 0 || npairs as usize > reader.get_ref().len() / 8 {
                return Err(Error::MalformedClass(format!(
                    "lookupswitch at {} has bad pair count {}",
                    offset, npairs
                )));
            }
            let mut pairs = Vec::with_capacity(npairs as usize);
            for _ in 0..npairs {
                let key = reader.read_i32::<BigEndian>().map_err(truncated)?;
                let rel = reader.read_i32::<BigEndian>().map_err(truncated)?;
                pairs.push((key, rel));
            }
            Operand::LookupSwitch { default, pairs }
        }
        WIDE => {
            let modified = reader.read_u8().map_err(truncated)?;
            let len = match modified {
                IINC => 4,
                ILOAD..=ALOAD | ISTORE..=ASTORE | RET => 2,
                other => {
                    return Err(Error::MalformedClass(format!(
                        "wide at {} modifies opcode {:#04x}",
                        offset, other
                    )))
                }
            };
            let mut bytes = vec![modified];
            bytes.extend(read_vec(reader, len)?);
            Operand::Bytes(bytes)
        }
        0x00..=0xc3 => Operand::None,
        other => {
            return Err(Error::MalformedClass(format!(
                "unknown opcode {:#04x} at {}",
                other, offset
            )))
        }
    };
    Ok(operand)
}
