/// A single operand field bound by an opcode pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub name: &'static str,
    pub shift: u32,
    pub mask: u16,
}

/// Parsed form of a four nibble pattern such as `"8XY4"` or `"ANNN"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodePattern {
    pub mask: u16,
    pub value: u16,
    pub operands: Vec<Operand>,
}

impl OpcodePattern {
    pub fn parse(pattern: &str) -> Result<Self, String> {
        let nibbles: Vec<char> = pattern.chars().collect();
        if nibbles.len() != 4 {
            return Err(format!(
                "opcode pattern `{}` must be exactly 4 nibbles",
                pattern
            ));
        }

        let mut mask = 0u16;
        let mut value = 0u16;
        let mut operands: Vec<Operand> = vec![];

        let mut position = 0;
        while position < 4 {
            let shift = (3 - position as u32) * 4;
            match nibbles[position] {
                'X' | 'Y' => {
                    let name = if nibbles[position] == 'X' { "x" } else { "y" };
                    if operands.iter().any(|operand| operand.name == name) {
                        return Err(format!("`{}` appears twice in `{}`", name, pattern));
                    }
                    operands.push(Operand {
                        name,
                        shift,
                        mask: 0xF,
                    });
                    position += 1;
                }
                'N' => {
                    if operands.iter().any(|operand| operand.name.starts_with('n')) {
                        return Err(format!("`{}` has more than one N run", pattern));
                    }
                    let length = nibbles[position..]
                        .iter()
                        .take_while(|&&nibble| nibble == 'N')
                        .count();
                    let name = match length {
                        1 => "n",
                        2 => "nn",
                        3 => "nnn",
                        _ => return Err(format!("`{}` has no fixed nibble", pattern)),
                    };
                    let last = position + length - 1;
                    operands.push(Operand {
                        name,
                        shift: (3 - last as u32) * 4,
                        mask: ((1u32 << (4 * length)) - 1) as u16,
                    });
                    position += length;
                }
                nibble => {
                    let digit = nibble.to_digit(16).ok_or_else(|| {
                        format!("unexpected `{}` in opcode pattern `{}`", nibble, pattern)
                    })?;
                    mask |= 0xF << shift;
                    value |= (digit as u16) << shift;
                    position += 1;
                }
            }
        }

        Ok(Self {
            mask,
            value,
            operands,
        })
    }

    pub fn operand_names(&self) -> Vec<&'static str> {
        self.operands.iter().map(|operand| operand.name).collect()
    }
}
