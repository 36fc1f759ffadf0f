//! Encodes an assembled `lfc::Instruction` list as a ROM blueprint string
//! (spec §4.6): one constant combinator per instruction, `O`/`D`/`A`
//! virtual-signal filters carrying the opcode and operand, wrapped in the
//! target ecosystem's version-byte / zlib / base64 blueprint-string framing.
//!
//! That outer framing is an opaque byte→text layer delegated to this crate
//! (spec §1 "Out of scope: the blueprint string base encoding used by the
//! target ecosystem"); this module owns only the signals-table encoding of
//! the instruction stream, the way `vexfile` owns the wire layout of a
//! `vcpu` executable without knowing what the bytes mean to the processor.

use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use num_traits::ToPrimitive;
use serde::Serialize;

use lfc::{Instruction, OperandKind};

/// Prefixed to every blueprint string before the base64 payload, identifying
/// the container format to the target's blueprint importer. The target
/// ecosystem's own version byte; opaque to this crate beyond "prepend it".
const BLUEPRINT_STRING_VERSION: char = '0';

/// The `version` field Factorio-style blueprints carry inside the JSON
/// envelope itself (distinct from `BLUEPRINT_STRING_VERSION`); unused by the
/// compiler, carried through as a constant because the target's importer
/// expects the key to be present.
const BLUEPRINT_JSON_VERSION: u64 = 0;

const ENTITY_NAME: &str = "constant-combinator";
const SIGNAL_KIND: &str = "virtual";
const SIGNAL_OPCODE: &str = "signal-O";
const SIGNAL_IMMEDIATE: &str = "signal-D";
const SIGNAL_ADDRESS: &str = "signal-A";

#[derive(Serialize)]
struct SignalId {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
}

#[derive(Serialize)]
struct Filter {
    signal: SignalId,
    count: i32,
    index: u32,
}

#[derive(Serialize)]
struct ControlBehavior {
    filters: Vec<Filter>,
}

#[derive(Serialize)]
struct Position {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct Entity {
    entity_number: u32,
    name: &'static str,
    position: Position,
    control_behavior: ControlBehavior,
}

#[derive(Serialize)]
struct BlueprintBody {
    icons: Vec<serde_json::Value>,
    entities: Vec<Entity>,
    item: &'static str,
    version: u64,
}

#[derive(Serialize)]
struct Envelope {
    blueprint: BlueprintBody,
}

/// One combinator per ROM instruction, laid out left to right so the
/// imported blueprint reads in program order.
fn entity_for(rom_index: u32, instruction: &Instruction) -> Entity {
    let opcode_value = instruction
        .opcode
        .to_i32()
        .expect("27-variant Opcode enum always fits in i32");

    let mut filters = vec![Filter {
        signal: SignalId {
            kind: SIGNAL_KIND,
            name: SIGNAL_OPCODE,
        },
        count: opcode_value,
        index: 1,
    }];

    let operand_signal = match instruction.opcode.operand_kind() {
        OperandKind::None => None,
        OperandKind::Immediate => Some(SIGNAL_IMMEDIATE),
        OperandKind::Address => Some(SIGNAL_ADDRESS),
    };
    if let Some(name) = operand_signal {
        filters.push(Filter {
            signal: SignalId {
                kind: SIGNAL_KIND,
                name,
            },
            count: instruction.operand,
            index: 2,
        });
    }

    Entity {
        entity_number: rom_index,
        name: ENTITY_NAME,
        position: Position {
            x: (rom_index - 1) as f64,
            y: 0.0,
        },
        control_behavior: ControlBehavior { filters },
    }
}

/// Encodes an assembled instruction list as a ROM blueprint string, ready to
/// paste into the target's blueprint import dialog.
pub fn encode(program: &[Instruction]) -> String {
    let entities = program
        .iter()
        .enumerate()
        .map(|(i, instruction)| entity_for(i as u32 + 1, instruction))
        .collect();

    let envelope = Envelope {
        blueprint: BlueprintBody {
            icons: Vec::new(),
            entities,
            item: "blueprint",
            version: BLUEPRINT_JSON_VERSION,
        },
    };
    let json = serde_json::to_string(&envelope).expect("envelope has no non-serializable fields");

    let mut zlib = ZlibEncoder::new(Vec::new(), Compression::best());
    zlib.write_all(json.as_bytes())
        .expect("writing to an in-memory Vec<u8> cannot fail");
    let compressed = zlib
        .finish()
        .expect("finishing an in-memory zlib stream cannot fail");

    let mut out = String::with_capacity(1 + (compressed.len() * 4 + 2) / 3);
    out.push(BLUEPRINT_STRING_VERSION);
    BASE64.encode_string(&compressed, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;
    use lfc::Opcode;

    /// Inverts [`encode`] well enough to assert on the JSON it produced,
    /// without exposing a public `decode` (the format is a one-way emission
    /// surface per spec §4.6).
    fn decode_json(blueprint: &str) -> serde_json::Value {
        assert!(blueprint.starts_with(BLUEPRINT_STRING_VERSION));
        let payload = BASE64.decode(&blueprint[1..]).unwrap();
        let mut decoder = ZlibDecoder::new(&payload[..]);
        let mut json = String::new();
        decoder.read_to_string(&mut json).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn round_trips_the_smallest_program() {
        let program = vec![
            Instruction::new(Opcode::JSR, 3),
            Instruction::new(Opcode::JUMP, 0),
            Instruction::new(Opcode::CNST, 42),
            Instruction::new(Opcode::SAVE, -1),
            Instruction::bare(Opcode::RET),
        ];
        let blueprint = encode(&program);
        let value = decode_json(&blueprint);

        let entities = value["blueprint"]["entities"].as_array().unwrap();
        assert_eq!(entities.len(), 5);

        let cnst = &entities[2];
        assert_eq!(cnst["entity_number"], 3);
        assert_eq!(cnst["name"], "constant-combinator");
        let filters = cnst["control_behavior"]["filters"].as_array().unwrap();
        assert_eq!(filters[0]["signal"]["name"], "signal-O");
        assert_eq!(filters[0]["count"], Opcode::CNST.to_i32().unwrap());
        assert_eq!(filters[1]["signal"]["name"], "signal-D");
        assert_eq!(filters[1]["count"], 42);
    }

    #[test]
    fn operand_less_opcodes_emit_a_single_filter() {
        let program = vec![Instruction::bare(Opcode::RET)];
        let blueprint = encode(&program);
        let value = decode_json(&blueprint);
        let filters = value["blueprint"]["entities"][0]["control_behavior"]["filters"]
            .as_array()
            .unwrap();
        assert_eq!(filters.len(), 1);
    }

    #[test]
    fn address_operands_use_the_a_signal() {
        let program = vec![Instruction::new(Opcode::LOAD, -6)];
        let blueprint = encode(&program);
        let value = decode_json(&blueprint);
        let filters = value["blueprint"]["entities"][0]["control_behavior"]["filters"]
            .as_array()
            .unwrap();
        assert_eq!(filters[1]["signal"]["name"], "signal-A");
        assert_eq!(filters[1]["count"], -6);
    }

    #[test]
    fn empty_program_encodes_to_an_empty_entity_list() {
        let blueprint = encode(&[]);
        let value = decode_json(&blueprint);
        assert!(value["blueprint"]["entities"].as_array().unwrap().is_empty());
    }
}
