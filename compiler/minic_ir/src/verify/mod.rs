//! Structural checks over generated functions.
//!
//! A well-formed function:
//! - starts with exactly one `Entry` and ends with exactly one `Exit`
//! - places every label exactly once and branches to it at least once
//! - only branches to labels it places
//! - only reads instruction results defined earlier in its code

use std::fmt;

use rustc_hash::FxHashSet;

use crate::{FuncId, Function, InstId, Instr, LabelId, Module, ValueKind};

/// A broken invariant found in a function's code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    MissingEntry,
    MissingExit,
    /// More than one `Entry`/`Exit`, or one away from its edge of the code.
    MisplacedBoundary { position: usize },
    LabelNotPlaced { label: String },
    LabelPlacedTwice { label: String },
    UnreferencedLabel { label: String },
    DuplicateLabelName { label: String },
    UseBeforeDef { position: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingEntry => write!(f, "code does not start with `entry`"),
            Violation::MissingExit => write!(f, "code does not end with `exit`"),
            Violation::MisplacedBoundary { position } => {
                write!(f, "stray entry/exit at instruction {position}")
            }
            Violation::LabelNotPlaced { label } => {
                write!(f, "label `{label}` is a branch target but never placed")
            }
            Violation::LabelPlacedTwice { label } => write!(f, "label `{label}` is placed twice"),
            Violation::UnreferencedLabel { label } => {
                write!(f, "label `{label}` is never branched to")
            }
            Violation::DuplicateLabelName { label } => {
                write!(f, "label name `{label}` is used twice")
            }
            Violation::UseBeforeDef { position } => {
                write!(f, "instruction {position} reads a result defined later")
            }
        }
    }
}

/// Check one function. Returns every violation found, in code order.
pub fn verify_function(func: &Function) -> Vec<Violation> {
    let mut violations = Vec::new();
    let code = func.code();

    if !matches!(code.first().map(|&id| func.inst(id)), Some(Instr::Entry)) {
        violations.push(Violation::MissingEntry);
    }
    if !matches!(code.last().map(|&id| func.inst(id)), Some(Instr::Exit(_))) {
        violations.push(Violation::MissingExit);
    }

    let last = code.len().saturating_sub(1);
    let mut placed: Vec<u32> = vec![0; func.labels().len()];
    let mut referenced: FxHashSet<LabelId> = FxHashSet::default();
    let mut defined: FxHashSet<InstId> = FxHashSet::default();

    for (position, &id) in code.iter().enumerate() {
        let instr = func.inst(id);
        match instr {
            Instr::Entry if position != 0 => {
                violations.push(Violation::MisplacedBoundary { position });
            }
            Instr::Exit(_) if position != last => {
                violations.push(Violation::MisplacedBoundary { position });
            }
            Instr::Label(l) => placed[l.index()] += 1,
            _ => {}
        }
        referenced.extend(instr.branch_targets());

        let reads_later = instr.operands().iter().any(|v| match v.kind() {
            ValueKind::Inst(src) => !defined.contains(&src),
            _ => false,
        });
        if reads_later {
            violations.push(Violation::UseBeforeDef { position });
        }
        defined.insert(id);
    }

    let mut names: FxHashSet<&str> = FxHashSet::default();
    for (raw, info) in func.labels().iter().enumerate() {
        let label = info.name.clone();
        let id = LabelId::new(func.id(), crate::ids::next_raw(raw));
        match placed[raw] {
            0 if referenced.contains(&id) => violations.push(Violation::LabelNotPlaced { label }),
            0 => {}
            1 if !referenced.contains(&id) => {
                violations.push(Violation::UnreferencedLabel { label });
            }
            1 => {}
            _ => violations.push(Violation::LabelPlacedTwice { label }),
        }
        if placed[raw] > 0 && !names.insert(info.name.as_str()) {
            violations.push(Violation::DuplicateLabelName {
                label: info.name.clone(),
            });
        }
    }

    violations
}

/// Check every function of `module`.
pub fn verify_module(module: &Module) -> Vec<(FuncId, Violation)> {
    module
        .functions()
        .iter()
        .flat_map(|func| {
            verify_function(func)
                .into_iter()
                .map(move |v| (func.id(), v))
        })
        .collect()
}

#[cfg(test)]
mod tests;
