//! Booleans and the ternary command

use super::*;
use crate::definition::{DefKind, Definition};
use crate::error::ArgumentError;

pub const TRUE_DOC: &str = "Insert the shared `True` definition";
pub const FALSE_DOC: &str = "Insert the shared `False` definition";
pub const TERNARY_DOC: &str = r"Choose between two branches

Usage: `\ternary{condition|then|else}`

The condition is resolved first.
It is true if it is the `\true` command or a boolean definition holding true,
    or if its text is `true` (in any case) or a non-zero integer.
It is false for `\false`, `false` and `0`. Any other condition is an error.
Only the selected branch is resolved; commands in the other branch never run.
";

/// Get the `\true` command.
pub fn get_true() -> BuiltIn {
    BuiltIn::new(Kind::Boolean).with_doc(TRUE_DOC)
}

/// Get the `\false` command.
pub fn get_false() -> BuiltIn {
    BuiltIn::new(Kind::Boolean).with_doc(FALSE_DOC)
}

/// Get the `\ternary` command.
pub fn get_ternary() -> BuiltIn {
    BuiltIn::new(Kind::Ternary).with_doc(TERNARY_DOC)
}

pub(crate) fn execute_boolean(name: &str, input: &mut ExecutionInput) -> psalter::Result<Outcome> {
    let value = name.eq_ignore_ascii_case("true");
    let key = if value { "True" } else { "False" };
    // The document's own definition wins over the global one.
    let existing = input
        .try_lookup(key)
        .filter(|id| matches!(input.context().definition(*id).kind(), DefKind::Boolean(_)));
    let context = input.context_mut();
    let shared = match existing {
        Some(id) => id,
        None => {
            log::debug!("allocating the shared `{key}` definition");
            context.add_definition(Definition::new(DefKind::Boolean(value)).with_key(key), None)
        }
    };
    input.register_reference(shared);
    Ok(Output::Definition(shared).into())
}

pub(crate) fn execute_ternary(
    name: &str,
    parameters: &mut [Inline],
    input: &mut ExecutionInput,
) -> psalter::Result<Outcome> {
    if parameters.len() != 3 {
        return Err(ArgumentError::count(name, "exactly 3", parameters.len()).into());
    }
    input.resolve(&mut parameters[0])?;
    let condition = condition_value(name, &parameters[0], input)?;
    let selected = if condition { 1 } else { 2 };
    input.resolve(&mut parameters[selected])?;
    Ok(Output::Parameter(selected).into())
}

fn condition_value(name: &str, condition: &Inline, input: &ExecutionInput) -> psalter::Result<bool> {
    if let Inline::Command(command) = condition {
        if let Some(Output::Definition(id)) = command.output() {
            if let DefKind::Boolean(value) = input.context().definition(*id).kind() {
                return Ok(*value);
            }
        }
    }
    let text = input.text(condition);
    match parse_bool(&text) {
        Some(value) => Ok(value),
        None => Err(ArgumentError::new(
            name,
            format!["the condition `{}` is not a boolean", text.trim()],
        )
        .with_note("conditions are \\true, \\false, `true`, `false` or an integer")
        .into()),
    }
}
