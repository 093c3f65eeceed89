//! Names the generator gives to what it emits.

use heck::ToSnakeCase;

use crate::resolve::GenerationTarget;

pub const INSTANCE_FIELD_PREFIX: &str = "__instance_";

/// Method added to every generation target.
pub const REGISTRATION_FN: &str = "register_generated_endpoints";

/// File that includes every emitted unit.
pub const INDEX_FILE: &str = "routegen.rs";

const UNIT_SUFFIX: &str = "generated_endpoints.rs";

pub fn instance_field_name(index: usize) -> String {
    format!("{}{}", INSTANCE_FIELD_PREFIX, index)
}

/// File name of the unit emitted for `target`: module segments and the
/// snake-cased type name, dot-separated, so targets sharing a name in
/// different modules never collide.
pub fn unit_file_name(target: &GenerationTarget) -> String {
    let mut parts: Vec<String> = target
        .namespace
        .iter()
        .flat_map(|namespace| namespace.split("::"))
        .filter(|segment| *segment != "crate")
        .map(str::to_string)
        .collect();
    parts.push(target.type_name.to_snake_case());
    parts.push(UNIT_SUFFIX.to_string());
    parts.join(".")
}
