use tracing::{debug, warn};
use typebridge_types::{DomainType, FormatSelector};

use crate::dynamic::{Dynamic, Table};
use crate::engine::{Context, VARIANT};
use crate::error::{ReflectError, Result};

use super::Format;

const FORMAT_FIELD: &str = "Format";

/// Resolve a dynamic value into a validated selector.
///
/// Accepts a bare format name or a table whose `Format` field names the
/// format and whose other fields are options. Each option is pulled
/// restricted to the types the format declares for it.
pub fn resolve(ctx: &Context<'_>, value: &Dynamic) -> Result<FormatSelector> {
    match value {
        Dynamic::String(_) => {
            let name = value
                .as_str()
                .ok_or_else(|| ReflectError::invalid(FormatSelector::TYPE_NAME, "format name is not UTF-8"))?;
            let format = ctx.formats().get(name)?;
            debug!(format = format.name, "resolved bare format selector");
            Ok(FormatSelector::new(format.name))
        }
        Dynamic::Table(table) => resolve_table(ctx, table),
        other => Err(ReflectError::mismatch("string or table", other.type_of())),
    }
}

fn resolve_table(ctx: &Context<'_>, table: &Table) -> Result<FormatSelector> {
    let guard = ctx.guard();
    guard.visit(table.id(), FormatSelector::TYPE_NAME)?;
    let _depth = ctx.descend()?;

    let name = match table.get(FORMAT_FIELD) {
        Dynamic::String(s) => std::str::from_utf8(&s)
            .map(str::to_string)
            .map_err(|_| {
                ReflectError::invalid("string", "not UTF-8")
                    .in_field(FORMAT_FIELD, FormatSelector::TYPE_NAME)
            })?,
        other => {
            return Err(ReflectError::mismatch("string", other.type_of())
                .in_field(FORMAT_FIELD, FormatSelector::TYPE_NAME))
        }
    };
    let format = ctx.formats().get(&name)?;
    let owner = format!("format {}", format.name);

    if table.len() > 0 {
        return Err(ReflectError::invalid(
            FormatSelector::TYPE_NAME,
            "options must be named fields",
        ));
    }

    // Copy the entries out so that pulling an option may borrow the table
    // again.
    let entries: Vec<(String, Dynamic)> = table
        .borrow()
        .fields
        .iter()
        .filter(|(key, _)| key.as_str() != FORMAT_FIELD)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let mut selector = FormatSelector::new(format.name);
    for (key, value) in entries {
        match format.accepts(&key) {
            Some(types) => {
                let pulled = ctx
                    .pull_any_of(&value, types)
                    .map_err(|e| e.in_field(&key, &owner))?;
                selector.options.insert(key, pulled);
            }
            None if ignores_extra(ctx, format) => {
                warn!(format = format.name, option = %key, "ignoring undeclared option");
            }
            None => {
                return Err(ReflectError::UnknownOption {
                    option: key,
                    format: format.name.to_string(),
                })
            }
        }
    }
    debug!(
        format = format.name,
        options = selector.options.len(),
        "resolved format selector"
    );
    Ok(selector)
}

/// Turn a selector back into a table, checking every option against the
/// format's schema.
pub fn serialize(ctx: &Context<'_>, selector: &FormatSelector) -> Result<Dynamic> {
    let format = ctx.formats().get(&selector.format)?;
    let owner = format!("format {}", format.name);
    let _guard = ctx.guard();
    let _depth = ctx.descend()?;

    let table = Table::new();
    table.set(FORMAT_FIELD, Dynamic::string(format.name));
    for (key, value) in &selector.options {
        let Some(types) = format.accepts(key) else {
            if ignores_extra(ctx, format) {
                warn!(format = format.name, option = %key, "dropping undeclared option");
                continue;
            }
            return Err(ReflectError::UnknownOption {
                option: key.clone(),
                format: format.name.to_string(),
            });
        };
        if !types.contains(&VARIANT) && !types.contains(&value.type_name()) {
            return Err(ReflectError::mismatch(types.join(" or "), value.type_name())
                .in_field(key, &owner));
        }
        let pushed = ctx
            .push_variant(value.clone())
            .map_err(|e| e.in_field(key, &owner))?;
        table.set(key.clone(), pushed);
    }
    Ok(Dynamic::Table(table))
}

fn ignores_extra(ctx: &Context<'_>, format: &Format) -> bool {
    format.allow_extra || ctx.limits().allow_extra_options
}
