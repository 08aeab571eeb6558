use typebridge_types::{DomainType, FormatSelector, Value};

use crate::dump::{FieldSchema, TypeRef, TypeSchema};
use crate::engine::{Reflector, Registration};
use crate::format;

use super::{cast, set_exact};

fn format_selector() -> Reflector {
    Reflector::new(FormatSelector::TYPE_NAME)
        .push(|ctx, v| format::serialize(ctx, &cast::<FormatSelector>(&v)?))
        .pull(|ctx, d| format::resolve(ctx, d).map(Value::FormatSelector))
        .set(set_exact)
        .with_dump(|| {
            TypeSchema::new(FormatSelector::TYPE_NAME)
                .category("Selector")
                .underlying(TypeRef::or([
                    TypeRef::String,
                    TypeRef::structure([FieldSchema::new("Format", TypeRef::String)]),
                ]))
                .summary(
                    "A format name, or a table with a Format field plus the \
                     options that format declares.",
                )
        })
}

inventory::submit!(Registration(format_selector));
