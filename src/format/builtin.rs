//! Formats that ship with the engine.

use std::collections::BTreeMap;

use typebridge_types::{Array, Dictionary, FormatSelector, Value};

use crate::engine::{format_number, Context};
use crate::error::ReflectError;

use super::{Format, FormatError, FormatRegistration};

// ============================================================================
// json
// ============================================================================

fn json() -> Format {
    Format {
        media_types: &["application/json", "text/json"],
        encode: Some(encode_json),
        decode: Some(decode_json),
        ..Format::new("json")
    }
}

inventory::submit!(FormatRegistration(json));

fn encode_json(
    ctx: &Context<'_>,
    _selector: &FormatSelector,
    value: &Value,
) -> Result<Vec<u8>, FormatError> {
    let json = to_json(ctx, value)?;
    Ok(serde_json::to_vec_pretty(&json)?)
}

fn decode_json(
    _ctx: &Context<'_>,
    _selector: &FormatSelector,
    bytes: &[u8],
) -> Result<Value, FormatError> {
    let json: serde_json::Value = serde_json::from_slice(bytes)?;
    Ok(from_json(json))
}

fn to_json(ctx: &Context<'_>, value: &Value) -> Result<serde_json::Value, ReflectError> {
    use serde_json::Value as Json;

    Ok(match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(n) => Json::from(*n),
        Value::Int64(n) => Json::from(*n),
        Value::Float(_) | Value::Double(_) => {
            let n = value.as_f64().unwrap_or_default();
            serde_json::Number::from_f64(n)
                .map(Json::Number)
                .ok_or_else(|| ReflectError::invalid(value.type_name(), "number is not finite"))?
        }
        Value::Array(a) => {
            let guard = ctx.guard();
            guard.visit(a.id(), "Array")?;
            let _depth = ctx.descend()?;
            let items = a.to_vec();
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(to_json(ctx, item).map_err(|e| e.at_index(i + 1))?);
            }
            Json::Array(out)
        }
        Value::Dictionary(d) => {
            let guard = ctx.guard();
            guard.visit(d.id(), "Dictionary")?;
            let _depth = ctx.descend()?;
            let mut out = serde_json::Map::new();
            for (key, item) in d.to_map() {
                let json = to_json(ctx, &item).map_err(|e| e.at_key(&key))?;
                out.insert(key, json);
            }
            Json::Object(out)
        }
        Value::Optional(o) => match &o.value {
            Some(inner) => to_json(ctx, inner)?,
            None => Json::Null,
        },
        other => match other.as_str() {
            Some(text) => Json::String(text.to_string()),
            None => {
                return Err(ReflectError::CannotConvert(format!(
                    "{} to json",
                    other.type_name()
                )))
            }
        },
    })
}

fn from_json(json: serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => Value::Double(n.as_f64().unwrap_or_default()),
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::Array(Array::from_vec(
            items.into_iter().map(from_json).collect(),
        )),
        Json::Object(map) => Value::Dictionary(
            map.into_iter()
                .map(|(k, v)| (k, from_json(v)))
                .collect::<Dictionary>(),
        ),
    }
}

// ============================================================================
// txt and bin
// ============================================================================

fn txt() -> Format {
    Format {
        media_types: &["text/plain"],
        encode: Some(encode_txt),
        decode: Some(decode_txt),
        ..Format::new("txt")
    }
}

inventory::submit!(FormatRegistration(txt));

fn encode_txt(
    _ctx: &Context<'_>,
    selector: &FormatSelector,
    value: &Value,
) -> Result<Vec<u8>, FormatError> {
    value
        .as_str()
        .map(|s| s.as_bytes().to_vec())
        .ok_or_else(|| FormatError::malformed(&selector.format, format!("cannot encode {}", value.type_name())))
}

fn decode_txt(
    _ctx: &Context<'_>,
    selector: &FormatSelector,
    bytes: &[u8],
) -> Result<Value, FormatError> {
    std::str::from_utf8(bytes)
        .map(|s| Value::String(s.to_string()))
        .map_err(|e| FormatError::malformed(&selector.format, e.to_string()))
}

fn bin() -> Format {
    Format {
        media_types: &["application/octet-stream"],
        encode: Some(encode_bin),
        decode: Some(decode_bin),
        ..Format::new("bin")
    }
}

inventory::submit!(FormatRegistration(bin));

fn encode_bin(
    _ctx: &Context<'_>,
    selector: &FormatSelector,
    value: &Value,
) -> Result<Vec<u8>, FormatError> {
    value
        .as_bytes()
        .map(<[u8]>::to_vec)
        .ok_or_else(|| FormatError::malformed(&selector.format, format!("cannot encode {}", value.type_name())))
}

fn decode_bin(
    _ctx: &Context<'_>,
    _selector: &FormatSelector,
    bytes: &[u8],
) -> Result<Value, FormatError> {
    Ok(Value::BinaryString(bytes.to_vec()))
}

// ============================================================================
// csv
// ============================================================================

fn csv() -> Format {
    Format {
        media_types: &["text/csv"],
        options: &[("Delimiter", &["string"]), ("Header", &["bool"])],
        encode: Some(encode_csv),
        decode: Some(decode_csv),
        ..Format::new("csv")
    }
}

inventory::submit!(FormatRegistration(csv));

struct CsvOptions {
    delimiter: char,
    header: bool,
}

impl CsvOptions {
    fn from_selector(selector: &FormatSelector) -> Result<Self, FormatError> {
        let delimiter = match selector.option("Delimiter").and_then(Value::as_str) {
            None => ',',
            Some(d) => {
                let mut chars = d.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c != '"' && c != '\n' && c != '\r' => c,
                    _ => {
                        return Err(FormatError::malformed(
                            "csv",
                            format!("invalid delimiter {d:?}"),
                        ))
                    }
                }
            }
        };
        let header = matches!(selector.option("Header"), Some(Value::Bool(true)));
        Ok(Self { delimiter, header })
    }
}

fn encode_csv(
    _ctx: &Context<'_>,
    selector: &FormatSelector,
    value: &Value,
) -> Result<Vec<u8>, FormatError> {
    let options = CsvOptions::from_selector(selector)?;
    let Value::Array(rows) = value else {
        return Err(ReflectError::mismatch("Array", value.type_name()).into());
    };
    let rows = rows.to_vec();

    let mut records: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
    if options.header {
        let mut columns: Vec<String> = Vec::new();
        let mut dicts = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let Value::Dictionary(d) = row else {
                return Err(ReflectError::mismatch("Dictionary", row.type_name())
                    .at_index(i + 1)
                    .into());
            };
            let map = d.to_map();
            for key in map.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
            dicts.push(map);
        }
        records.push(columns.clone());
        for (i, map) in dicts.iter().enumerate() {
            let mut record = Vec::with_capacity(columns.len());
            for column in &columns {
                let cell = map.get(column).unwrap_or(&Value::Nil);
                record.push(cell_text(cell).map_err(|e| e.at_key(column).at_index(i + 1))?);
            }
            records.push(record);
        }
    } else {
        for (i, row) in rows.iter().enumerate() {
            let Value::Array(cells) = row else {
                return Err(ReflectError::mismatch("Array", row.type_name())
                    .at_index(i + 1)
                    .into());
            };
            let mut record = Vec::with_capacity(cells.len());
            for (j, cell) in cells.to_vec().iter().enumerate() {
                record.push(cell_text(cell).map_err(|e| e.at_index(j + 1).at_index(i + 1))?);
            }
            records.push(record);
        }
    }

    let mut out = String::new();
    for record in &records {
        let line: Vec<String> = record
            .iter()
            .map(|field| quote_field(field, options.delimiter))
            .collect();
        out.push_str(&line.join(&options.delimiter.to_string()));
        out.push('\n');
    }
    Ok(out.into_bytes())
}

fn cell_text(cell: &Value) -> Result<String, ReflectError> {
    match cell {
        Value::Nil => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        other => {
            if let Some(n) = other.as_f64() {
                return Ok(format_number(n));
            }
            other
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ReflectError::mismatch("string", other.type_name()))
        }
    }
}

fn quote_field(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) || field.contains(['"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn decode_csv(
    _ctx: &Context<'_>,
    selector: &FormatSelector,
    bytes: &[u8],
) -> Result<Value, FormatError> {
    let options = CsvOptions::from_selector(selector)?;
    let text = std::str::from_utf8(bytes).map_err(|e| FormatError::malformed("csv", e.to_string()))?;
    let records = parse_csv(text, options.delimiter).map_err(|reason| FormatError::malformed("csv", reason))?;

    let rows = Array::new();
    if options.header {
        let mut records = records.into_iter();
        let columns = records.next().unwrap_or_default();
        for record in records {
            let mut map = BTreeMap::new();
            for (column, cell) in columns.iter().zip(record) {
                map.insert(column.clone(), Value::String(cell));
            }
            rows.push(Value::Dictionary(Dictionary::from_map(map)));
        }
    } else {
        for record in records {
            let cells = record.into_iter().map(Value::String).collect();
            rows.push(Value::Array(Array::from_vec(cells)));
        }
    }
    Ok(Value::Array(rows))
}

fn parse_csv(text: &str, delimiter: char) -> Result<Vec<Vec<String>>, String> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    fn end_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
        record.push(std::mem::take(field));
        let done = std::mem::take(record);
        // Blank lines carry no record.
        if !(done.len() == 1 && done[0].is_empty()) {
            records.push(done);
        }
    }

    while let Some(c) = chars.next() {
        if quoted {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    quoted = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => quoted = true,
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                end_record(&mut records, &mut record, &mut field);
            }
            '\n' => end_record(&mut records, &mut record, &mut field),
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    if quoted {
        return Err("unterminated quoted field".to_string());
    }
    if !field.is_empty() || !record.is_empty() {
        end_record(&mut records, &mut record, &mut field);
    }
    Ok(records)
}
