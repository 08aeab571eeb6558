//! HTTP option records.
//!
//! Headers, cookie lists and the request/response records cross the
//! boundary as plain tables; a single cookie is userdata so scripts can
//! build one with `Cookie.new` and edit it in place.

use typebridge_types::{
    ConversionError, Cookie, Cookies, DomainType, FormatSelector, HttpHeaders, HttpOptions,
    HttpResponse, Value,
};

use crate::dump::{FieldSchema, FunctionSchema, TypeRef, TypeSchema};
use crate::dynamic::{Dynamic, Table};
use crate::engine::{Args, Context, Property, Reflector, Registration, VARIANT};
use crate::error::{ReflectError, Result};

use super::{cast, eq_by_value, eq_schema, set_exact, userdata, userdata_reflector};

// ============================================================================
// Headers
// ============================================================================

fn push_headers(_: &Context<'_>, value: Value) -> Result<Dynamic> {
    let headers = cast::<HttpHeaders>(&value)?;
    let table = Table::new();
    for (name, values) in headers.0 {
        let entry = match values.as_slice() {
            [single] => Dynamic::string(single),
            many => Dynamic::Table(Table::from_seq(many.iter().map(Dynamic::string).collect())),
        };
        table.set(name, entry);
    }
    Ok(Dynamic::Table(table))
}

/// Each header maps to a string or to a list of strings.
fn pull_headers(ctx: &Context<'_>, value: &Dynamic) -> Result<Value> {
    let Dynamic::Table(table) = value else {
        return Err(ReflectError::mismatch(HttpHeaders::TYPE_NAME, value.type_of()));
    };
    let guard = ctx.guard();
    guard.visit(table.id(), HttpHeaders::TYPE_NAME)?;
    let _depth = ctx.descend()?;

    if table.len() > 0 {
        return Err(ReflectError::invalid(
            HttpHeaders::TYPE_NAME,
            "header names must be strings",
        ));
    }
    let entries: Vec<(String, Dynamic)> = table
        .borrow()
        .fields
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut headers = HttpHeaders::new();
    for (name, entry) in entries {
        match &entry {
            Dynamic::String(_) => {
                let text = header_text(&entry).map_err(|e| e.at_key(&name))?;
                headers.append(&name, text);
            }
            Dynamic::Table(list) => {
                guard.visit(list.id(), HttpHeaders::TYPE_NAME)?;
                if list.has_fields() {
                    return Err(ReflectError::mismatch("string", "table").at_key(&name));
                }
                let items = list.borrow().seq.clone();
                headers.0.entry(name.clone()).or_default();
                for (i, item) in items.iter().enumerate() {
                    let text = header_text(item).map_err(|e| e.at_index(i + 1).at_key(&name))?;
                    headers.append(&name, text);
                }
            }
            other => {
                return Err(
                    ReflectError::mismatch("string or Array", other.type_of()).at_key(&name)
                )
            }
        }
    }
    Ok(Value::HttpHeaders(headers))
}

fn header_text(value: &Dynamic) -> Result<String> {
    match value {
        Dynamic::String(_) => value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ReflectError::invalid("string", "not UTF-8")),
        other => Err(ReflectError::mismatch("string", other.type_of())),
    }
}

fn http_headers() -> Reflector {
    Reflector::new(HttpHeaders::TYPE_NAME)
        .push(push_headers)
        .pull(pull_headers)
        .set(set_exact)
        .with_dump(|| {
            TypeSchema::new(HttpHeaders::TYPE_NAME)
                .category("Http")
                .underlying(TypeRef::dictionary(TypeRef::or([
                    TypeRef::String,
                    TypeRef::array(TypeRef::String),
                ])))
                .summary("Header names mapped to one value or a list of values.")
        })
}

inventory::submit!(Registration(http_headers));

// ============================================================================
// Cookies
// ============================================================================

macro_rules! cookie_text {
    ($field:ident) => {
        Property::read_write(
            |_, v| Ok(Dynamic::string(cast::<Cookie>(v)?.$field)),
            |_, slot, d| {
                let mut cookie = cast::<Cookie>(slot)?;
                cookie.$field = d
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ReflectError::mismatch("string", d.type_of()))?;
                *slot = cookie.into();
                Ok(())
            },
            || TypeRef::String,
        )
    };
}

/// Optional cookie attribute; assigning nil clears it.
macro_rules! cookie_attribute {
    ($field:ident) => {
        Property::read_write(
            |_, v| {
                Ok(cast::<Cookie>(v)?
                    .$field
                    .map(Dynamic::string)
                    .unwrap_or_default())
            },
            |_, slot, d| {
                let mut cookie = cast::<Cookie>(slot)?;
                cookie.$field = match d {
                    Dynamic::Nil => None,
                    other => Some(
                        other
                            .as_str()
                            .map(str::to_string)
                            .ok_or_else(|| ReflectError::mismatch("string", other.type_of()))?,
                    ),
                };
                *slot = cookie.into();
                Ok(())
            },
            || TypeRef::optional(TypeRef::String),
        )
    };
}

fn cookie() -> Reflector {
    userdata_reflector::<Cookie>()
        .property("Name", cookie_text!(name))
        .property("Value", cookie_text!(value))
        .property("Domain", cookie_attribute!(domain))
        .property("Path", cookie_attribute!(path))
        .constructor(
            "new",
            |_, args| {
                let args = Args::new("Cookie.new", args);
                args.expect_count(&[2])?;
                Ok(vec![userdata(Cookie::new(args.string(0)?, args.string(1)?))])
            },
            || {
                vec![FunctionSchema::new()
                    .param("name", TypeRef::String)
                    .param("value", TypeRef::String)
                    .returns(TypeRef::named(Cookie::TYPE_NAME))]
            },
        )
        .operator("__eq", eq_by_value::<Cookie>, eq_schema)
        .operator(
            "__tostring",
            |_, v, _| {
                let cookie = super::from_userdata::<Cookie>(v)?;
                Ok(Dynamic::string(format!("{}={}", cookie.name, cookie.value)))
            },
            super::tostring_schema,
        )
        .with_dump(|| {
            TypeSchema::new(Cookie::TYPE_NAME)
                .category("Http")
                .summary("A single HTTP cookie.")
        })
}

inventory::submit!(Registration(cookie));

fn push_cookies(_: &Context<'_>, value: Value) -> Result<Dynamic> {
    let cookies = cast::<Cookies>(&value)?;
    Ok(Dynamic::Table(Table::from_seq(
        cookies.0.into_iter().map(userdata).collect(),
    )))
}

fn pull_cookies(ctx: &Context<'_>, value: &Dynamic) -> Result<Value> {
    let Dynamic::Table(table) = value else {
        return Err(ReflectError::mismatch(Cookies::TYPE_NAME, value.type_of()));
    };
    let guard = ctx.guard();
    guard.visit(table.id(), Cookies::TYPE_NAME)?;
    if table.has_fields() {
        return Err(ReflectError::mismatch(Cookies::TYPE_NAME, "table with named fields"));
    }
    let items = table.borrow().seq.clone();
    let cookies = items
        .iter()
        .enumerate()
        .map(|(i, item)| super::from_userdata::<Cookie>(item).map_err(|e| e.at_index(i + 1)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Cookies(Cookies(cookies)))
}

fn cookies() -> Reflector {
    Reflector::new(Cookies::TYPE_NAME)
        .push(push_cookies)
        .pull(pull_cookies)
        .set(set_exact)
        .with_dump(|| {
            TypeSchema::new(Cookies::TYPE_NAME)
                .category("Http")
                .underlying(TypeRef::array(TypeRef::named(Cookie::TYPE_NAME)))
        })
}

inventory::submit!(Registration(cookies));

// ============================================================================
// Records
// ============================================================================

/// Field access on a table standing in for a record type.
struct Record<'a, 'r> {
    ctx: &'a Context<'r>,
    table: &'a Table,
    owner: &'static str,
}

impl<'a, 'r> Record<'a, 'r> {
    /// Check the table shape and its field names before any field is read.
    fn open(
        ctx: &'a Context<'r>,
        value: &'a Dynamic,
        owner: &'static str,
        known: &[&str],
    ) -> Result<Self> {
        let Dynamic::Table(table) = value else {
            return Err(ReflectError::mismatch(owner, value.type_of()));
        };
        if table.len() > 0 {
            return Err(ReflectError::invalid(owner, "fields must be named"));
        }
        if let Some(unknown) = table
            .borrow()
            .fields
            .keys()
            .find(|k| !known.contains(&k.as_str()))
        {
            return Err(ReflectError::UnknownMember {
                type_name: owner.to_string(),
                member: unknown.clone(),
            });
        }
        Ok(Self { ctx, table, owner })
    }

    fn optional(&self, field: &str, type_name: &str) -> Result<Option<Value>> {
        match self.table.get(field) {
            Dynamic::Nil => Ok(None),
            value => self
                .ctx
                .pull(type_name, &value)
                .map(Some)
                .map_err(|e| e.in_field(field, self.owner)),
        }
    }

    fn required(&self, field: &str, type_name: &str) -> Result<Value> {
        self.optional(field, type_name)?.ok_or_else(|| {
            ReflectError::mismatch(type_name, "nil").in_field(field, self.owner)
        })
    }

    fn optional_as<T>(&self, field: &str, type_name: &str) -> Result<Option<T>>
    where
        T: TryFrom<Value, Error = ConversionError>,
    {
        self.optional(field, type_name)?
            .map(|v| cast::<T>(&v).map_err(|e| e.in_field(field, self.owner)))
            .transpose()
    }

    fn required_as<T>(&self, field: &str, type_name: &str) -> Result<T>
    where
        T: TryFrom<Value, Error = ConversionError>,
    {
        let value = self.required(field, type_name)?;
        cast::<T>(&value).map_err(|e| e.in_field(field, self.owner))
    }
}

/// Builds the table side of a record, skipping absent fields.
struct RecordWriter<'a, 'r> {
    ctx: &'a Context<'r>,
    table: Table,
    owner: &'static str,
}

impl<'a, 'r> RecordWriter<'a, 'r> {
    fn new(ctx: &'a Context<'r>, owner: &'static str) -> Self {
        Self {
            ctx,
            table: Table::new(),
            owner,
        }
    }

    fn field(&self, field: &str, type_name: &str, value: Value) -> Result<()> {
        let pushed = self
            .ctx
            .push(type_name, value)
            .map_err(|e| e.in_field(field, self.owner))?;
        self.table.set(field, pushed);
        Ok(())
    }

    fn optional(&self, field: &str, type_name: &str, value: Option<Value>) -> Result<()> {
        match value {
            Some(v) => self.field(field, type_name, v),
            None => Ok(()),
        }
    }

    fn finish(self) -> Dynamic {
        Dynamic::Table(self.table)
    }
}

const HTTP_OPTIONS_FIELDS: &[&str] = &[
    "URL",
    "Method",
    "RequestFormat",
    "ResponseFormat",
    "Headers",
    "Cookies",
    "Body",
];

fn pull_http_options(ctx: &Context<'_>, value: &Dynamic) -> Result<Value> {
    let record = Record::open(ctx, value, HttpOptions::TYPE_NAME, HTTP_OPTIONS_FIELDS)?;
    let guard = ctx.guard();
    if let Dynamic::Table(table) = value {
        guard.visit(table.id(), HttpOptions::TYPE_NAME)?;
    }
    let _depth = ctx.descend()?;

    let selector = FormatSelector::TYPE_NAME;
    Ok(Value::HttpOptions(HttpOptions {
        url: record.required_as("URL", "string")?,
        method: record
            .optional_as("Method", "string")?
            .unwrap_or_else(|| "GET".to_string()),
        request_format: record.optional_as("RequestFormat", selector)?,
        response_format: record.optional_as("ResponseFormat", selector)?,
        headers: record
            .optional_as("Headers", HttpHeaders::TYPE_NAME)?
            .unwrap_or_default(),
        cookies: record.optional_as("Cookies", Cookies::TYPE_NAME)?,
        body: record.optional("Body", VARIANT)?.map(Box::new),
    }))
}

fn push_http_options(ctx: &Context<'_>, value: Value) -> Result<Dynamic> {
    let options = cast::<HttpOptions>(&value)?;
    let _guard = ctx.guard();
    let _depth = ctx.descend()?;

    let out = RecordWriter::new(ctx, HttpOptions::TYPE_NAME);
    out.field("URL", "string", options.url.into())?;
    out.field("Method", "string", options.method.into())?;
    let selector = FormatSelector::TYPE_NAME;
    out.optional("RequestFormat", selector, options.request_format.map(Value::FormatSelector))?;
    out.optional("ResponseFormat", selector, options.response_format.map(Value::FormatSelector))?;
    if !options.headers.is_empty() {
        out.field("Headers", HttpHeaders::TYPE_NAME, Value::HttpHeaders(options.headers))?;
    }
    out.optional("Cookies", Cookies::TYPE_NAME, options.cookies.map(Value::Cookies))?;
    out.optional("Body", VARIANT, options.body.map(|b| *b))?;
    Ok(out.finish())
}

fn http_options() -> Reflector {
    Reflector::new(HttpOptions::TYPE_NAME)
        .push(push_http_options)
        .pull(pull_http_options)
        .set(set_exact)
        .with_dump(|| {
            let selector = || TypeRef::named(FormatSelector::TYPE_NAME);
            TypeSchema::new(HttpOptions::TYPE_NAME)
                .category("Http")
                .underlying(TypeRef::structure([
                    FieldSchema::new("URL", TypeRef::String),
                    FieldSchema::new("Method", TypeRef::optional(TypeRef::String)),
                    FieldSchema::new("RequestFormat", TypeRef::optional(selector())),
                    FieldSchema::new("ResponseFormat", TypeRef::optional(selector())),
                    FieldSchema::new(
                        "Headers",
                        TypeRef::optional(TypeRef::named(HttpHeaders::TYPE_NAME)),
                    ),
                    FieldSchema::new(
                        "Cookies",
                        TypeRef::optional(TypeRef::named(Cookies::TYPE_NAME)),
                    ),
                    FieldSchema::new("Body", TypeRef::Any),
                ]))
                .summary("Options for an HTTP request. Method defaults to GET.")
        })
}

inventory::submit!(Registration(http_options));

const HTTP_RESPONSE_FIELDS: &[&str] = &[
    "Success",
    "StatusCode",
    "StatusMessage",
    "Headers",
    "Cookies",
    "Body",
];

fn pull_http_response(ctx: &Context<'_>, value: &Dynamic) -> Result<Value> {
    let record = Record::open(ctx, value, HttpResponse::TYPE_NAME, HTTP_RESPONSE_FIELDS)?;
    let guard = ctx.guard();
    if let Dynamic::Table(table) = value {
        guard.visit(table.id(), HttpResponse::TYPE_NAME)?;
    }
    let _depth = ctx.descend()?;

    Ok(Value::HttpResponse(HttpResponse {
        success: record.required_as("Success", "bool")?,
        status_code: record.required_as("StatusCode", "int")?,
        status_message: record
            .optional_as("StatusMessage", "string")?
            .unwrap_or_default(),
        headers: record
            .optional_as("Headers", HttpHeaders::TYPE_NAME)?
            .unwrap_or_default(),
        cookies: record
            .optional_as("Cookies", Cookies::TYPE_NAME)?
            .unwrap_or_default(),
        body: record.optional("Body", VARIANT)?.map(Box::new),
    }))
}

fn push_http_response(ctx: &Context<'_>, value: Value) -> Result<Dynamic> {
    let response = cast::<HttpResponse>(&value)?;
    let _guard = ctx.guard();
    let _depth = ctx.descend()?;

    let out = RecordWriter::new(ctx, HttpResponse::TYPE_NAME);
    out.field("Success", "bool", response.success.into())?;
    out.field("StatusCode", "int", response.status_code.into())?;
    out.field("StatusMessage", "string", response.status_message.into())?;
    out.field("Headers", HttpHeaders::TYPE_NAME, Value::HttpHeaders(response.headers))?;
    out.field("Cookies", Cookies::TYPE_NAME, Value::Cookies(response.cookies))?;
    out.optional("Body", VARIANT, response.body.map(|b| *b))?;
    Ok(out.finish())
}

fn http_response() -> Reflector {
    Reflector::new(HttpResponse::TYPE_NAME)
        .push(push_http_response)
        .pull(pull_http_response)
        .set(set_exact)
        .with_dump(|| {
            TypeSchema::new(HttpResponse::TYPE_NAME)
                .category("Http")
                .underlying(TypeRef::structure([
                    FieldSchema::new("Success", TypeRef::Bool),
                    FieldSchema::new("StatusCode", TypeRef::Number),
                    FieldSchema::new("StatusMessage", TypeRef::String),
                    FieldSchema::new("Headers", TypeRef::named(HttpHeaders::TYPE_NAME)),
                    FieldSchema::new("Cookies", TypeRef::named(Cookies::TYPE_NAME)),
                    FieldSchema::new("Body", TypeRef::Any),
                ]))
                .summary("Outcome of an HTTP request.")
        })
}

inventory::submit!(Registration(http_response));

#[cfg(test)]
mod tests {
    use super::*;
    use typebridge_types::Dictionary;

    #[test]
    fn test_headers_single_and_multiple() {
        let ctx = Context::global();
        let mut headers = HttpHeaders::new();
        headers.append("Accept", "text/plain");
        headers.append("Set-Cookie", "a=1");
        headers.append("Set-Cookie", "b=2");

        let pushed = ctx
            .push("HttpHeaders", Value::HttpHeaders(headers.clone()))
            .unwrap();
        let table = pushed.as_table().unwrap();
        assert_eq!(table.get("Accept").as_str(), Some("text/plain"));
        assert_eq!(table.get("Set-Cookie").as_table().map(Table::len), Some(2));

        assert_eq!(
            ctx.pull("HttpHeaders", &pushed).unwrap(),
            Value::HttpHeaders(headers)
        );
    }

    #[test]
    fn test_headers_empty_list_roundtrip() {
        let ctx = Context::global();
        let mut headers = HttpHeaders::new();
        headers.append("Accept", "text/plain");
        headers.0.insert("X-Empty".to_string(), Vec::new());

        let pushed = ctx
            .push("HttpHeaders", Value::HttpHeaders(headers.clone()))
            .unwrap();
        let table = pushed.as_table().unwrap();
        assert_eq!(table.get("X-Empty").as_table().map(Table::len), Some(0));

        let Value::HttpHeaders(back) = ctx.pull("HttpHeaders", &pushed).unwrap() else {
            panic!("expected HttpHeaders")
        };
        assert_eq!(back.get("X-Empty"), Some(&[][..]));
        assert_eq!(back, headers);
    }

    #[test]
    fn test_header_breadcrumb() {
        let ctx = Context::global();
        let list = Table::from_seq(vec![Dynamic::from("a"), Dynamic::Number(2.0)]);
        let table = Table::from_fields([("X-Ids", Dynamic::Table(list))]);
        let err = ctx.pull("HttpHeaders", &Dynamic::Table(table)).unwrap_err();
        assert_eq!(err.to_string(), "key X-Ids: index 2: expected string, got number");
    }

    #[test]
    fn test_cookie_members() {
        let ctx = Context::global();
        let cookie = ctx
            .construct("Cookie", "new", &[Dynamic::from("session"), Dynamic::from("abc")])
            .unwrap()
            .remove(0);
        assert!(ctx.get_property(&cookie, "Domain").unwrap().is_nil());
        ctx.set_property(&cookie, "Domain", &Dynamic::from("example.com"))
            .unwrap();
        assert_eq!(
            ctx.get_property(&cookie, "Domain").unwrap().as_str(),
            Some("example.com")
        );
        ctx.set_property(&cookie, "Domain", &Dynamic::Nil).unwrap();
        assert!(ctx.get_property(&cookie, "Domain").unwrap().is_nil());
        assert_eq!(ctx.tostring(&cookie).unwrap(), "session=abc");
    }

    #[test]
    fn test_options_defaults() {
        let ctx = Context::global();
        let table = Table::from_fields([("URL", Dynamic::from("https://example.com"))]);
        let value = ctx.pull("HttpOptions", &Dynamic::Table(table)).unwrap();
        assert_eq!(value, Value::HttpOptions(HttpOptions::get("https://example.com")));
    }

    #[test]
    fn test_options_field_errors() {
        let ctx = Context::global();
        let missing = Table::from_fields([("Method", Dynamic::from("POST"))]);
        assert_eq!(
            ctx.pull("HttpOptions", &Dynamic::Table(missing))
                .unwrap_err()
                .to_string(),
            "field URL for HttpOptions: expected string, got nil"
        );

        let bad_format = Table::from_fields([
            ("URL", Dynamic::from("https://example.com")),
            ("ResponseFormat", Dynamic::from("yaml")),
        ]);
        assert_eq!(
            ctx.pull("HttpOptions", &Dynamic::Table(bad_format))
                .unwrap_err()
                .to_string(),
            "field ResponseFormat for HttpOptions: unknown format \"yaml\""
        );

        let unknown = Table::from_fields([
            ("URL", Dynamic::from("https://example.com")),
            ("Timeout", Dynamic::Number(5.0)),
        ]);
        assert!(matches!(
            ctx.pull("HttpOptions", &Dynamic::Table(unknown)),
            Err(ReflectError::UnknownMember { .. })
        ));
    }

    #[test]
    fn test_options_roundtrip() {
        let ctx = Context::global();
        let body = Dictionary::new();
        body.insert("id", Value::Double(7.0));
        let mut options = HttpOptions::get("https://example.com/items");
        options.method = "POST".into();
        options.request_format = Some(FormatSelector::new("json"));
        options.headers.append("Accept", "application/json");
        options.cookies = Some(Cookies(vec![Cookie::new("session", "abc")]));
        options.body = Some(Box::new(Value::Dictionary(body)));

        let pushed = ctx
            .push("HttpOptions", Value::HttpOptions(options.clone()))
            .unwrap();
        let Value::HttpOptions(back) = ctx.pull("HttpOptions", &pushed).unwrap() else {
            panic!("expected HttpOptions");
        };
        assert_eq!(back.url, options.url);
        assert_eq!(back.method, "POST");
        assert_eq!(back.request_format, options.request_format);
        assert_eq!(back.headers, options.headers);
        assert_eq!(back.cookies, options.cookies);
        let Some(Value::Dictionary(body)) = back.body.map(|b| *b) else {
            panic!("expected a dictionary body");
        };
        assert_eq!(body.get("id"), Some(Value::Double(7.0)));
    }

    #[test]
    fn test_response_roundtrip() {
        let ctx = Context::global();
        let response = HttpResponse {
            success: true,
            status_code: 200,
            status_message: "OK".into(),
            headers: HttpHeaders::new(),
            cookies: Cookies::default(),
            body: Some(Box::new(Value::String("hello".into()))),
        };
        let pushed = ctx
            .push("HttpResponse", Value::HttpResponse(response.clone()))
            .unwrap();
        assert_eq!(
            pushed.as_table().unwrap().get("StatusCode").as_number(),
            Some(200.0)
        );
        assert_eq!(
            ctx.pull("HttpResponse", &pushed).unwrap(),
            Value::HttpResponse(response)
        );
    }
}
