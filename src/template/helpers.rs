// ABOUTME: Handlebars helper functions available inside templates
// ABOUTME: Custom helpers (exists, parseUrl, isTrue, isFalse, loop) plus string, list, math and date helpers

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone, Utc};
use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, Output, RenderContext, RenderError,
    ScopedJson,
};
use serde_json::Value as JsonValue;
use std::env;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Upper bound on the number of items a single `loop` call may produce
pub const MAX_LOOP_ITEMS: usize = 1_000_000;

type ValueFn = fn(&[&JsonValue]) -> std::result::Result<JsonValue, String>;

/// Adapts a plain function over parameter values into a helper that returns
/// a value, so it works both as `{{name ...}}` and as a subexpression.
#[derive(Clone, Copy)]
pub struct ValueHelper(ValueFn);

impl HelperDef for ValueHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'reg, 'rc>, RenderError> {
        let params: Vec<&JsonValue> = h.params().iter().map(|p| p.value()).collect();
        (self.0)(&params)
            .map(ScopedJson::Derived)
            .map_err(|message| RenderError::new(format!("{}: {}", h.name(), message)))
    }
}

/// `exists path` - true when the path exists; relative paths resolve against the base path
pub struct ExistsHelper {
    base_path: PathBuf,
}

impl ExistsHelper {
    pub fn new(base_path: &Path) -> Self {
        Self {
            base_path: base_path.to_path_buf(),
        }
    }
}

impl HelperDef for ExistsHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'reg, 'rc>, RenderError> {
        let path = h
            .param(0)
            .and_then(|v| v.value().as_str())
            .ok_or_else(|| RenderError::new("exists helper requires a path parameter"))?;

        let path = Path::new(path);
        let exists = if path.is_absolute() {
            path.exists()
        } else {
            self.base_path.join(path).exists()
        };
        Ok(ScopedJson::Derived(JsonValue::Bool(exists)))
    }
}

/// Finite, restartable integer sequence from `start` towards `stop` (exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    start: i64,
    stop: i64,
    step: i64,
}

impl IntRange {
    pub fn new(start: i64, stop: i64, step: i64) -> std::result::Result<Self, String> {
        if step == 0 {
            return Err("step must not be zero".to_string());
        }
        Ok(Self { start, stop, step })
    }

    fn len(&self) -> usize {
        let (start, stop, step) = (self.start as i128, self.stop as i128, self.step as i128);
        let span = if step > 0 { stop - start } else { start - stop };
        if span <= 0 {
            0
        } else {
            let count = (span - 1) / step.abs() + 1;
            usize::try_from(count).unwrap_or(usize::MAX)
        }
    }

    pub fn iter(&self) -> IntRangeIter {
        IntRangeIter {
            next: Some(self.start),
            stop: self.stop,
            step: self.step,
        }
    }
}

impl IntoIterator for IntRange {
    type Item = i64;
    type IntoIter = IntRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct IntRangeIter {
    next: Option<i64>,
    stop: i64,
    step: i64,
}

impl Iterator for IntRangeIter {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let current = self.next?;
        let in_range = if self.step > 0 {
            current < self.stop
        } else {
            current > self.stop
        };
        if !in_range {
            self.next = None;
            return None;
        }
        self.next = current.checked_add(self.step);
        Some(current)
    }
}

/// Loose boolean coercion shared by `isTrue` and `isFalse`
pub fn loose_bool(value: &JsonValue) -> Option<bool> {
    match value {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
            "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn is_empty_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
    }
}

/// String form of a value without JSON quoting for strings
fn plain_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

handlebars_helper!(upper_helper: |s: str| s.to_uppercase());
handlebars_helper!(lower_helper: |s: str| s.to_lowercase());
handlebars_helper!(title_helper: |s: str| title_case(s));
handlebars_helper!(trim_helper: |s: str| s.trim().to_string());
handlebars_helper!(trim_prefix_helper: |prefix: str, s: str| {
    s.strip_prefix(prefix).unwrap_or(s).to_string()
});
handlebars_helper!(trim_suffix_helper: |suffix: str, s: str| {
    s.strip_suffix(suffix).unwrap_or(s).to_string()
});
handlebars_helper!(replace_helper: |old: str, new: str, s: str| s.replace(old, new));
handlebars_helper!(contains_helper: |needle: str, s: str| s.contains(needle));
handlebars_helper!(has_prefix_helper: |prefix: str, s: str| s.starts_with(prefix));
handlebars_helper!(has_suffix_helper: |suffix: str, s: str| s.ends_with(suffix));
handlebars_helper!(split_helper: |sep: str, s: str| {
    s.split(sep).map(JsonValue::from).collect::<Vec<_>>()
});
handlebars_helper!(join_helper: |sep: str, items: array| {
    items.iter().map(plain_string).collect::<Vec<_>>().join(sep)
});
handlebars_helper!(quote_helper: |v: Json| format!("\"{}\"", plain_string(v)));
handlebars_helper!(squote_helper: |v: Json| format!("'{}'", plain_string(v)));
handlebars_helper!(repeat_helper: |count: u64, s: str| s.repeat(count as usize));
handlebars_helper!(default_helper: |fallback: Json, value: Json| {
    if is_empty_value(value) { fallback.clone() } else { value.clone() }
});
handlebars_helper!(to_json_helper: |v: Json| v.to_string());
handlebars_helper!(is_true_helper: |v: Json| loose_bool(v) == Some(true));
handlebars_helper!(is_false_helper: |v: Json| loose_bool(v) == Some(false));

fn as_integer(value: &JsonValue) -> std::result::Result<i64, String> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("expected an integer, got {}", n)),
        JsonValue::String(s) => s
            .trim()
            .parse()
            .map_err(|_| format!("expected an integer, got {:?}", s)),
        other => Err(format!("expected an integer, got {}", other)),
    }
}

fn as_number(value: &JsonValue) -> std::result::Result<f64, String> {
    match value {
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("expected a number, got {}", n)),
        JsonValue::String(s) => s
            .trim()
            .parse()
            .map_err(|_| format!("expected a number, got {:?}", s)),
        other => Err(format!("expected a number, got {}", other)),
    }
}

/// Integral results stay integers so `{{add 1 2}}` renders `3`, not `3.0`
fn number_value(f: f64) -> JsonValue {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        JsonValue::from(f as i64)
    } else {
        serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

fn numbers(params: &[&JsonValue]) -> std::result::Result<Vec<f64>, String> {
    params.iter().map(|v| as_number(v)).collect()
}

fn exactly_two(params: &[&JsonValue]) -> std::result::Result<(f64, f64), String> {
    match params {
        [a, b] => Ok((as_number(a)?, as_number(b)?)),
        _ => Err(format!("expected 2 parameters, got {}", params.len())),
    }
}

fn add_values(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    Ok(number_value(numbers(params)?.iter().sum()))
}

fn sub_values(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    let (a, b) = exactly_two(params)?;
    Ok(number_value(a - b))
}

fn mul_values(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    Ok(number_value(numbers(params)?.iter().product()))
}

fn div_values(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    let (a, b) = exactly_two(params)?;
    if b == 0.0 {
        return Err("division by zero".to_string());
    }
    Ok(number_value(a / b))
}

fn mod_values(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    let (a, b) = exactly_two(params)?;
    if b == 0.0 {
        return Err("division by zero".to_string());
    }
    Ok(number_value(a % b))
}

fn max_values(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    numbers(params)?
        .into_iter()
        .reduce(f64::max)
        .map(number_value)
        .ok_or_else(|| "expected at least one parameter".to_string())
}

fn min_values(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    numbers(params)?
        .into_iter()
        .reduce(f64::min)
        .map(number_value)
        .ok_or_else(|| "expected at least one parameter".to_string())
}

fn coalesce_values(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    Ok(params
        .iter()
        .find(|v| !is_empty_value(v))
        .map(|v| (*v).clone())
        .unwrap_or(JsonValue::Null))
}

fn first_value(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    match params.first() {
        Some(JsonValue::Array(items)) => Ok(items.first().cloned().unwrap_or(JsonValue::Null)),
        _ => Err("expected a list parameter".to_string()),
    }
}

fn last_value(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    match params.first() {
        Some(JsonValue::Array(items)) => Ok(items.last().cloned().unwrap_or(JsonValue::Null)),
        _ => Err("expected a list parameter".to_string()),
    }
}

fn to_yaml_value(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    let value = params
        .first()
        .ok_or_else(|| "expected a value parameter".to_string())?;
    serde_yaml::to_string(value)
        .map(JsonValue::String)
        .map_err(|e| e.to_string())
}

fn b64dec_value(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    let input = params
        .first()
        .and_then(|v| v.as_str())
        .ok_or_else(|| "expected a string parameter".to_string())?;
    let bytes = BASE64
        .decode(input)
        .map_err(|e| format!("Base64 decode error: {}", e))?;
    String::from_utf8(bytes)
        .map(JsonValue::String)
        .map_err(|e| format!("UTF-8 decode error: {}", e))
}

/// `loop to`, `loop from to` or `loop from to step`
fn loop_values(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    let ints = params
        .iter()
        .map(|v| as_integer(v))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let range = match ints.as_slice() {
        [stop] => IntRange::new(0, *stop, 1)?,
        [start, stop] => IntRange::new(*start, *stop, 1)?,
        [start, stop, step] => IntRange::new(*start, *stop, *step)?,
        _ => return Err(format!("expected 1 to 3 parameters, got {}", ints.len())),
    };

    if range.len() > MAX_LOOP_ITEMS {
        return Err(format!(
            "range of {} items exceeds the limit of {}",
            range.len(),
            MAX_LOOP_ITEMS
        ));
    }

    Ok(JsonValue::Array(range.iter().map(JsonValue::from).collect()))
}

/// Split a URL into its components
pub fn url_components(raw: &str) -> std::result::Result<JsonValue, String> {
    let url = url::Url::parse(raw).map_err(|e| format!("unable to parse {:?}: {}", raw, e))?;

    let hostname = url.host_str().unwrap_or("").to_string();
    let host = match url.port() {
        Some(port) => format!("{}:{}", hostname, port),
        None => hostname.clone(),
    };
    let opaque = if url.cannot_be_a_base() {
        url.path().to_string()
    } else {
        String::new()
    };

    Ok(serde_json::json!({
        "scheme": url.scheme(),
        "username": url.username(),
        "password": url.password(),
        "host": host,
        "hostname": hostname,
        "port": url.port(),
        "path": url.path(),
        "query": url.query().unwrap_or(""),
        "fragment": url.fragment().unwrap_or(""),
        "opaque": opaque,
    }))
}

fn parse_url_value(params: &[&JsonValue]) -> std::result::Result<JsonValue, String> {
    let raw = params
        .first()
        .and_then(|v| v.as_str())
        .ok_or_else(|| "expected a URL string parameter".to_string())?;
    url_components(raw)
}

/// UUID helper - generates a new UUID v4
pub fn uuid_helper(
    _h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    out.write(&Uuid::new_v4().to_string())?;
    Ok(())
}

/// Now helper - current time in RFC 3339
pub fn now_helper(
    _h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    out.write(&Utc::now().to_rfc3339())?;
    Ok(())
}

/// Timestamp helper - formats current time with optional format string
pub fn timestamp_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let format = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .unwrap_or("%Y-%m-%d %H:%M:%S");

    let items = strftime_items(format)?;
    out.write(&Utc::now().format_with_items(items.iter()).to_string())?;
    Ok(())
}

/// Parse a strftime format up front so an unknown specifier is a render error
fn strftime_items(format: &str) -> std::result::Result<Vec<Item<'_>>, RenderError> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(RenderError::new(format!("Invalid time format: {}", format)));
    }
    Ok(items)
}

/// Format time helper - formats an RFC 3339 or unix timestamp
pub fn format_time_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let timestamp = h
        .param(0)
        .map(|v| plain_string(v.value()))
        .ok_or_else(|| RenderError::new("formatTime helper requires timestamp parameter"))?;

    let format = h
        .param(1)
        .and_then(|v| v.value().as_str())
        .unwrap_or("%Y-%m-%d %H:%M:%S");

    let datetime: DateTime<Utc> = match DateTime::parse_from_rfc3339(&timestamp) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(_) => timestamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .ok_or_else(|| {
                RenderError::new(format!("Failed to parse timestamp: {}", timestamp))
            })?,
    };

    let items = strftime_items(format)?;
    out.write(&datetime.format_with_items(items.iter()).to_string())?;
    Ok(())
}

/// Environment variable helper - `getenv "NAME" "fallback"`
pub fn getenv_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let var_name = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("getenv helper requires variable name parameter"))?;

    let default_value = h.param(1).and_then(|v| v.value().as_str()).unwrap_or("");

    let value = env::var(var_name).unwrap_or_else(|_| default_value.to_string());
    out.write(&value)?;
    Ok(())
}

/// Base64 encode helper
pub fn b64enc_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let input = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("b64enc helper requires input parameter"))?;

    out.write(&BASE64.encode(input.as_bytes()))?;
    Ok(())
}

/// Register the full function table with a Handlebars instance
pub fn register_helpers(handlebars: &mut Handlebars, base_path: &Path) {
    // Custom set
    handlebars.register_helper("exists", Box::new(ExistsHelper::new(base_path)));
    handlebars.register_helper("parseUrl", Box::new(ValueHelper(parse_url_value)));
    handlebars.register_helper("isTrue", Box::new(is_true_helper));
    handlebars.register_helper("isFalse", Box::new(is_false_helper));
    handlebars.register_helper("loop", Box::new(ValueHelper(loop_values)));

    // Strings
    handlebars.register_helper("upper", Box::new(upper_helper));
    handlebars.register_helper("lower", Box::new(lower_helper));
    handlebars.register_helper("title", Box::new(title_helper));
    handlebars.register_helper("trim", Box::new(trim_helper));
    handlebars.register_helper("trimPrefix", Box::new(trim_prefix_helper));
    handlebars.register_helper("trimSuffix", Box::new(trim_suffix_helper));
    handlebars.register_helper("replace", Box::new(replace_helper));
    handlebars.register_helper("contains", Box::new(contains_helper));
    handlebars.register_helper("hasPrefix", Box::new(has_prefix_helper));
    handlebars.register_helper("hasSuffix", Box::new(has_suffix_helper));
    handlebars.register_helper("quote", Box::new(quote_helper));
    handlebars.register_helper("squote", Box::new(squote_helper));
    handlebars.register_helper("repeat", Box::new(repeat_helper));
    handlebars.register_helper("b64enc", Box::new(b64enc_helper));
    handlebars.register_helper("b64dec", Box::new(ValueHelper(b64dec_value)));

    // Lists and values
    handlebars.register_helper("split", Box::new(split_helper));
    handlebars.register_helper("join", Box::new(join_helper));
    handlebars.register_helper("first", Box::new(ValueHelper(first_value)));
    handlebars.register_helper("last", Box::new(ValueHelper(last_value)));
    handlebars.register_helper("default", Box::new(default_helper));
    handlebars.register_helper("coalesce", Box::new(ValueHelper(coalesce_values)));
    handlebars.register_helper("toJson", Box::new(to_json_helper));
    handlebars.register_helper("toYaml", Box::new(ValueHelper(to_yaml_value)));

    // Math
    handlebars.register_helper("add", Box::new(ValueHelper(add_values)));
    handlebars.register_helper("sub", Box::new(ValueHelper(sub_values)));
    handlebars.register_helper("mul", Box::new(ValueHelper(mul_values)));
    handlebars.register_helper("div", Box::new(ValueHelper(div_values)));
    handlebars.register_helper("mod", Box::new(ValueHelper(mod_values)));
    handlebars.register_helper("max", Box::new(ValueHelper(max_values)));
    handlebars.register_helper("min", Box::new(ValueHelper(min_values)));

    // Dates and environment
    handlebars.register_helper("now", Box::new(now_helper));
    handlebars.register_helper("timestamp", Box::new(timestamp_helper));
    handlebars.register_helper("formatTime", Box::new(format_time_helper));
    handlebars.register_helper("uuid", Box::new(uuid_helper));
    handlebars.register_helper("getenv", Box::new(getenv_helper));
}
