/*
 * writers/data.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Serialize-mode output: JSON, YAML, and XML.
//!
//! The IR subtree is first lowered to a `serde_json::Value` (insertion
//! order preserved), then emitted by the syntax in effect. Markup and free
//! environments nested inside a serialize environment are rendered to their
//! own strings and spliced in as scalars.

use crate::context::RenderContext;
use crate::error::{Result, WriteError};
use promark_ir::{Child, EnvAttrs, Kind, Node, Presentation, Syntax};
use promark_source_map::IrRange;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer as XmlWriter;
use serde_json::{Map, Value};

/// Render a serialize environment to its output string.
pub fn write_env(node: &Node, ctx: &RenderContext) -> Result<String> {
    let value = children_to_value(&node.children, None, node.meta.ir_range(), ctx)?;
    emit_value(&value, ctx)
}

fn emit_value(value: &Value, ctx: &RenderContext) -> Result<String> {
    match ctx.syntax {
        Syntax::Json => {
            serde_json::to_string_pretty(value).map_err(|e| WriteError::emit(e.to_string()))
        }
        Syntax::Yaml => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .map_err(|e| WriteError::emit(e.to_string())),
        Syntax::Xml => emit_xml("root", value),
        other => Err(WriteError::validation(
            format!("Syntax '{}' is not a serialize format", other.as_str()),
            None,
        )),
    }
}

fn node_to_value(node: &Node, ctx: &RenderContext) -> Result<Value> {
    let range = node.meta.ir_range();
    match &node.kind {
        Kind::Value { value_type, .. } => {
            children_to_value(&node.children, value_type.as_deref(), range, ctx)
        }
        Kind::ObjData { data } => Ok(data.clone()),
        Kind::Env(attrs) => env_value(node, attrs, ctx),
        Kind::Table => table_value(node, ctx),
        Kind::Image(_) | Kind::Audio(_) | Kind::ToolRequest { .. } | Kind::ToolResponse { .. } => {
            Err(WriteError::validation("Invalid presentation", range))
        }
        // Markup content inside a serialize environment becomes a rendered
        // string scalar.
        _ => Ok(Value::String(crate::layout::render_to_string(node, ctx)?)),
    }
}

fn env_value(node: &Node, attrs: &EnvAttrs, ctx: &RenderContext) -> Result<Value> {
    let range = node.meta.ir_range();
    let inner = ctx.enter_env(attrs, &node.meta, range)?;
    match inner.presentation() {
        Presentation::Serialize => {
            if inner.syntax == ctx.syntax {
                children_to_value(&node.children, None, range, &inner)
            } else {
                Ok(Value::String(write_env(node, &inner)?))
            }
        }
        Presentation::Markup => Ok(Value::String(crate::layout::render_to_string(node, ctx)?)),
        Presentation::Free => Ok(Value::String(crate::writers::free::write_env(node, &inner)?)),
        Presentation::Multimedia => Err(WriteError::validation("Invalid presentation", range)),
    }
}

fn is_named(node: &Node) -> bool {
    matches!(&node.kind, Kind::Value { name: Some(_), .. })
}

fn value_name(node: &Node) -> Option<&str> {
    match &node.kind {
        Kind::Value { name, .. } => name.as_deref(),
        _ => None,
    }
}

fn element_value(node: &Node, ctx: &RenderContext) -> Result<Value> {
    match value_name(node) {
        Some(name) => {
            let mut map = Map::new();
            map.insert(name.to_string(), node_to_value(node, ctx)?);
            Ok(Value::Object(map))
        }
        None => node_to_value(node, ctx),
    }
}

/// Lower a child list to a value. Named children form an object, unnamed
/// ones an array, a lone child is spliced directly, and pure text becomes a
/// typed scalar.
pub(crate) fn children_to_value(
    children: &[Child],
    value_type: Option<&str>,
    range: Option<IrRange>,
    ctx: &RenderContext,
) -> Result<Value> {
    let mut text = String::new();
    let mut has_text = false;
    let mut nodes: Vec<&Node> = Vec::new();
    for child in children {
        match child {
            Child::Text(raw) => {
                if !raw.trim().is_empty() {
                    has_text = true;
                }
                text.push_str(raw);
            }
            Child::Node(node) => nodes.push(node),
        }
    }

    if nodes.is_empty() {
        let trimmed = text.trim();
        if trimmed.is_empty() && value_type.is_none() {
            return Ok(Value::Null);
        }
        return typed_scalar(trimmed, value_type, range);
    }

    if has_text {
        // Mixed text and elements keep document order as an array.
        let mut items = Vec::new();
        for child in children {
            match child {
                Child::Text(raw) => {
                    let trimmed = raw.trim();
                    if !trimmed.is_empty() {
                        items.push(typed_scalar(trimmed, None, range)?);
                    }
                }
                Child::Node(node) => items.push(element_value(node, ctx)?),
            }
        }
        return Ok(Value::Array(items));
    }

    if nodes.iter().all(|n| is_named(n)) {
        let mut map = Map::new();
        for node in &nodes {
            let name = value_name(node).unwrap_or_default();
            map.insert(name.to_string(), node_to_value(node, ctx)?);
        }
        return Ok(Value::Object(map));
    }

    if let [only] = nodes.as_slice() {
        return node_to_value(only, ctx);
    }

    let mut items = Vec::new();
    for node in &nodes {
        items.push(element_value(node, ctx)?);
    }
    Ok(Value::Array(items))
}

fn typed_scalar(text: &str, value_type: Option<&str>, range: Option<IrRange>) -> Result<Value> {
    match value_type {
        None => Ok(infer_scalar(text)),
        Some("string") => Ok(Value::String(text.to_string())),
        Some("integer") => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| WriteError::content(format!("Invalid integer value '{text}'"), range)),
        Some("float") => {
            let parsed = text
                .parse::<f64>()
                .map_err(|_| WriteError::content(format!("Invalid float value '{text}'"), range))?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| {
                    WriteError::content(format!("Invalid float value '{text}'"), range)
                })
        }
        Some("boolean") => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(WriteError::content(
                format!("Invalid boolean value '{text}'"),
                range,
            )),
        },
        Some("null") => Ok(Value::Null),
        Some(other) => Err(WriteError::validation(
            format!("Unknown value type '{other}'"),
            range,
        )),
    }
}

/// Untyped scalar inference: literals, then integer, then float, then string.
pub(crate) fn infer_scalar(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = text.parse::<f64>() {
        if f.is_finite() {
            if f.fract() == 0.0 && f.abs() < (i64::MAX as f64) {
                return Value::from(f as i64);
            }
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }
    Value::String(text.to_string())
}

/// A table inside a serialize environment becomes an array of row objects
/// keyed by the header cells.
fn table_value(node: &Node, ctx: &RenderContext) -> Result<Value> {
    let grid = crate::layout::table_grid(node, ctx)?;
    let mut rows = Vec::new();
    for row in &grid.body {
        let mut object = Map::new();
        for (index, key) in grid.header.iter().enumerate() {
            let cell = row.get(index).map(String::as_str).unwrap_or("");
            object.insert(key.clone(), infer_scalar(cell));
        }
        rows.push(Value::Object(object));
    }
    Ok(Value::Array(rows))
}

fn emit_xml(root: &str, value: &Value) -> Result<String> {
    let mut buffer = Vec::new();
    let mut writer = XmlWriter::new_with_indent(&mut buffer, b' ', 2);
    write_event(&mut writer, Event::Start(BytesStart::new(root)))?;
    match value {
        // A root array gets an <item> wrapper per element.
        Value::Array(items) => {
            for item in items {
                write_element(&mut writer, "item", item)?;
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                write_element(&mut writer, key, item)?;
            }
        }
        Value::Null => {}
        scalar => {
            let text = match scalar {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            write_event(&mut writer, Event::Text(BytesText::new(&text)))?;
        }
    }
    write_event(&mut writer, Event::End(BytesEnd::new(root)))?;
    String::from_utf8(buffer).map_err(|e| WriteError::emit(e.to_string()))
}

fn write_element<W: std::io::Write>(
    writer: &mut XmlWriter<W>,
    name: &str,
    value: &Value,
) -> Result<()> {
    match value {
        // Arrays repeat the element name.
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            write_event(writer, Event::Start(BytesStart::new(name)))?;
            for (key, item) in map {
                write_element(writer, key, item)?;
            }
            write_event(writer, Event::End(BytesEnd::new(name)))
        }
        Value::Null => {
            write_event(writer, Event::Start(BytesStart::new(name)))?;
            write_event(writer, Event::End(BytesEnd::new(name)))
        }
        scalar => {
            let text = match scalar {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            write_event(writer, Event::Start(BytesStart::new(name)))?;
            write_event(writer, Event::Text(BytesText::new(&text)))?;
            write_event(writer, Event::End(BytesEnd::new(name)))
        }
    }
}

fn write_event<W: std::io::Write>(writer: &mut XmlWriter<W>, event: Event) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| WriteError::emit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::WriterOptions;
    use promark_ir::build;
    use promark_ir::Syntax;

    fn ctx_for(syntax: Syntax) -> RenderContext {
        let mut ctx = RenderContext::root(WriterOptions::default());
        ctx.syntax = syntax;
        ctx
    }

    #[test]
    fn named_values_form_an_object() {
        let env = build::serialize_env(
            Syntax::Json,
            vec![build::value_named("hello", vec!["world".into()]).into()],
        );
        let out = write_env(&env, &ctx_for(Syntax::Json)).unwrap();
        assert_eq!(out, "{\n  \"hello\": \"world\"\n}");
    }

    #[test]
    fn unnamed_values_form_an_array() {
        let env = build::serialize_env(
            Syntax::Json,
            vec![
                build::value(vec!["1".into()]).into(),
                build::value(vec!["2".into()]).into(),
            ],
        );
        let out = write_env(&env, &ctx_for(Syntax::Json)).unwrap();
        assert_eq!(out, "[\n  1,\n  2\n]");
    }

    #[test]
    fn scalar_inference() {
        assert_eq!(infer_scalar("42"), Value::from(42));
        assert_eq!(infer_scalar("2.0"), Value::from(2));
        assert_eq!(infer_scalar("3.5"), serde_json::json!(3.5));
        assert_eq!(infer_scalar("true"), Value::Bool(true));
        assert_eq!(infer_scalar("null"), Value::Null);
        assert_eq!(infer_scalar("plain"), Value::from("plain"));
    }

    #[test]
    fn explicit_type_overrides_inference() {
        let value = typed_scalar("42", Some("string"), None).unwrap();
        assert_eq!(value, Value::from("42"));
        assert!(typed_scalar("nope", Some("integer"), None).is_err());
        assert!(typed_scalar("maybe", Some("boolean"), None).is_err());
    }

    #[test]
    fn yaml_output_has_no_trailing_newline() {
        let env = build::serialize_env(
            Syntax::Yaml,
            vec![build::value_named("key", vec!["value".into()]).into()],
        );
        let out = write_env(&env, &ctx_for(Syntax::Yaml)).unwrap();
        assert_eq!(out, "key: value");
    }

    #[test]
    fn xml_repeats_array_elements() {
        let out = emit_xml("root", &serde_json::json!({"item": [1, 2]})).unwrap();
        assert_eq!(
            out,
            "<root>\n  <item>1</item>\n  <item>2</item>\n</root>"
        );
    }

    #[test]
    fn multimedia_node_is_rejected() {
        let env = build::serialize_env(
            Syntax::Json,
            vec![build::image("aGk=", None, "image/png").into()],
        );
        let err = write_env(&env, &ctx_for(Syntax::Json)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid presentation");
    }
}
