//! Generic value trees decoded from management API responses.
//!
//! The GlassFish management REST API answers every call with a small XML
//! dialect rather than JSON: a `map` element holds `entry` elements, and
//! each entry carries its value either inline (`key`/`value` attributes)
//! or as a single nested `map`, `list`, `number` or `string` child. The
//! element names are the wire contract; the server is not under our
//! control.

use std::collections::BTreeMap;

use minidom::Element;
use thiserror::Error;

/// Errors raised while decoding a management response document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The document is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] minidom::Error),

    /// An element name outside the `map`/`entry`/`list`/`number`/`string`
    /// vocabulary.
    #[error("unexpected element <{0}> in management response")]
    UnexpectedElement(String),

    /// An `entry` element without a `key` attribute.
    #[error("entry element is missing its key attribute")]
    MissingKey,

    /// A `number` leaf whose text is not a numeric literal.
    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),
}

/// A decoded management API value.
///
/// Mirrors the response vocabulary: string and number leaves, ordered
/// lists, and string-keyed maps.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Decode a response document into a value tree.
    ///
    /// An empty document decodes to an empty map: callers probe optional
    /// resources and an absent body is not an error. Anything else must be
    /// well-formed XML rooted in (or containing) a `map` element.
    pub fn from_xml(document: &str) -> Result<Value, DecodeError> {
        let document = document.trim();
        if document.is_empty() {
            return Ok(Value::Map(BTreeMap::new()));
        }

        let root: Element = document.parse()?;
        let map = if root.name() == "map" {
            decode_map(&root)?
        } else {
            let inner = find_map(&root)
                .ok_or_else(|| DecodeError::UnexpectedElement(root.name().to_string()))?;
            decode_map(inner)?
        };
        Ok(Value::Map(map))
    }

    /// Borrow the string content of a string leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the entries of a map value.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the elements of a list value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Look up a key in a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Render a scalar leaf as a string; `None` for lists and maps.
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(n) => Some(n.to_string()),
            Value::List(_) | Value::Map(_) => None,
        }
    }
}

/// Some responses nest the payload map under a wrapper element.
fn find_map(element: &Element) -> Option<&Element> {
    element.children().find_map(|child| {
        if child.name() == "map" {
            Some(child)
        } else {
            find_map(child)
        }
    })
}

fn decode_map(element: &Element) -> Result<BTreeMap<String, Value>, DecodeError> {
    let mut map = BTreeMap::new();
    for entry in element.children() {
        if entry.name() != "entry" {
            return Err(DecodeError::UnexpectedElement(entry.name().to_string()));
        }
        let key = entry.attr("key").ok_or(DecodeError::MissingKey)?.to_string();
        if let Some(inline) = entry.attr("value") {
            map.insert(key, Value::String(inline.to_string()));
            continue;
        }
        // An entry with neither an inline value nor a child encodes a null
        // attribute; the key is simply absent from the decoded map.
        if let Some(child) = entry.children().next() {
            map.insert(key, decode_value(child)?);
        }
    }
    Ok(map)
}

fn decode_value(element: &Element) -> Result<Value, DecodeError> {
    match element.name() {
        "map" => Ok(Value::Map(decode_map(element)?)),
        "list" => Ok(Value::List(decode_list(element)?)),
        "number" => decode_number(&element.text()),
        "string" => Ok(Value::String(element.text())),
        other => Err(DecodeError::UnexpectedElement(other.to_string())),
    }
}

fn decode_list(element: &Element) -> Result<Vec<Value>, DecodeError> {
    element.children().map(decode_value).collect()
}

/// A literal with a decimal point is a float, anything else an integer.
fn decode_number(text: &str) -> Result<Value, DecodeError> {
    let text = text.trim();
    if text.contains('.') {
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| DecodeError::InvalidNumber(text.to_string()))
    } else {
        text.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| DecodeError::InvalidNumber(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_decodes_to_empty_map() {
        let value = Value::from_xml("").unwrap();
        assert_eq!(value, Value::Map(BTreeMap::new()));

        let value = Value::from_xml("   \n ").unwrap();
        assert_eq!(value, Value::Map(BTreeMap::new()));
    }

    #[test]
    fn test_inline_entries() {
        let value = Value::from_xml(
            r#"<map><entry key="exit_code" value="SUCCESS"/><entry key="message" value="done"/></map>"#,
        )
        .unwrap();
        assert_eq!(value.get("exit_code").unwrap().as_str(), Some("SUCCESS"));
        assert_eq!(value.get("message").unwrap().as_str(), Some("done"));
    }

    #[test]
    fn test_number_without_decimal_point_is_integer() {
        let value =
            Value::from_xml(r#"<map><entry key="port"><number>8080</number></entry></map>"#)
                .unwrap();
        assert_eq!(value.get("port"), Some(&Value::Int(8080)));
    }

    #[test]
    fn test_number_with_decimal_point_is_float() {
        let value =
            Value::from_xml(r#"<map><entry key="load"><number>0.75</number></entry></map>"#)
                .unwrap();
        assert_eq!(value.get("load"), Some(&Value::Float(0.75)));
    }

    #[test]
    fn test_nested_map_and_list_round_trip() {
        let document = r#"
            <map>
              <entry key="exit_code" value="SUCCESS"/>
              <entry key="extraProperties">
                <map>
                  <entry key="instanceList">
                    <list>
                      <map>
                        <entry key="name" value="inst1"/>
                        <entry key="status" value="RUNNING"/>
                      </map>
                      <map>
                        <entry key="name" value="inst2"/>
                        <entry key="status" value="NOT_RUNNING"/>
                      </map>
                    </list>
                  </entry>
                  <entry key="weights">
                    <list>
                      <number>1</number>
                      <number>2.5</number>
                      <string>default</string>
                    </list>
                  </entry>
                </map>
              </entry>
            </map>
        "#;

        let mut inst1 = BTreeMap::new();
        inst1.insert("name".to_string(), Value::String("inst1".to_string()));
        inst1.insert("status".to_string(), Value::String("RUNNING".to_string()));
        let mut inst2 = BTreeMap::new();
        inst2.insert("name".to_string(), Value::String("inst2".to_string()));
        inst2.insert("status".to_string(), Value::String("NOT_RUNNING".to_string()));

        let mut extra = BTreeMap::new();
        extra.insert(
            "instanceList".to_string(),
            Value::List(vec![Value::Map(inst1), Value::Map(inst2)]),
        );
        extra.insert(
            "weights".to_string(),
            Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::String("default".to_string()),
            ]),
        );

        let mut expected = BTreeMap::new();
        expected.insert("exit_code".to_string(), Value::String("SUCCESS".to_string()));
        expected.insert("extraProperties".to_string(), Value::Map(extra));

        assert_eq!(Value::from_xml(document).unwrap(), Value::Map(expected));
    }

    #[test]
    fn test_entry_without_value_is_skipped() {
        let value = Value::from_xml(
            r#"<map><entry key="description"/><entry key="name" value="n"/></map>"#,
        )
        .unwrap();
        assert_eq!(value.get("description"), None);
        assert_eq!(value.get("name").unwrap().as_str(), Some("n"));
    }

    #[test]
    fn test_unexpected_element_is_fatal() {
        let err = Value::from_xml(r#"<map><item key="a" value="b"/></map>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedElement(name) if name == "item"));

        let err = Value::from_xml(
            r#"<map><entry key="a"><blob>x</blob></entry></map>"#,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedElement(name) if name == "blob"));
    }

    #[test]
    fn test_malformed_xml_is_fatal() {
        assert!(matches!(
            Value::from_xml("<map><entry key="),
            Err(DecodeError::Xml(_))
        ));
    }

    #[test]
    fn test_invalid_number_is_fatal() {
        let err = Value::from_xml(
            r#"<map><entry key="port"><number>eighty</number></entry></map>"#,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidNumber(_)));
    }

    #[test]
    fn test_scalar_string_projection() {
        assert_eq!(
            Value::String("x".to_string()).scalar_string(),
            Some("x".to_string())
        );
        assert_eq!(Value::Int(42).scalar_string(), Some("42".to_string()));
        assert_eq!(Value::List(vec![]).scalar_string(), None);
    }
}
