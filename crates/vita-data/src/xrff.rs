//! XRFF ingest (spec §6): `dataset > header > attributes > attribute*` plus
//! `dataset > body > instances > instance > value*`, in declared attribute
//! order. No crate in the retrieval pack reads XML, so `quick-xml`'s serde
//! integration is used here instead of hand-rolling a parser -- a real,
//! actively maintained crate doing the same job the `csv` crate does for
//! CSV, per `DESIGN.md`.

use crate::column::Column;
use crate::dataframe::{Dataframe, Problem};
use crate::example::Example;
use serde::Deserialize;
use std::io::Read;
use vita_core::value::{Value, ValueKind};
use vita_error::{VitaError, VitaResult};

#[derive(Debug, Deserialize)]
struct XrffDataset {
    header: XrffHeader,
    body: XrffBody,
}

#[derive(Debug, Deserialize)]
struct XrffHeader {
    attributes: XrffAttributes,
}

#[derive(Debug, Deserialize)]
struct XrffAttributes {
    #[serde(rename = "attribute", default)]
    attribute: Vec<XrffAttribute>,
}

#[derive(Debug, Deserialize)]
struct XrffAttribute {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@type")]
    kind: String,
    #[serde(rename = "@class", default)]
    class: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XrffBody {
    instances: XrffInstances,
}

#[derive(Debug, Deserialize)]
struct XrffInstances {
    #[serde(rename = "instance", default)]
    instance: Vec<XrffInstance>,
}

#[derive(Debug, Deserialize)]
struct XrffInstance {
    #[serde(rename = "value", default)]
    value: Vec<String>,
}

fn domain_of(kind: &str) -> VitaResult<ValueKind> {
    match kind {
        "numeric" => Ok(ValueKind::Double),
        "integer" => Ok(ValueKind::Int),
        "nominal" | "string" => Ok(ValueKind::String),
        "boolean" => Ok(ValueKind::Bool),
        other => Err(VitaError::MalformedInput { message: format!("unknown XRFF attribute type '{other}'").into() }),
    }
}

pub fn read_xrff<R: Read>(mut reader: R) -> VitaResult<Dataframe> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw).map_err(VitaError::from)?;

    let parsed: XrffDataset =
        quick_xml::de::from_str(&raw).map_err(|e| VitaError::MalformedInput { message: format!("XRFF parse error: {e}").into() })?;

    let attributes = parsed.header.attributes.attribute;
    if attributes.is_empty() {
        return Err(VitaError::MalformedInput { message: "XRFF header declares no attributes".into() });
    }

    let class_count = attributes.iter().filter(|a| a.class.as_deref() == Some("yes")).count();
    if class_count > 1 {
        return Err(VitaError::MalformedInput { message: "XRFF declares more than one class attribute".into() });
    }

    let mut columns = Vec::with_capacity(attributes.len());
    let mut output_index = None;
    for (i, attr) in attributes.iter().enumerate() {
        let domain = match domain_of(&attr.kind) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(attribute = %attr.name, error = %e, "skipping attribute with unrecognized type");
                continue;
            }
        };
        if attr.class.as_deref() == Some("yes") {
            output_index = Some(columns.len());
        }
        columns.push((i, Column::new(attr.name.clone(), domain)));
    }

    if columns.is_empty() {
        return Err(VitaError::MalformedInput { message: "no recognizable XRFF attribute survived ingest".into() });
    }

    let problem = match output_index {
        Some(idx) if columns[idx].1.domain == ValueKind::String => Problem::Classification,
        _ => Problem::Regression,
    };

    let mut dataframe = Dataframe::new(columns.iter().map(|(_, c)| c.clone()).collect(), problem);
    dataframe.output_index = output_index;

    for instance in parsed.body.instances.instance {
        if instance.value.len() != attributes.len() {
            tracing::warn!(expected = attributes.len(), found = instance.value.len(), "skipping XRFF instance with wrong arity");
            continue;
        }

        let mut input = Vec::with_capacity(columns.len().saturating_sub(1));
        let mut output = Value::Void;
        for (slot, &(source_idx, _)) in columns.iter().enumerate() {
            let raw_value = &instance.value[source_idx];
            let domain = columns[slot].1.domain;
            let value = match domain {
                ValueKind::Int => raw_value.parse::<i64>().map(Value::Int).unwrap_or(Value::Void),
                ValueKind::Double => raw_value.parse::<f64>().map(Value::Double).unwrap_or(Value::Void),
                ValueKind::Bool => raw_value.parse::<bool>().map(Value::Bool).unwrap_or(Value::Void),
                _ => Value::String(raw_value.clone()),
            };

            if Some(slot) == output_index {
                output = value;
            } else {
                input.push(value);
            }
        }

        let output = match problem {
            Problem::Classification => match output {
                Value::String(label) if !label.is_empty() => Value::Int(dataframe.classes.encode(&label) as i64),
                _ => Value::Void,
            },
            Problem::Regression => output,
        };

        dataframe.push(Example::new(input, output));
    }

    if dataframe.is_empty() {
        return Err(VitaError::MalformedInput { message: "XRFF source produced zero rows".into() });
    }

    dataframe.finalize_states();
    Ok(dataframe)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <dataset>
          <header>
            <attributes>
              <attribute name="x" type="numeric" />
              <attribute name="label" type="nominal" class="yes" />
            </attributes>
          </header>
          <body>
            <instances>
              <instance><value>1.0</value><value>cat</value></instance>
              <instance><value>2.0</value><value>dog</value></instance>
            </instances>
          </body>
        </dataset>
    "#;

    #[test]
    fn reads_classification_instances() {
        let df = read_xrff(SAMPLE.as_bytes()).unwrap();
        assert_eq!(df.len(), 2);
        assert_eq!(df.problem, Problem::Classification);
    }

    #[test]
    fn at_most_one_class_attribute_is_enforced() {
        let bad = SAMPLE.replace(r#"name="x" type="numeric""#, r#"name="x" type="numeric" class="yes""#);
        assert!(read_xrff(bad.as_bytes()).is_err());
    }
}
