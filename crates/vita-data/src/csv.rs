//! CSV ingest (spec §4.13, §6): dialect sniffing, a header heuristic, and
//! the record -> example pipeline. Uses the `csv` crate for RFC 4180
//! tokenizing (quoting, escaping) rather than hand-rolling one, the same
//! call radiate's extension crates make for CSV ingestion elsewhere in
//! the retrieval pack.

use crate::column::Column;
use crate::dataframe::{Dataframe, Problem};
use crate::example::Example;
use std::io::Read;
use vita_core::value::{Value, ValueKind};
use vita_error::{VitaError, VitaResult};

const CANDIDATE_DELIMITERS: [u8; 5] = [b',', b';', b'\t', b':', b'|'];

/// CSV ingest options (spec §6). `delimiter`/`has_header` are sniffed when
/// left `None`.
#[derive(Debug, Clone)]
pub struct CsvParams {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    /// Output column position; `None` disables labeling (unsupervised).
    /// Defaults to the first column, per spec §6.
    pub output_index: Option<usize>,
    pub trim: bool,
}

impl Default for CsvParams {
    fn default() -> Self {
        CsvParams { delimiter: None, has_header: None, output_index: Some(0), trim: true }
    }
}

/// Picks the delimiter whose occurrence count is both highest and most
/// consistent across the first few lines of `sample` -- a line with `n`
/// fields has the true delimiter appear exactly `n - 1` times, so a
/// delimiter with a stable count across lines is a much better candidate
/// than one that merely appears often (e.g. a comma inside a thousand
/// separator within a semicolon-delimited file).
fn sniff_delimiter(sample: &str) -> u8 {
    let lines: Vec<&str> = sample.lines().filter(|l| !l.trim().is_empty()).take(5).collect();
    if lines.is_empty() {
        return b',';
    }

    let mut best = (b',', i64::MIN);
    for &delim in &CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines.iter().map(|l| l.bytes().filter(|&b| b == delim).count()).collect();
        if counts.iter().all(|&c| c == 0) {
            continue;
        }
        let consistent = counts.windows(2).all(|w| w[0] == w[1]);
        let score = counts[0] as i64 + if consistent { 1000 } else { 0 };
        if score > best.1 {
            best = (delim, score);
        }
    }
    best.0
}

fn infer_value(field: &str) -> Value {
    if field.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if field.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(i) = field.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(d) = field.parse::<f64>() {
        return Value::Double(d);
    }
    Value::String(field.to_string())
}

fn widen(a: ValueKind, b: ValueKind) -> ValueKind {
    use ValueKind::*;
    match (a, b) {
        (x, y) if x == y => x,
        (Int, Double) | (Double, Int) => Double,
        (Void, other) | (other, Void) => other,
        _ => String,
    }
}

/// `true` when `header`'s per-field inferred domains diverge from `body`'s,
/// the header heuristic spec §4.13 calls for ("header heuristic").
fn looks_like_header(header: &[String], body: &[String]) -> bool {
    if header.len() != body.len() {
        return false;
    }
    header.iter().zip(body.iter()).any(|(h, b)| {
        let hd = infer_value(h).category();
        let bd = infer_value(b).category();
        hd != bd && matches!(bd, ValueKind::Int | ValueKind::Double) && matches!(hd, ValueKind::String)
    })
}

pub fn read_csv<R: Read>(mut reader: R, params: &CsvParams) -> VitaResult<Dataframe> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw).map_err(VitaError::from)?;

    let delimiter = params.delimiter.unwrap_or_else(|| sniff_delimiter(&raw));

    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(delimiter).has_headers(false).flexible(true).trim(if params.trim {
        csv::Trim::All
    } else {
        csv::Trim::None
    });
    let mut rdr = builder.from_reader(raw.as_bytes());

    let mut records: Vec<csv::StringRecord> = Vec::new();
    for result in rdr.records() {
        match result {
            Ok(r) => records.push(r),
            Err(e) => tracing::warn!(error = %e, "skipping unparsable CSV record"),
        }
    }

    if records.is_empty() {
        return Err(VitaError::MalformedInput { message: "CSV source produced zero rows".into() });
    }

    let has_header = params.has_header.unwrap_or_else(|| {
        if records.len() < 2 {
            false
        } else {
            let first: Vec<String> = records[0].iter().map(str::to_string).collect();
            let second: Vec<String> = records[1].iter().map(str::to_string).collect();
            looks_like_header(&first, &second)
        }
    });

    let (header, body) = if has_header {
        let names: Vec<String> = records[0].iter().map(str::to_string).collect();
        (Some(names), &records[1..])
    } else {
        (None, &records[..])
    };

    let width = body.iter().map(|r| r.len()).max().unwrap_or(0);
    if width == 0 {
        return Err(VitaError::MalformedInput { message: "CSV source has no columns".into() });
    }

    let mut domains = vec![ValueKind::Void; width];
    let mut valid_rows: Vec<&csv::StringRecord> = Vec::with_capacity(body.len());
    for record in body.iter() {
        if record.len() != width {
            tracing::warn!(expected = width, found = record.len(), "skipping row with inconsistent arity");
            continue;
        }
        for (i, field) in record.iter().enumerate() {
            domains[i] = widen(domains[i], infer_value(field).category());
        }
        valid_rows.push(record);
    }

    if valid_rows.is_empty() {
        return Err(VitaError::MalformedInput { message: "no CSV row survived arity validation".into() });
    }

    let output_index = params.output_index;
    let names = header.unwrap_or_else(|| (0..width).map(|i| format!("col{i}")).collect());
    let columns: Vec<Column> = names.iter().zip(domains.iter()).map(|(n, d)| Column::new(n.clone(), *d)).collect();

    let problem = match output_index {
        Some(idx) if domains.get(idx) == Some(&ValueKind::String) => Problem::Classification,
        Some(_) => Problem::Regression,
        None => Problem::Regression,
    };

    let mut dataframe = Dataframe::new(columns, problem);
    dataframe.output_index = output_index;

    for record in valid_rows {
        let mut input = Vec::with_capacity(width.saturating_sub(1));
        let mut output = Value::Void;
        for (i, field) in record.iter().enumerate() {
            let value = infer_value(field);
            if Some(i) == output_index {
                output = value;
            } else {
                input.push(value);
            }
        }

        let output = match (&problem, output_index) {
            (_, None) => Value::Void,
            (Problem::Classification, Some(_)) => {
                let label = match &output {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                if label.is_empty() {
                    Value::Void
                } else {
                    Value::Int(dataframe.classes.encode(&label) as i64)
                }
            }
            (Problem::Regression, Some(_)) => output,
        };

        dataframe.push(Example::new(input, output));
    }

    dataframe.finalize_states();
    Ok(dataframe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_semicolon_delimiter() {
        let sample = "a;b;c\n1;2;3\n4;5;6\n";
        assert_eq!(sniff_delimiter(sample), b';');
    }

    #[test]
    fn header_row_is_detected_by_type_divergence() {
        let csv = "x,y,label\n1.0,2.0,cat\n3.0,4.0,dog\n";
        let df = read_csv(csv.as_bytes(), &CsvParams { output_index: Some(2), ..Default::default() }).unwrap();
        assert_eq!(df.examples.len(), 2);
        assert_eq!(df.columns[0].name, "x");
    }

    #[test]
    fn headerless_numeric_csv_is_not_mistaken_for_a_header() {
        let csv = "1.0,2.0,3\n4.0,5.0,9\n";
        let df = read_csv(csv.as_bytes(), &CsvParams { output_index: Some(2), ..Default::default() }).unwrap();
        assert_eq!(df.examples.len(), 2);
    }

    #[test]
    fn classification_labels_are_encoded_stably() {
        let csv = "label,x\ncat,1\ndog,2\ncat,3\n";
        let df = read_csv(csv.as_bytes(), &CsvParams { output_index: Some(0), ..Default::default() }).unwrap();
        assert_eq!(df.examples[0].label(), df.examples[2].label());
        assert_ne!(df.examples[0].label(), df.examples[1].label());
    }

    #[test]
    fn zero_surviving_rows_is_fatal() {
        let csv = "";
        assert!(read_csv(csv.as_bytes(), &CsvParams::default()).is_err());
    }
}
