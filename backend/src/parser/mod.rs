//! Loader for OECD GDP exports with encoding and delimiter auto-detection.
//!
//! Reads the raw file into typed [`Observation`]s. Only LOCATION, TIME,
//! MEASURE and Value are read; the administrative columns (INDICATOR,
//! SUBJECT, FREQUENCY, Flag Codes) are tolerated and ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::{Measure, Observation};

/// ISO codes and bloc pseudo-codes such as `EU27_2020` or `G-20`.
static COUNTRY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9_-]*$").expect("Valid regex pattern"));

const LOCATION: &str = "LOCATION";
const TIME: &str = "TIME";
const MEASURE: &str = "MEASURE";
const VALUE_COLUMNS: [&str; 2] = ["Value", "VALUE"];

/// One source row as read by the csv deserializer, before typing.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "LOCATION")]
    location: String,
    #[serde(rename = "TIME")]
    time: String,
    #[serde(rename = "MEASURE")]
    measure: String,
    #[serde(rename = "Value", alias = "VALUE")]
    value: String,
}

/// Normalize a country code the way measure codes are normalized.
pub fn normalize_country_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_uppercase();
    COUNTRY_CODE.is_match(&code).then_some(code)
}

/// Result of loading with metadata
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// Typed observations in file order
    pub observations: Vec<Observation>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match String::from_utf8(bytes.to_vec()) {
            Ok(s) => s,
            Err(_) => String::from_utf8_lossy(bytes).to_string(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        other => {
            let encoding = encoding_rs::Encoding::for_label(other.as_bytes())
                .ok_or_else(|| LoadError::Encoding(format!("unsupported encoding '{}'", other)))?;
            encoding.decode(bytes).0.to_string()
        }
    };

    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Check the required headers and return the name used for the value column.
fn value_column(headers: &[String]) -> LoadResult<&'static str> {
    for name in [LOCATION, TIME, MEASURE] {
        if !headers.iter().any(|h| h == name) {
            return Err(LoadError::MissingColumn(name.to_string()));
        }
    }

    VALUE_COLUMNS
        .iter()
        .copied()
        .find(|name| headers.iter().any(|h| h == name))
        .ok_or_else(|| LoadError::MissingColumn(VALUE_COLUMNS[0].to_string()))
}

/// Parse decoded content with an explicit delimiter.
pub fn parse_observations(content: &str, delimiter: char) -> LoadResult<(Vec<Observation>, Vec<String>)> {
    if content.trim().is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let delimiter = u8::try_from(delimiter)
        .map_err(|_| LoadError::Format(format!("delimiter '{}' is not a single byte", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header_record = reader
        .headers()
        .map_err(|e| LoadError::Format(e.to_string()))?
        .clone();
    let headers: Vec<String> = header_record.iter().map(|h| h.to_string()).collect();

    let value_header = value_column(&headers)?;
    let mut observations = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| LoadError::Format(e.to_string()))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let raw: RawRow = record
            .deserialize(Some(&header_record))
            .map_err(|e| LoadError::Format(format!("line {}: {}", line, e)))?;
        observations.push(raw.into_observation(line, value_header)?);
    }

    Ok((observations, headers))
}

impl RawRow {
    fn into_observation(self, line: usize, value_header: &str) -> LoadResult<Observation> {
        let invalid = |column: &str, value: &str, message: &str| LoadError::InvalidField {
            line,
            column: column.to_string(),
            value: value.to_string(),
            message: message.to_string(),
        };

        let country_code = normalize_country_code(&self.location)
            .ok_or_else(|| invalid(LOCATION, &self.location, "not a country code"))?;

        let year: i32 = self
            .time
            .parse()
            .map_err(|_| invalid(TIME, &self.time, "not a year"))?;

        let measure = Measure::from_code(&self.measure)
            .ok_or_else(|| invalid(MEASURE, &self.measure, "unknown measure"))?;

        let value: f64 = self
            .value
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| invalid(value_header, &self.value, "not a number"))?;

        Ok(Observation::new(country_code, year, measure, value))
    }
}

/// Load a file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let loaded = load_file_auto("GDP Hist.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", loaded.encoding, loaded.delimiter);
/// println!("Observations: {}", loaded.observations.len());
/// ```
pub fn load_file_auto<P: AsRef<Path>>(path: P) -> LoadResult<LoadedData> {
    let bytes = std::fs::read(path.as_ref())?;
    load_bytes_auto(&bytes)
}

/// Load bytes with auto-detection of encoding and delimiter.
pub fn load_bytes_auto(bytes: &[u8]) -> LoadResult<LoadedData> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let (observations, headers) = parse_observations(&content, delimiter)?;

    Ok(LoadedData {
        observations,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
\"LOCATION\",\"INDICATOR\",\"SUBJECT\",\"MEASURE\",\"FREQUENCY\",\"TIME\",\"Value\",\"Flag Codes\"
\"IRL\",\"GDP\",\"TOT\",\"MLN_USD\",\"A\",\"1970\",4312.5,
\"IRL\",\"GDP\",\"TOT\",\"USD_CAP\",\"A\",\"1970\",1451.2,
\"OECD\",\"GDP\",\"TOT\",\"MLN_USD\",\"A\",\"1970\",3194852.1,E
";

    #[test]
    fn test_parse_sample() {
        let (rows, headers) = parse_observations(SAMPLE, ',').unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(headers.len(), 8);
        assert_eq!(rows[0], Observation::new("IRL", 1970, Measure::LevelsMillionsUsd, 4312.5));
        assert_eq!(rows[1].measure, Measure::PerCapita);
        assert_eq!(rows[2].country_code, "OECD");
    }

    #[test]
    fn test_uppercase_value_column() {
        let csv = "LOCATION;TIME;MEASURE;VALUE\nUSA;2019;MLN_USD;21433224.7";
        let (rows, _) = parse_observations(csv, ';').unwrap();
        assert_eq!(rows[0].value, 21433224.7);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = "LOCATION,TIME,MEASURE,Value\nIRL,1970,MLN_USD,1\n\nIRL,1971,MLN_USD,2\n";
        let (rows, _) = parse_observations(csv, ',').unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_missing_column() {
        let csv = "LOCATION,TIME,Value\nIRL,1970,1";
        let err = parse_observations(csv, ',').unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "MEASURE"));
    }

    #[test]
    fn test_unknown_measure_reports_line() {
        let csv = "LOCATION,TIME,MEASURE,Value\nIRL,1970,MLN_USD,1\nIRL,1970,PC_GDP,2";
        let err = parse_observations(csv, ',').unwrap_err();
        match err {
            LoadError::InvalidField { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "MEASURE");
                assert_eq!(value, "PC_GDP");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_value() {
        let csv = "LOCATION,TIME,MEASURE,Value\nIRL,1970,MLN_USD,n/a";
        let err = parse_observations(csv, ',').unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_invalid_country_code() {
        let csv = "LOCATION,TIME,MEASURE,Value\nIRL!,1970,MLN_USD,1";
        let err = parse_observations(csv, ',').unwrap_err();
        assert!(matches!(err, LoadError::InvalidField { ref column, .. } if column == "LOCATION"));
    }

    #[test]
    fn test_bloc_codes_with_hyphen_accepted() {
        let csv = "LOCATION,TIME,MEASURE,Value\nG-20,2019,MLN_USD,80000000\nEU27_2020,2019,MLN_USD,15000000";
        let (rows, _) = parse_observations(csv, ',').unwrap();
        assert_eq!(rows[0].country_code, "G-20");
        assert_eq!(rows[1].country_code, "EU27_2020");
    }

    #[test]
    fn test_codes_normalized_like_measures() {
        let csv = "LOCATION,TIME,MEASURE,Value\nirl,1970,mln_usd,1";
        let (rows, _) = parse_observations(csv, ',').unwrap();
        assert_eq!(rows[0], Observation::new("IRL", 1970, Measure::LevelsMillionsUsd, 1.0));

        assert_eq!(normalize_country_code(" g-20 "), Some("G-20".to_string()));
        assert_eq!(normalize_country_code("-IRL"), None);
        assert_eq!(normalize_country_code(""), None);
    }

    #[test]
    fn test_short_row_reports_line() {
        let csv = "LOCATION,TIME,MEASURE,Value\nIRL,1970,MLN_USD,1\nIRL,1971";
        let err = parse_observations(csv, ',').unwrap_err();
        assert!(matches!(err, LoadError::Format(ref msg) if msg.starts_with("line 3")));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_observations("", ','), Err(LoadError::EmptyFile)));
        assert!(matches!(load_bytes_auto(b""), Err(LoadError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"LOCATION,TIME,MEASURE,Value\nIRL,1970,MLN_USD,1");
        let loaded = load_bytes_auto(&bytes).unwrap();
        assert_eq!(loaded.headers[0], "LOCATION");
        assert_eq!(loaded.observations.len(), 1);
    }

    #[test]
    fn test_load_file_auto() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let loaded = load_file_auto(file.path()).unwrap();
        assert_eq!(loaded.delimiter, ',');
        assert_eq!(loaded.encoding, "utf-8");
        assert_eq!(loaded.observations.len(), 3);
    }
}
