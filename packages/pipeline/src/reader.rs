//! Lazy reader over line-delimited `GeoJSON`.

use std::collections::VecDeque;
use std::io::BufRead;

use geojson::{Feature, GeoJson};

/// One item produced by [`FeatureLines`].
#[derive(Debug)]
pub enum FeatureEvent {
    /// A feature read from `line`.
    Feature {
        /// 1-based line number the feature came from.
        line: u64,
        feature: Box<Feature>,
    },
    /// A line that could not be read as a feature or collection.
    Malformed {
        /// 1-based line number.
        line: u64,
        message: String,
    },
}

/// Iterates features from a reader holding one `Feature` or
/// `FeatureCollection` per line.
///
/// Collections are expanded feature by feature. Blank lines are ignored.
/// Malformed lines produce [`FeatureEvent::Malformed`] and iteration
/// carries on with the next line. I/O errors are yielded as `Err` and the
/// caller decides whether to stop.
///
/// The reader is consumed as it goes; to process the input again, open it
/// again.
pub struct FeatureLines<R> {
    reader: R,
    buf: Vec<u8>,
    line: u64,
    pending: VecDeque<(u64, Feature)>,
}

impl<R: BufRead> FeatureLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
            pending: VecDeque::new(),
        }
    }

    /// Number of lines consumed so far, blank lines included.
    #[must_use]
    pub const fn lines_read(&self) -> u64 {
        self.line
    }

    fn parse_line(&mut self, text: &str) -> Option<FeatureEvent> {
        let line = self.line;

        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                return Some(FeatureEvent::Malformed {
                    line,
                    message: format!("invalid JSON: {e}"),
                });
            }
        };

        match GeoJson::from_json_value(value) {
            Ok(GeoJson::Feature(feature)) => Some(FeatureEvent::Feature {
                line,
                feature: Box::new(feature),
            }),
            Ok(GeoJson::FeatureCollection(collection)) => {
                self.pending
                    .extend(collection.features.into_iter().map(|f| (line, f)));
                None
            }
            Ok(GeoJson::Geometry(_)) => Some(FeatureEvent::Malformed {
                line,
                message: "expected a Feature or FeatureCollection, found a bare geometry"
                    .to_string(),
            }),
            Err(e) => Some(FeatureEvent::Malformed {
                line,
                message: format!("invalid GeoJSON: {e}"),
            }),
        }
    }
}

impl<R: BufRead> Iterator for FeatureLines<R> {
    type Item = std::io::Result<FeatureEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((line, feature)) = self.pending.pop_front() {
                return Some(Ok(FeatureEvent::Feature {
                    line,
                    feature: Box::new(feature),
                }));
            }

            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            self.line += 1;

            let text = match std::str::from_utf8(&self.buf) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    return Some(Ok(FeatureEvent::Malformed {
                        line: self.line,
                        message: format!("invalid UTF-8: {e}"),
                    }));
                }
            };
            if text.is_empty() {
                continue;
            }

            if let Some(event) = self.parse_line(&text) {
                return Some(Ok(event));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn events(input: &str) -> Vec<FeatureEvent> {
        FeatureLines::new(Cursor::new(input.to_string()))
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn reads_features_and_reports_malformed_lines() {
        let input = concat!(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{}}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"type":"Point","coordinates":[0,0]}"#,
            "\n",
            r#"{"type":"Feature","geometry":null,"properties":{}}"#,
        );
        let events = events(input);

        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], FeatureEvent::Feature { line: 1, .. }));
        assert!(matches!(events[1], FeatureEvent::Malformed { line: 2, .. }));
        assert!(matches!(events[2], FeatureEvent::Malformed { line: 4, .. }));
        assert!(matches!(events[3], FeatureEvent::Feature { line: 5, .. }));
    }

    #[test]
    fn expands_feature_collections() {
        let input = concat!(
            r#"{"type":"FeatureCollection","features":["#,
            r#"{"type":"Feature","geometry":null,"properties":{"n":1}},"#,
            r#"{"type":"Feature","geometry":null,"properties":{"n":2}}"#,
            "]}\n",
            r#"{"type":"FeatureCollection","features":[]}"#,
            "\n",
            r#"{"type":"Feature","geometry":null,"properties":{"n":3}}"#,
            "\n",
        );
        let mut lines = FeatureLines::new(Cursor::new(input.to_string()));
        let numbers: Vec<(u64, i64)> = (&mut lines)
            .map(|e| match e.unwrap() {
                FeatureEvent::Feature { line, feature } => {
                    (line, feature.property("n").unwrap().as_i64().unwrap())
                }
                FeatureEvent::Malformed { message, .. } => panic!("{message}"),
            })
            .collect();

        assert_eq!(numbers, vec![(1, 1), (1, 2), (3, 3)]);
        assert_eq!(lines.lines_read(), 3);
    }

    #[test]
    fn invalid_utf8_line_is_malformed() {
        let feature =
            br#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{}}"#;
        let mut input = Vec::new();
        input.extend_from_slice(feature);
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(feature);
        input.push(b'\n');

        let events: Vec<_> = FeatureLines::new(Cursor::new(input))
            .map(Result::unwrap)
            .collect();

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], FeatureEvent::Feature { line: 1, .. }));
        assert!(matches!(events[1], FeatureEvent::Malformed { line: 2, .. }));
        assert!(matches!(events[2], FeatureEvent::Feature { line: 3, .. }));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(events("").is_empty());
        assert!(events("\n\n  \n").is_empty());
    }
}
