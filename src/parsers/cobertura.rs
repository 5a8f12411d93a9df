/// Parser for Cobertura XML coverage reports, producing the same document
/// model the converter emits (see [`crate::cobertura`]).
///
/// Lines may appear both under `<method><lines>` and `<class><lines>`; each
/// list is kept as written. Branch data is read from the
/// `condition-coverage` attribute (e.g. `75% (3/4)`); `<conditions>`
/// children are ignored.
use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use regex::Regex;

use super::{Element, OpenTags};
use crate::cobertura::{Class, Condition, Coverage, Line, Method, Package, Rates};
use crate::error::Result;

/// Pre-compiled regex for condition-coverage attributes like "75% (3/4)".
static BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)/(\d+)\)").expect("valid regex"));

/// Parse a Cobertura document from raw bytes.
pub fn parse(input: &[u8]) -> Result<Coverage> {
    let mut xml = super::xml_reader(input);
    let mut buf = Vec::new();
    let mut builder = DocumentBuilder::default();
    let mut tags = OpenTags::new("coverage");

    loop {
        let event = xml.read_event_into(&mut buf);
        let position = xml.buffer_position();
        match event {
            Err(e) => return Err(super::xml_err(e, &xml)),
            Ok(Event::Eof) => {
                tags.finish(&xml)?;
                break;
            }
            Ok(Event::Start(ref e)) => {
                tags.start(e, position)?;
                builder.open(e, position)?;
            }
            Ok(Event::Empty(ref e)) => {
                tags.empty(e, position)?;
                // A self-closing <source/> has no text; don't wait for one.
                if e.name().as_ref() != b"source" {
                    builder.open(e, position)?;
                    builder.close(e.name().as_ref());
                }
            }
            Ok(Event::Text(ref e)) => {
                if builder.in_source {
                    if let Ok(text) = e.unescape() {
                        builder.coverage.sources.push(text.into_owned());
                    }
                    builder.in_source = false;
                }
            }
            Ok(Event::End(ref e)) => {
                tags.end();
                builder.close(e.name().as_ref());
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(builder.coverage)
}

#[derive(Default)]
struct DocumentBuilder {
    coverage: Coverage,
    package: Option<Package>,
    class: Option<Class>,
    method: Option<Method>,
    in_source: bool,
}

impl DocumentBuilder {
    fn open(&mut self, e: &BytesStart, position: usize) -> Result<()> {
        match e.name().as_ref() {
            b"coverage" => {
                let el = Element::new("coverage", e, position);
                // Some generators write fractional or millisecond stamps.
                let stamp: f64 = el.parsed_or("timestamp", 0.0)?;
                self.coverage.timestamp = if stamp > 1e11 {
                    (stamp / 1000.0) as u64
                } else {
                    stamp as u64
                };
                self.coverage.rates = rates(&el)?;
            }
            b"source" => self.in_source = true,
            b"package" => {
                let el = Element::new("package", e, position);
                self.package = Some(Package {
                    name: el.required("name")?,
                    classes: Vec::new(),
                    rates: rates(&el)?,
                });
            }
            b"class" => {
                let el = Element::new("class", e, position);
                self.class = Some(Class {
                    name: el.required("name")?,
                    filename: el.required("filename")?,
                    methods: Vec::new(),
                    lines: Vec::new(),
                    rates: rates(&el)?,
                });
            }
            b"method" => {
                let el = Element::new("method", e, position);
                self.method = Some(Method {
                    name: el.required("name")?,
                    signature: el.optional("signature").unwrap_or_default(),
                    lines: Vec::new(),
                    rates: rates(&el)?,
                });
            }
            b"line" => {
                let line = decode_line(&Element::new("line", e, position))?;
                if let Some(m) = self.method.as_mut() {
                    m.lines.push(line);
                } else if let Some(c) = self.class.as_mut() {
                    c.lines.push(line);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"source" => {
                if self.in_source {
                    // <source></source> carries an empty root.
                    self.coverage.sources.push(String::new());
                }
                self.in_source = false;
            }
            b"method" => {
                if let (Some(m), Some(c)) = (self.method.take(), self.class.as_mut()) {
                    c.methods.push(m);
                }
            }
            b"class" => {
                if let (Some(c), Some(p)) = (self.class.take(), self.package.as_mut()) {
                    p.classes.push(c);
                }
            }
            b"package" => {
                if let Some(p) = self.package.take() {
                    self.coverage.packages.push(p);
                }
            }
            _ => {}
        }
    }
}

fn rates(el: &Element) -> Result<Rates> {
    Ok(Rates {
        line_rate: el.parsed_or("line-rate", 0.0)?,
        branch_rate: el.parsed_or("branch-rate", 0.0)?,
        complexity: el.parsed_or("complexity", 0.0)?,
    })
}

fn decode_line(el: &Element) -> Result<Line> {
    let number = el.parsed("number")?;
    let hits = el.parsed_or("hits", 0)?;
    let is_branch = el.optional("branch").is_some_and(|v| v == "true");

    // A line with no branch instructions carries no condition, so `(0/0)`
    // reads the same as a missing attribute.
    let condition = if is_branch {
        el.optional("condition-coverage")
            .and_then(|text| {
                let caps = BRANCH_RE.captures(&text)?;
                Some(Condition {
                    covered: caps[1].parse().ok()?,
                    total: caps[2].parse().ok()?,
                })
            })
            .filter(|c| c.total > 0)
    } else {
        None
    };

    Ok(Line {
        number,
        hits,
        condition,
    })
}
