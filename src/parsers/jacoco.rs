/// Parser for JaCoCo XML coverage reports.
///
/// JaCoCo XML structure:
///   <report name="...">
///     <sessioninfo id="..." start="..." dump="..."/>
///     <group name="...">            (optional, multi-module reports)
///       <package name="com/example">
///         <class name="com/example/Foo" sourcefilename="Foo.java">
///           <method name="doStuff" desc="()V" line="10">
///             <counter type="INSTRUCTION" missed="0" covered="5"/>
///             <counter type="BRANCH" missed="1" covered="3"/>
///             <counter type="LINE" missed="0" covered="3"/>
///           </method>
///           <counter type="LINE" missed="1" covered="5"/>
///         </class>
///         <sourcefile name="Foo.java">
///           <line nr="10" mi="0" ci="3" mb="0" cb="2"/>
///           <counter type="LINE" missed="1" covered="5"/>
///         </sourcefile>
///         <counter type="LINE" missed="1" covered="5"/>
///       </package>
///     </group>
///     <counter type="LINE" missed="1" covered="5"/>
///   </report>
///
/// Each element is decoded once into the typed records of [`crate::model`].
/// Packages inside `<group>` elements are flattened into the report's
/// package list in document order; group-level counters are ignored.
use quick_xml::events::{BytesStart, Event};

use super::{Element, OpenTags};
use crate::error::Result;
use crate::model::*;

/// Parse JaCoCo XML coverage data from raw bytes.
pub fn parse(input: &[u8]) -> Result<Report> {
    let mut xml = super::xml_reader(input);
    let mut buf = Vec::new();
    let mut builder = ReportBuilder::default();
    let mut tags = OpenTags::new("report");

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
                builder.open(e, position)?;
                builder.close(e.name().as_ref());
            }
            Ok(Event::End(ref e)) => {
                tags.end();
                builder.close(e.name().as_ref());
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(builder.report)
}

#[derive(Default)]
struct ReportBuilder {
    report: Report,
    group_depth: usize,
    package: Option<Package>,
    class: Option<Class>,
    method: Option<Method>,
    sourcefile: Option<SourceFile>,
}

impl ReportBuilder {
    fn open(&mut self, e: &BytesStart, position: usize) -> Result<()> {
        match e.name().as_ref() {
            b"report" => {
                let el = Element::new("report", e, position);
                self.report.name = el.optional("name");
            }
            b"sessioninfo" => {
                // Only the first session's start time is kept.
                if self.report.session_start_millis.is_none() {
                    let el = Element::new("sessioninfo", e, position);
                    self.report.session_start_millis = Some(el.parsed("start")?);
                }
            }
            b"group" => self.group_depth += 1,
            b"package" => {
                let el = Element::new("package", e, position);
                self.package = Some(Package {
                    name: el.required("name")?,
                    classes: Vec::new(),
                    source_files: Vec::new(),
                    counters: Vec::new(),
                });
            }
            b"class" => {
                let el = Element::new("class", e, position);
                self.class = Some(Class {
                    name: el.required("name")?,
                    methods: Vec::new(),
                    counters: Vec::new(),
                });
            }
            b"method" => {
                let el = Element::new("method", e, position);
                self.method = Some(Method {
                    name: el.required("name")?,
                    signature: el.required("desc")?,
                    start_line: el.parsed_or("line", 0)?,
                    counters: Vec::new(),
                });
            }
            b"sourcefile" => {
                let el = Element::new("sourcefile", e, position);
                self.sourcefile = Some(SourceFile {
                    name: el.required("name")?,
                    lines: Vec::new(),
                    counters: Vec::new(),
                });
            }
            b"line" => {
                let el = Element::new("line", e, position);
                let line = SourceLine {
                    number: el.parsed("nr")?,
                    missed_instructions: el.parsed_or("mi", 0)?,
                    covered_instructions: el.parsed_or("ci", 0)?,
                    missed_branches: el.parsed_or("mb", 0)?,
                    covered_branches: el.parsed_or("cb", 0)?,
                };
                if let Some(file) = self.sourcefile.as_mut() {
                    file.lines.push(line);
                }
            }
            b"counter" => {
                let counter = decode_counter(&Element::new("counter", e, position))?;
                self.attach_counter(counter);
            }
            _ => {}
        }
        Ok(())
    }

    /// Counters belong to the innermost open element that carries them.
    fn attach_counter(&mut self, counter: Counter) {
        let counters = if let Some(method) = self.method.as_mut() {
            &mut method.counters
        } else if let Some(class) = self.class.as_mut() {
            &mut class.counters
        } else if let Some(file) = self.sourcefile.as_mut() {
            &mut file.counters
        } else if let Some(package) = self.package.as_mut() {
            &mut package.counters
        } else if self.group_depth > 0 {
            return;
        } else {
            &mut self.report.counters
        };
        counters.push(counter);
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"group" => self.group_depth = self.group_depth.saturating_sub(1),
            b"method" => {
                if let (Some(method), Some(class)) = (self.method.take(), self.class.as_mut()) {
                    class.methods.push(method);
                }
            }
            b"class" => {
                if let (Some(class), Some(package)) = (self.class.take(), self.package.as_mut()) {
                    package.classes.push(class);
                }
            }
            b"sourcefile" => {
                if let (Some(mut file), Some(package)) =
                    (self.sourcefile.take(), self.package.as_mut())
                {
                    file.lines.sort_by_key(|l| l.number);
                    package.source_files.push(file);
                }
            }
            b"package" => {
                if let Some(package) = self.package.take() {
                    self.report.packages.push(package);
                }
            }
            _ => {}
        }
    }
}

fn decode_counter(el: &Element) -> Result<Counter> {
    let raw = el.required("type")?;
    let kind = raw
        .parse::<CounterType>()
        .map_err(|value| crate::error::JacocovError::InvalidAttribute {
            element: el.name,
            attribute: "type",
            value,
            position: el.position,
        })?;
    Ok(Counter {
        kind,
        missed: el.parsed_or("missed", 0)?,
        covered: el.parsed_or("covered", 0)?,
    })
}
