//! Cobertura document model and its XML serialization.
//!
//! The converter builds this tree in full and [`write`] serializes it in a
//! single pass:
//!
//!   <coverage timestamp="..." line-rate="..." branch-rate="..." complexity="...">
//!     <sources><source>src/main/java</source></sources>
//!     <packages>
//!       <package name="com.example" line-rate="..." ...>
//!         <classes>
//!           <class name="com.example.Foo" filename="com/example/Foo.java" ...>
//!             <methods>
//!               <method name="run" signature="()V" ...>
//!                 <lines><line number="3" hits="1" branch="false"/></lines>
//!               </method>
//!             </methods>
//!             <lines>
//!               <line number="11" hits="1" branch="true" condition-coverage="50% (1/2)">
//!                 <conditions><condition number="0" type="jump" coverage="50%"/></conditions>
//!               </line>
//!             </lines>
//!           </class>
//!         </classes>
//!       </package>
//!     </packages>
//!   </coverage>

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{JacocovError, Result};

const DOCTYPE: &str = r#"coverage SYSTEM "http://cobertura.sourceforge.net/xml/coverage-04.dtd""#;

/// `line-rate`, `branch-rate` and `complexity` of one element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rates {
    pub line_rate: f64,
    pub branch_rate: f64,
    pub complexity: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Coverage {
    /// Seconds since the epoch.
    pub timestamp: u64,
    pub sources: Vec<String>,
    pub packages: Vec<Package>,
    pub rates: Rates,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// Dot-separated package name.
    pub name: String,
    pub classes: Vec<Class>,
    pub rates: Rates,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: String,
    /// Path relative to a source root, e.g. `com/example/Foo.java`.
    pub filename: String,
    pub methods: Vec<Method>,
    pub lines: Vec<Line>,
    pub rates: Rates,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub signature: String,
    pub lines: Vec<Line>,
    pub rates: Rates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub number: u32,
    pub hits: u64,
    /// Present only for lines with branch instructions.
    pub condition: Option<Condition>,
}

/// Branch coverage of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub covered: u32,
    pub total: u32,
}

impl Condition {
    /// Floor of the covered percentage.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (u64::from(self.covered) * 100 / u64::from(self.total)) as u32
    }

    /// The `condition-coverage` attribute, e.g. `75% (3/4)`.
    #[must_use]
    pub fn coverage_text(&self) -> String {
        format!("{}% ({}/{})", self.percent(), self.covered, self.total)
    }
}

/// Format a float the way Python's `str()` does: always with a fractional
/// part (`1.0`, `0.75`).
#[must_use]
pub fn decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Serialize the document, XML declaration and DOCTYPE included.
pub fn write<W: Write>(coverage: &Coverage, out: W) -> Result<()> {
    let mut w = Writer::new_with_indent(out, b' ', 2);
    emit(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(&mut w, Event::DocType(BytesText::from_escaped(DOCTYPE)))?;

    let mut attrs = vec![("timestamp", coverage.timestamp.to_string())];
    attrs.extend(rate_attrs(&coverage.rates));
    open(&mut w, "coverage", &attrs)?;

    open(&mut w, "sources", &[])?;
    for source in &coverage.sources {
        open(&mut w, "source", &[])?;
        emit(&mut w, Event::Text(BytesText::new(source)))?;
        close(&mut w, "source")?;
    }
    close(&mut w, "sources")?;

    open(&mut w, "packages", &[])?;
    for package in &coverage.packages {
        write_package(&mut w, package)?;
    }
    close(&mut w, "packages")?;

    close(&mut w, "coverage")
}

/// Serialize the document to a string, with a trailing newline.
pub fn to_string(coverage: &Coverage) -> Result<String> {
    let mut buf = Vec::new();
    write(coverage, &mut buf)?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| {
        JacocovError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

fn write_package<W: Write>(w: &mut Writer<W>, package: &Package) -> Result<()> {
    let mut attrs = vec![("name", package.name.clone())];
    attrs.extend(rate_attrs(&package.rates));
    open(w, "package", &attrs)?;
    open(w, "classes", &[])?;
    for class in &package.classes {
        write_class(w, class)?;
    }
    close(w, "classes")?;
    close(w, "package")
}

fn write_class<W: Write>(w: &mut Writer<W>, class: &Class) -> Result<()> {
    let mut attrs = vec![
        ("name", class.name.clone()),
        ("filename", class.filename.clone()),
    ];
    attrs.extend(rate_attrs(&class.rates));
    open(w, "class", &attrs)?;

    open(w, "methods", &[])?;
    for method in &class.methods {
        let mut attrs = vec![
            ("name", method.name.clone()),
            ("signature", method.signature.clone()),
        ];
        attrs.extend(rate_attrs(&method.rates));
        open(w, "method", &attrs)?;
        write_lines(w, &method.lines)?;
        close(w, "method")?;
    }
    close(w, "methods")?;

    write_lines(w, &class.lines)?;
    close(w, "class")
}

fn write_lines<W: Write>(w: &mut Writer<W>, lines: &[Line]) -> Result<()> {
    open(w, "lines", &[])?;
    for line in lines {
        let hits = if line.hits > 0 { "1" } else { "0" };
        let mut attrs = vec![
            ("number", line.number.to_string()),
            ("hits", hits.to_string()),
        ];
        match line.condition {
            Some(cond) => {
                attrs.push(("branch", "true".to_string()));
                attrs.push(("condition-coverage", cond.coverage_text()));
                open(w, "line", &attrs)?;
                open(w, "conditions", &[])?;
                empty(
                    w,
                    "condition",
                    &[
                        ("number", "0".to_string()),
                        ("type", "jump".to_string()),
                        ("coverage", format!("{}%", cond.percent())),
                    ],
                )?;
                close(w, "conditions")?;
                close(w, "line")?;
            }
            None => {
                attrs.push(("branch", "false".to_string()));
                empty(w, "line", &attrs)?;
            }
        }
    }
    close(w, "lines")
}

fn rate_attrs(rates: &Rates) -> [(&'static str, String); 3] {
    [
        ("line-rate", decimal(rates.line_rate)),
        ("branch-rate", decimal(rates.branch_rate)),
        ("complexity", decimal(rates.complexity)),
    ]
}

fn element<'a>(tag: &'a str, attrs: &[(&str, String)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(tag);
    for (key, value) in attrs {
        start.push_attribute((*key, value.as_str()));
    }
    start
}

fn open<W: Write>(w: &mut Writer<W>, tag: &str, attrs: &[(&str, String)]) -> Result<()> {
    emit(w, Event::Start(element(tag, attrs)))
}

fn empty<W: Write>(w: &mut Writer<W>, tag: &str, attrs: &[(&str, String)]) -> Result<()> {
    emit(w, Event::Empty(element(tag, attrs)))
}

fn close<W: Write>(w: &mut Writer<W>, tag: &str) -> Result<()> {
    emit(w, Event::End(BytesEnd::new(tag)))
}

fn emit<W: Write>(w: &mut Writer<W>, event: Event) -> Result<()> {
    w.write_event(event).map_err(JacocovError::XmlWrite)
}
