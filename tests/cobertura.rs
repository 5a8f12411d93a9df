mod common;

use jacocov::cli::cmd_convert;
use jacocov::parsers::cobertura;

/// One package, one class, one method: every line lands in both lists.
#[test]
fn single_method_lines_in_class_and_method() {
    let xml = common::single_method_report(7);
    let out = cmd_convert(xml.as_bytes(), &["src/main/java".to_string()]).unwrap();

    let coverage = cobertura::parse(out.as_bytes()).unwrap();
    assert_eq!(coverage.timestamp, 1234);
    assert_eq!(coverage.sources, vec!["src/main/java".to_string()]);

    let class = &coverage.packages[0].classes[0];
    assert_eq!(class.name, "org.demo.Only");
    assert_eq!(class.filename, "org/demo/Only.java");
    assert_eq!(class.lines.len(), 7);
    assert_eq!(class.methods.len(), 1);
    assert_eq!(class.methods[0].lines.len(), 7);

    let class_numbers: Vec<u32> = class.lines.iter().map(|l| l.number).collect();
    for line in &class.methods[0].lines {
        assert!(class_numbers.contains(&line.number));
    }

    // 7 class-level + 7 method-level <line> elements.
    assert_eq!(out.matches("<line ").count(), 14);
}

#[test]
fn branch_lines_carry_conditions() {
    let xml = common::single_method_report(3);
    let out = cmd_convert(xml.as_bytes(), &[]).unwrap();

    assert!(out.contains(r#"<line number="3" hits="1" branch="true" condition-coverage="50% (1/2)">"#));
    assert!(out.contains(r#"<condition number="0" type="jump" coverage="50%"/>"#));
    assert!(out.contains(r#"<line number="2" hits="0" branch="false"/>"#));

    let coverage = cobertura::parse(out.as_bytes()).unwrap();
    let line = coverage.packages[0].classes[0].lines[2];
    assert_eq!(line.hits, 1);
    let cond = line.condition.unwrap();
    assert_eq!((cond.covered, cond.total), (1, 2));
}

/// Reading the converted document back yields the converted tree.
#[test]
fn converted_document_reads_back() {
    let fixture = include_bytes!("fixtures/sample_jacoco.xml");
    let report = jacocov::parsers::jacoco::parse(fixture).unwrap();
    let converted = jacocov::convert::convert_root(&report, &["src/main/java".to_string()]);

    let xml = jacocov::cobertura::to_string(&converted).unwrap();
    assert_eq!(cobertura::parse(xml.as_bytes()).unwrap(), converted);
}
