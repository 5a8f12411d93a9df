#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parser and converter must not panic on any input.
    if let Ok(report) = jacocov::parsers::jacoco::parse(data) {
        let coverage = jacocov::convert::convert_root(&report, &[]);
        let _ = jacocov::cobertura::to_string(&coverage);
    }
});
