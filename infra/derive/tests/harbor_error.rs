#[test]
fn harbor_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/harbor_error_pass.rs");
}
