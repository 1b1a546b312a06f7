#[test]
fn find() {
    trycmd::TestCases::new()
        .case("tests/find/*.toml")
        .env("NRL_ALLOW_STDIN", "true")
        .default_bin_name("nrl");
}

#[test]
fn plot() {
    trycmd::TestCases::new()
        .case("tests/plot/*.toml")
        .env("NRL_ALLOW_STDIN", "true")
        .default_bin_name("nrl");
}
