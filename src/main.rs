//! `ngen` command line entry point.

fn main() {
    openapi_ngen::init_tracing();
    std::process::exit(openapi_ngen::run_cli(std::env::args().collect()));
}
