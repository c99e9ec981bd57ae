//! `ferry` binary entrypoint.

use std::process;

fn main() {
    process::exit(ferry_cli::run());
}
