use std::io;
use std::process;

use log::debug;

fn main() {
    env_logger::init();

    if let Err(e) = assembly_build::run(io::stdin().lock(), io::stdout().lock()) {
        debug!("{:?}", e);
        eprintln!("protoc-gen-assembly: {}", e);
        process::exit(1);
    }
}
