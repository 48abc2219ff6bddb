//! This copies the `memory.x` file from the crate root into
//! a directory where the linker can always find it at build time.
//! The board packages live in a workspace, so the linker would not
//! find it next to the workspace `Cargo.toml`.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn copy_memory_x() {
    // Put `memory.x` in our output directory and ensure it's
    // on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());

    // only rerun when the memory layout changes
    println!("cargo:rerun-if-changed=memory.x");

    // `--nmagic` is required if memory section addresses are not aligned to 0x10000,
    // for example the FLASH and RAM sections in your `memory.x`.
    // See https://github.com/rust-embedded/cortex-m-quickstart/pull/95
    println!("cargo:rustc-link-arg=--nmagic");

    // Set the linker script to the one provided by cortex-m-rt.
    println!("cargo:rustc-link-arg=-Tlink.x");
}

fn main() {
    copy_memory_x();
}
