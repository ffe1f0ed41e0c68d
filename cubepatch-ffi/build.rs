// The checked-in `include/cubepatch.h` is the header consumers use. This
// script copies it to $OUT_DIR/cubepatch.h and never rewrites it.
//
// With `cbindgen` on PATH, the ABI is also rendered to
// $OUT_DIR/cubepatch.generated.h and a warning is printed when the exported
// function names drift from the checked-in header. Regenerate by hand after
// an ABI change.

use std::{env, fs, path::PathBuf, process::Command};

fn exported_names(header: &str) -> Vec<&str> {
    let mut names: Vec<&str> = header
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| word.starts_with("cubepatch_"))
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=include/cubepatch.h");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let checked_in = crate_dir.join("include").join("cubepatch.h");

    let header = fs::read_to_string(&checked_in).expect("include/cubepatch.h is part of the crate");
    fs::write(out_dir.join("cubepatch.h"), &header).expect("write cubepatch.h to OUT_DIR");

    let generated = out_dir.join("cubepatch.generated.h");
    let rendered = Command::new("cbindgen")
        .args(["--crate", "cubepatch-ffi", "--lang", "C", "--output"])
        .arg(&generated)
        .current_dir(&crate_dir)
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if !rendered {
        return;
    }

    if let Ok(fresh) = fs::read_to_string(&generated) {
        if exported_names(&fresh) != exported_names(&header) {
            println!(
                "cargo:warning=cubepatch-ffi: include/cubepatch.h is out of date with src/lib.rs (see {})",
                generated.display()
            );
        }
    }
}
