use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

// Fingerprints static/ so stylesheet links can be cache-busted.
fn main() {
    println!("cargo:rerun-if-changed=static/");

    let mut files: Vec<PathBuf> = fs::read_dir("static")
        .expect("static/ directory is missing")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let mut hasher = DefaultHasher::new();
    for path in files {
        path.file_name().hash(&mut hasher);
        fs::read(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
            .hash(&mut hasher);
    }

    println!("cargo:rustc-env=STATIC_HASH={:08x}", hasher.finish() as u32);
}
