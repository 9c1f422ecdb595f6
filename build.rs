// Stages the preview site under `dist/`: the page plus any bundle wasm-pack
// already wrote to `static/pkg`.
use std::fs;
use std::path::Path;

use fs_extra::dir::{copy, CopyOptions};

const SITE: &str = "static";
const STAGE: &str = "dist";

fn main() {
    println!("cargo:rerun-if-changed={SITE}");

    let site = Path::new(SITE);
    if !site.is_dir() {
        return;
    }

    let stage = Path::new(STAGE);
    if stage.is_dir() {
        let _ = fs::remove_dir_all(stage);
    }
    if let Err(err) = fs::create_dir_all(stage) {
        println!("cargo:warning=cannot create {STAGE}/: {err}");
        return;
    }

    let options = CopyOptions::new().content_only(true).overwrite(true);
    if let Err(err) = copy(site, stage, &options) {
        println!("cargo:warning=staging {SITE}/ into {STAGE}/ failed: {err}");
    }
}
