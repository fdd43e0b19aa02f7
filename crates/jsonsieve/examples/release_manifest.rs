//! Picks the download for one target out of a release manifest without
//! building a document tree.
//!
//! Manifests like the one below grow with every release, and a client only
//! needs one artifact out of them. The example binds the top-level `name`,
//! then opens a nested session per release so that each release's
//! `version`, `yanked` flag and artifact list are decoded into locals that
//! live exactly as long as that release is being read.
//!
//! The target triple can be passed on the command line; an optional second
//! argument names an extra path (in `a.b[0]` form) whose string value is
//! printed as well.
//!
//! ```bash
//! cargo run -p jsonsieve --example release_manifest -- aarch64-apple-darwin meta.channel
//! ```

use jsonsieve::{EACH, Error, Lexer, Nested, Source, parse_path, path};

const MANIFEST: &str = r#"{
    "name": "sieve-cli",
    "meta": {"channel": "stable", "generated": "2026-01-04T10:00:00Z"},
    "releases": [
        {
            "version": "0.9.0",
            "yanked": false,
            "notes": "Initial release.\nLots of text nobody reads here.",
            "artifacts": [
                {"target": "x86_64-unknown-linux-gnu", "sha256": "9f2c", "size": 4011520},
                {"target": "aarch64-apple-darwin", "sha256": "77ab", "size": 3866624}
            ]
        },
        {
            "version": "1.0.0",
            "yanked": true,
            "artifacts": [
                {"target": "x86_64-unknown-linux-gnu", "sha256": "0bad", "size": 4100096}
            ]
        },
        {
            "yanked": false,
            "artifacts": [
                {"size": 4124672, "target": "x86_64-unknown-linux-gnu", "sha256": "c0de"},
                {"target": "aarch64-apple-darwin", "sha256": "f00d", "size": 3971072},
                {"target": "x86_64-pc-windows-msvc", "sha256": "beef", "size": 4587520}
            ],
            "version": "1.1.0"
        }
    ]
}"#;

#[derive(Debug)]
struct Download {
    version: String,
    sha256: String,
    size: u64,
}

/// Reads one release. Returns the artifact for `target`, if the release is
/// not yanked and ships one.
fn read_release<S: Source>(release: &mut Nested<'_, S>, target: &str) -> Result<Option<Download>, Error> {
    let mut version = String::new();
    let mut yanked = false;
    let mut found: Option<(String, u64)> = None;

    let mut session = release.session();
    session.bind_variable(path!["version"], &mut version)?;
    session.bind_variable(path!["yanked"], &mut yanked)?;
    session.bind_callback(path!["artifacts", EACH], |artifact| {
        let mut this_target = String::new();
        let mut sha256 = String::new();
        let mut size = 0u64;
        let mut nested = artifact.session();
        nested.bind_variable(path!["target"], &mut this_target)?;
        nested.bind_variable(path!["sha256"], &mut sha256)?;
        nested.bind_variable(path!["size"], &mut size)?;
        nested.run()?;
        if this_target == target {
            found = Some((sha256, size));
        }
        Ok(())
    })?;
    session.run()?;

    // Field order inside a release is not fixed, so decide only once the
    // whole release has been read.
    Ok(found
        .filter(|_| !yanked)
        .map(|(sha256, size)| Download {
            version,
            sha256,
            size,
        }))
}

fn main() -> Result<(), Error> {
    let mut args = std::env::args().skip(1);
    let target = args
        .next()
        .unwrap_or_else(|| "x86_64-unknown-linux-gnu".to_owned());
    let extra = args.next().map(|p| parse_path(&p)).transpose()?;

    let mut name = String::new();
    let mut extra_value: Option<String> = None;
    let mut latest: Option<Download> = None;

    let mut lexer = Lexer::from_slice(MANIFEST.as_bytes());
    let mut session = lexer.session();
    session.bind_variable(path!["name"], &mut name)?;
    if let Some(extra) = &extra {
        session.bind_variable(extra, &mut extra_value)?;
    }
    session.bind_callback(path!["releases", EACH], |release| {
        if let Some(download) = read_release(release, &target)? {
            latest = Some(download);
        }
        Ok(())
    })?;
    session.run()?;
    lexer.finish()?;

    match latest {
        Some(download) => println!(
            "{name} {}: sha256 {} ({} bytes)",
            download.version, download.sha256, download.size
        ),
        None => println!("{name}: no release for {target}"),
    }
    if let (Some(path), Some(value)) = (extra, extra_value) {
        println!("{}: {value}", jsonsieve::display_path(&path));
    }
    Ok(())
}
