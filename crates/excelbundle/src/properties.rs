//! Java-style `.properties` output.
//!
//! Each block becomes one file next to its siblings in the bundle tree:
//! `/app/messages` in `fr` is written to `<out>/app/messages_fr.properties`.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::pack::{LanguagePack, ResourceBlock};

/// Character encoding of the generated files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// ASCII only; everything else as `\uXXXX` escapes (readable by every
    /// `Properties.load` implementation)
    #[default]
    AsciiEscaped,
    /// UTF-8, non-ASCII characters written as is
    Utf8,
}

/// How blocks are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub encoding: Encoding,
    /// Write keys without a value as `key=` instead of leaving them out
    pub keep_empty: bool,
    /// Comment written on the first line
    pub header: Option<String>,
}

/// Errors that can occur while writing resource files.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bundle path '{0}' does not name a file")]
    InvalidBundlePath(String),
}

/// File location of a block, relative to the output directory.
pub fn bundle_file_path(bundle_path: &str, language: &str) -> Result<PathBuf, WriteError> {
    let normalized = bundle_path.replace('\\', "/");
    let components: Vec<&str> = normalized
        .split('/')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    let invalid = components.is_empty()
        || components.iter().any(|c| *c == "." || *c == "..")
        || language.contains(['/', '\\']);
    let Some((file_stem, dirs)) = components.split_last().filter(|_| !invalid) else {
        return Err(WriteError::InvalidBundlePath(bundle_path.to_string()));
    };

    let mut path: PathBuf = dirs.iter().collect();
    path.push(format!("{file_stem}_{language}.properties"));
    Ok(path)
}

/// Render a block as `.properties` text.
pub fn render_block(block: &ResourceBlock, options: &WriteOptions) -> String {
    let mut out = String::new();

    if let Some(header) = &options.header {
        for line in header.lines() {
            out.push_str("# ");
            escape_into(&mut out, line, Escape::Comment, options.encoding);
            out.push('\n');
        }
    }

    for (key, value) in block.iter() {
        let value = match value {
            Some(value) => value,
            None if options.keep_empty => "",
            None => continue,
        };
        escape_into(&mut out, key, Escape::Key, options.encoding);
        out.push('=');
        escape_into(&mut out, value, Escape::Value, options.encoding);
        out.push('\n');
    }

    out
}

/// Write one block under `out_dir` and return the file path.
pub fn write_block(
    block: &ResourceBlock,
    out_dir: &Path,
    options: &WriteOptions,
) -> Result<PathBuf, WriteError> {
    let path = out_dir.join(bundle_file_path(block.bundle_path(), block.language())?);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| WriteError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&path, render_block(block, options)).map_err(|source| WriteError::Io {
        path: path.clone(),
        source,
    })?;

    log::debug!("wrote {} pair(s) to {}", block.len(), path.display());
    Ok(path)
}

/// Write every block of `pack` and return the written paths in block order.
///
/// Blocks sharing a bundle path map to the same file; the later one wins.
pub fn write_language_pack(
    pack: &LanguagePack,
    out_dir: &Path,
    options: &WriteOptions,
) -> Result<Vec<PathBuf>, WriteError> {
    let mut written = Vec::with_capacity(pack.len());
    let mut seen = HashSet::new();

    for block in pack {
        let path = write_block(block, out_dir, options)?;
        if !seen.insert(path.clone()) {
            log::warn!(
                "bundle '{}' appears more than once for '{}'; {} was overwritten",
                block.bundle_path(),
                pack.language(),
                path.display()
            );
        }
        written.push(path);
    }

    log::info!(
        "language '{}': wrote {} file(s) to {}",
        pack.language(),
        written.len(),
        out_dir.display()
    );
    Ok(written)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Escape {
    Key,
    Value,
    Comment,
}

fn escape_into(out: &mut String, text: &str, mode: Escape, encoding: Encoding) {
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' if mode != Escape::Comment => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{0C}' => out.push_str("\\f"),
            ' ' if mode == Escape::Key || (mode == Escape::Value && i == 0) => {
                out.push_str("\\ ")
            }
            '=' | ':' | '#' | '!' if mode == Escape::Key => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ if encoding == Encoding::Utf8 => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // Writing to a String cannot fail
                    let _ = write!(out, "\\u{unit:04X}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::ResourceBlockBuilder;
    use pretty_assertions::assert_eq;

    fn block(path: &str, pairs: &[(&str, Option<&str>)]) -> ResourceBlock {
        pairs
            .iter()
            .fold(ResourceBlockBuilder::new(path, "fr"), |b, (k, v)| {
                b.with_pair(*k, *v)
            })
            .finish()
            .unwrap()
    }

    #[test]
    fn test_bundle_file_path() {
        assert_eq!(
            bundle_file_path("/app/messages", "en").unwrap(),
            Path::new("app").join("messages_en.properties")
        );
        assert_eq!(
            bundle_file_path("\\res\\ui\\labels", "pt_BR").unwrap(),
            Path::new("res").join("ui").join("labels_pt_BR.properties")
        );
        assert_eq!(
            bundle_file_path("/top", "de").unwrap(),
            PathBuf::from("top_de.properties")
        );
    }

    #[test]
    fn test_invalid_bundle_paths() {
        for path in ["/", "\\", "/ /", "/app/../etc", "/./x"] {
            assert!(
                matches!(
                    bundle_file_path(path, "en"),
                    Err(WriteError::InvalidBundlePath(_))
                ),
                "{path} should be rejected"
            );
        }
        assert!(bundle_file_path("/app", "../en").is_err());
    }

    #[test]
    fn test_render_escapes() {
        let b = block(
            "/a",
            &[
                ("key with space", Some(" leading and trailing ")),
                ("a=b:c#d!e", Some("x=y:z")),
                ("path", Some("C:\\temp\\new")),
                ("multi", Some("one\ntwo\tthree")),
            ],
        );

        assert_eq!(
            render_block(&b, &WriteOptions::default()),
            "key\\ with\\ space=\\ leading and trailing \n\
             a\\=b\\:c\\#d\\!e=x=y:z\n\
             path=C:\\\\temp\\\\new\n\
             multi=one\\ntwo\\tthree\n"
        );
    }

    #[test]
    fn test_render_non_ascii() {
        let b = block("/a", &[("greeting", Some("Grüß 😀"))]);

        assert_eq!(
            render_block(&b, &WriteOptions::default()),
            "greeting=Gr\\u00FC\\u00DF \\uD83D\\uDE00\n"
        );

        assert_eq!(Encoding::default(), Encoding::AsciiEscaped);
        let latin1_only = block("/a", &[("city", Some("Zürich"))]);
        assert_eq!(
            render_block(&latin1_only, &WriteOptions::default()),
            "city=Z\\u00FCrich\n"
        );

        let utf8 = WriteOptions {
            encoding: Encoding::Utf8,
            ..WriteOptions::default()
        };
        assert_eq!(render_block(&b, &utf8), "greeting=Grüß 😀\n");
    }

    #[test]
    fn test_render_absent_values_and_header() {
        let b = block("/a", &[("set", Some("1")), ("unset", None)]);

        assert_eq!(render_block(&b, &WriteOptions::default()), "set=1\n");

        let options = WriteOptions {
            keep_empty: true,
            header: Some("Generated from Strings.xls".into()),
            ..WriteOptions::default()
        };
        assert_eq!(
            render_block(&b, &options),
            "# Generated from Strings.xls\nset=1\nunset=\n"
        );
    }

    #[test]
    fn test_write_language_pack() {
        let dir = tempfile::tempdir().unwrap();
        let pack = LanguagePack::from_blocks(
            "fr".into(),
            vec![
                block("/app/messages", &[("hello", Some("Bonjour"))]),
                block("/app/errors", &[("oops", Some("Zut"))]),
                block("/app/messages", &[("hello", Some("Salut"))]),
            ],
        )
        .unwrap();

        let written = write_language_pack(&pack, dir.path(), &WriteOptions::default()).unwrap();

        let messages = dir.path().join("app").join("messages_fr.properties");
        let errors = dir.path().join("app").join("errors_fr.properties");
        assert_eq!(written, vec![messages.clone(), errors.clone(), messages.clone()]);
        assert_eq!(fs::read_to_string(&messages).unwrap(), "hello=Salut\n");
        assert_eq!(fs::read_to_string(&errors).unwrap(), "oops=Zut\n");
    }

    #[test]
    fn test_write_into_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("app");
        fs::write(&blocker, "not a directory").unwrap();

        let err = write_block(
            &block("/app/messages", &[("k", Some("v"))]),
            dir.path(),
            &WriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }), "got {err:?}");
    }
}
