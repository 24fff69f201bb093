// Path: crates/cli/src/commands/mod.rs

pub mod cat;
pub mod extract;
pub mod find;
pub mod info;
pub mod ls;

#[cfg(test)]
pub(crate) mod fixture {
    use ggpk_test_utils::{dir, file, ArchiveBuilder};
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Writes a small archive into a fresh temp dir.
    pub fn archive() -> (TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Content.ggpk");
        ArchiveBuilder::new(vec![
            dir(
                "Metadata",
                vec![
                    file("AbstractRing.ot", b"ring".to_vec()),
                    dir("Sub", vec![]),
                ],
            ),
            file("README.txt", b"hello world".to_vec()),
        ])
        .with_free(&[32])
        .build()
        .unwrap()
        .write_to(&path)
        .unwrap();
        (tmp, path)
    }
}
