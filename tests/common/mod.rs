//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use bibtex_context::Settings;
use tempfile::TempDir;

/// A throwaway site directory with a `content/download` folder.
pub struct Site {
    pub dir: TempDir,
}

impl Site {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("content").join("download")).unwrap();
        Self { dir }
    }

    pub fn content_path(&self) -> PathBuf {
        self.dir.path().join("content")
    }

    /// Writes a bibliography file into the content directory and returns its path.
    pub fn write_bib(&self, name: &str, content: &str) -> PathBuf {
        let path = self.content_path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Places a downloadable file under `content/download`.
    pub fn add_download(&self, name: &str) {
        fs::write(self.content_path().join("download").join(name), b"%PDF-1.4").unwrap();
    }

    /// Settings with no sources, pointing at this site's content directory.
    pub fn settings(&self) -> Settings {
        Settings {
            content_path: self.content_path(),
            ..Settings::default()
        }
    }
}

/// Three entries in non-alphabetical file order, each with a `file` field.
pub const PUBLICATIONS_BIB: &str = r#"
@article{zhang2020,
    author = {Zhang, Wei and Miller, Sam},
    title = {Urban {NO2} and {CO2} Fluxes Over a Decade},
    journal = {Atmospheric Environment},
    volume = {220},
    pages = {117--129},
    year = {2020},
    doi = {10.1016/j.atmosenv.2020.117129},
    file = {zhang2020.pdf:zhang2020.pdf:application/pdf}
}

@inproceedings{adams2018,
    author = {Adams, Ada},
    title = {Sensor Networks for Air Quality},
    booktitle = {Proceedings of the Sensing Conference},
    year = {2018},
    url = {https://example.org/adams2018},
    file = {missing.pdf:missing.pdf:application/pdf},
    slides = {https://example.org/adams2018-slides.pdf}
}

@misc{baker2019,
    author = {Baker, Bea},
    title = {Open Data Notes},
    howpublished = {Online},
    year = {2019},
    file = {baker.pdf:baker.pdf:application/pdf}
}
"#;
