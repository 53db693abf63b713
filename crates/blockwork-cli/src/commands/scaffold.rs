//! Files written for a new block.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use blockwork_core::{BlockName, MANIFEST_FILE_NAME};

/// What to put in a scaffolded block.
pub(crate) struct BlockTemplate<'a> {
    pub(crate) name: &'a BlockName,
    pub(crate) title: &'a str,
    /// Declare `routes.rs:router` as the template router.
    pub(crate) with_router: bool,
}

impl BlockTemplate<'_> {
    fn manifest(&self) -> String {
        let mut out = format!(
            "[block]\n\
             name = \"{name}\"\n\
             version = \"0.1.0\"\n\
             load_order = 9\n\
             templates_dir = \"templates\"\n\
             statics = \"static\"\n\
             requirements = []\n\
             dependencies = []\n",
            name = self.name
        );
        if self.with_router {
            out.push_str("template_router = \"routes.rs\"\n");
        }
        out
    }

    fn index_html(&self) -> String {
        format!(
            "<!doctype html>\n\
             <html>\n  <head><title>{title}</title></head>\n  \
             <body>\n    <h1>{title}</h1>\n  </body>\n</html>\n",
            title = self.title
        )
    }

    /// Write the block under `blocks_dir`. Fails if the directory exists.
    pub(crate) fn write(&self, blocks_dir: &Path) -> anyhow::Result<PathBuf> {
        let dir = blocks_dir.join(self.name.as_str());
        if dir.exists() {
            bail!("block directory {} already exists", dir.display());
        }
        let templates = dir.join("templates").join(self.name.as_str());
        std::fs::create_dir_all(&templates)
            .with_context(|| format!("failed to create {}", templates.display()))?;
        std::fs::create_dir_all(dir.join("static"))?;
        std::fs::write(dir.join(MANIFEST_FILE_NAME), self.manifest())?;
        std::fs::write(templates.join("index.html"), self.index_html())?;
        Ok(dir)
    }
}
