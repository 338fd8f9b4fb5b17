//! C# source front end: builds a [`SymbolGraph`] from `.cs` files.
//!
//! Parsing is syntactic (tree-sitter). Names are resolved against the
//! declarations of every added file, `using` directives, and a table of
//! well-known framework types, which is enough for controller discovery
//! without a compiler.

pub mod literal;
pub mod resolve;
pub mod syntax;

use crate::symbols::SymbolGraph;
use anyhow::Result;
use std::path::Path;
use syntax::RawFile;
use tracing::{debug, warn};
use tree_sitter::Parser;

pub struct CSharpFrontend {
    parser: Parser,
    files: Vec<RawFile>,
}

impl CSharpFrontend {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_c_sharp::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self {
            parser,
            files: Vec::new(),
        })
    }

    /// Parses one compilation unit. `label` only shows up in logs.
    pub fn add_source(&mut self, label: &str, source: &str) -> Result<()> {
        let tree = match self.parser.parse(source, None) {
            Some(tree) => tree,
            None => {
                warn!(file = label, "parser produced no tree; skipping");
                return Ok(());
            }
        };
        let root = tree.root_node();
        if root.has_error() {
            warn!(file = label, "syntax errors; declarations may be incomplete");
        }
        let file = syntax::collect_file(root, source, label);
        debug!(file = label, types = file.types.len(), "collected declarations");
        self.files.push(file);
        Ok(())
    }

    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let source = crate::util::read_to_string(path)?;
        self.add_source(&path.display().to_string(), &source)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn build(&self) -> SymbolGraph {
        resolve::Resolver::new(&self.files).build()
    }
}

/// Symbol graph for a single source text.
pub fn graph_from_source(source: &str) -> Result<SymbolGraph> {
    let mut frontend = CSharpFrontend::new()?;
    frontend.add_source("source.cs", source)?;
    Ok(frontend.build())
}
