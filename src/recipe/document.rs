//! Line-addressable recipe text with byte-exact round-trip
//!
//! The patcher rewrites individual lines; everything else (comments,
//! ordering, unrelated fields, line terminators, a missing final newline)
//! must survive untouched. Lines are therefore stored raw, terminator
//! included, and targeted replacement swaps only the content in front of
//! the original terminator.

use crate::core::error::{BumpError, BumpResult, RecipeError, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};

/// The two mutually exclusive recipe formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeDialect {
  /// Jinja2-macro meta.yaml (`{% set version = "..." %}`)
  LegacyMacro,
  /// recipe.yaml with a context block and `if:` platform conditionals
  StructuredContext,
}

impl RecipeDialect {
  /// Recipe file name relative to the feedstock root
  pub fn file_name(&self) -> &'static str {
    match self {
      RecipeDialect::LegacyMacro => "recipe/meta.yaml",
      RecipeDialect::StructuredContext => "recipe/recipe.yaml",
    }
  }
}

/// An in-memory recipe file, owned exclusively by one patch operation
#[derive(Debug, Clone)]
pub struct RecipeDocument {
  dialect: RecipeDialect,
  /// Raw lines, terminator included
  lines: Vec<String>,
  path: Option<PathBuf>,
}

impl RecipeDocument {
  /// Locate and load the recipe inside a feedstock checkout.
  ///
  /// recipe.yaml is probed before meta.yaml; exactly one is expected.
  pub fn discover(feedstock_root: &Path) -> BumpResult<Self> {
    for dialect in [RecipeDialect::StructuredContext, RecipeDialect::LegacyMacro] {
      let path = feedstock_root.join(dialect.file_name());
      if path.is_file() {
        return Self::load(&path, dialect);
      }
    }
    Err(BumpError::Recipe(RecipeError::NoDialect {
      feedstock: feedstock_root.to_path_buf(),
    }))
  }

  /// Load a recipe file of a known dialect
  pub fn load(path: &Path, dialect: RecipeDialect) -> BumpResult<Self> {
    let content = fs::read_to_string(path).map_err(|e| {
      BumpError::Recipe(RecipeError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })
    })?;
    let mut doc = Self::from_str(&content, dialect);
    doc.path = Some(path.to_path_buf());
    Ok(doc)
  }

  /// Build a document from in-memory text
  pub fn from_str(content: &str, dialect: RecipeDialect) -> Self {
    Self {
      dialect,
      lines: content.split_inclusive('\n').map(String::from).collect(),
      path: None,
    }
  }

  pub fn dialect(&self) -> RecipeDialect {
    self.dialect
  }

  pub fn len(&self) -> usize {
    self.lines.len()
  }

  #[allow(dead_code)]
  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// Line content without its terminator
  pub fn line(&self, i: usize) -> &str {
    let (content, _) = split_terminator(&self.lines[i]);
    content
  }

  /// Replace the content of line `i`, preserving its original terminator.
  /// `text` must not carry a terminator of its own.
  pub fn replace_line(&mut self, i: usize, text: impl Into<String>) {
    let (_, ending) = split_terminator(&self.lines[i]);
    let mut replaced = text.into();
    replaced.push_str(ending);
    self.lines[i] = replaced;
  }

  /// Serialize back to text. With zero replacements this is byte-identical
  /// to the loaded input.
  pub fn serialize(&self) -> String {
    self.lines.concat()
  }

  /// Write the document back to the file it was loaded from
  pub fn save(&self) -> BumpResult<()> {
    let path = self
      .path
      .as_ref()
      .ok_or_else(|| BumpError::message("Recipe document has no backing file"))?;
    fs::write(path, self.serialize()).with_context(|| format!("Failed to write recipe {}", path.display()))?;
    Ok(())
  }
}

fn split_terminator(raw: &str) -> (&str, &str) {
  if let Some(content) = raw.strip_suffix("\r\n") {
    (content, "\r\n")
  } else if let Some(content) = raw.strip_suffix('\n') {
    (content, "\n")
  } else {
    (raw, "")
  }
}
