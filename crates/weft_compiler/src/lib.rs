//! weft_compiler: Multi-file binding.
//!
//! A `Program` holds the syntax trees of one project and binds them all,
//! one binder per tree on the rayon pool. Results are shared through a
//! bind cache, so binding an unchanged program again is free.

use rayon::prelude::*;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;
use weft_binder::{BindCache, BindError, BindResult, Binder};
use weft_core::intern::StringInterner;
use weft_diagnostics::DiagnosticCollection;
use weft_options::{load_project_config, BinderOptions, OptionsError, ProjectConfig};
use weft_syntax::SourceFile;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to bind {file}: {source}")]
    Bind {
        file: String,
        #[source]
        source: BindError,
    },
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error("the bind cache lock was poisoned")]
    CachePoisoned,
}

/// Bind output for one file.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub file_name: String,
    pub result: Arc<BindResult>,
}

/// Bind output for a whole program.
#[derive(Debug)]
pub struct ProgramResult {
    /// One entry per file, in the order the files were added.
    pub files: Vec<FileResult>,
    /// Every file's diagnostics, sorted by file and position.
    pub diagnostics: DiagnosticCollection,
}

impl ProgramResult {
    pub fn file(&self, file_name: &str) -> Option<&BindResult> {
        self.files
            .iter()
            .find(|f| f.file_name == file_name)
            .map(|f| f.result.as_ref())
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// The set of trees that make up one project.
pub struct Program<'t, 'a> {
    pub options: BinderOptions,
    /// Files named by the project configuration, if one was loaded.
    pub root_files: Vec<String>,
    interner: StringInterner,
    files: Vec<&'t SourceFile<'a>>,
    cache: Mutex<BindCache>,
}

impl<'t, 'a> Program<'t, 'a> {
    /// `interner` must be the interner every added tree was built with.
    pub fn new(interner: StringInterner, options: BinderOptions) -> Self {
        Self {
            options,
            root_files: Vec::new(),
            interner,
            files: Vec::new(),
            cache: Mutex::new(BindCache::new()),
        }
    }

    pub fn from_config(interner: StringInterner, config: ProjectConfig) -> Self {
        let mut program = Self::new(interner, config.binder_options);
        program.root_files = config.files;
        program
    }

    /// Load a weft.json file.
    pub fn load(interner: StringInterner, config_path: &str) -> Result<Self, CompileError> {
        let config = load_project_config(config_path)?;
        Ok(Self::from_config(interner, config))
    }

    pub fn add_file(&mut self, tree: &'t SourceFile<'a>) {
        self.files.push(tree);
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Root files from the configuration that no added tree provides.
    pub fn missing_files(&self) -> Vec<&str> {
        self.root_files
            .iter()
            .filter(|name| !self.files.iter().any(|tree| tree.file_name == **name))
            .map(String::as_str)
            .collect()
    }

    pub fn cached_count(&self) -> Result<usize, CompileError> {
        Ok(self.cache.lock().map_err(|_| CompileError::CachePoisoned)?.len())
    }

    /// Bind every file. Files bind in parallel; results and diagnostics come
    /// back in a deterministic order regardless of scheduling.
    pub fn bind_all(&self) -> Result<ProgramResult, CompileError> {
        debug!(files = self.files.len(), "bind program");
        let files = self
            .files
            .par_iter()
            .map(|tree| self.bind_file(tree))
            .collect::<Result<Vec<_>, _>>()?;

        let mut diagnostics = DiagnosticCollection::new();
        for file in &files {
            diagnostics.extend(file.result.diagnostics.clone());
        }
        diagnostics.sort();
        debug!(files = files.len(), diagnostics = diagnostics.len(), "bound program");
        Ok(ProgramResult { files, diagnostics })
    }

    fn bind_file(&self, tree: &SourceFile<'_>) -> Result<FileResult, CompileError> {
        let file_name = tree.file_name.clone();
        if self.options.use_cache {
            let hit = self.cache.lock().map_err(|_| CompileError::CachePoisoned)?.get(tree.id);
            if let Some(result) = hit {
                debug!(file = %file_name, "reuse bind result");
                return Ok(FileResult { file_name, result });
            }
        }

        // Bind outside the lock so files do not serialize on the cache.
        let mut binder = Binder::with_options(self.interner.clone(), self.options.clone());
        let result = binder.bind(tree).map_err(|source| CompileError::Bind {
            file: file_name.clone(),
            source,
        })?;
        debug!(file = %file_name, diagnostics = result.diagnostics.len(), "bound file");
        let result = Arc::new(result);

        if self.options.use_cache {
            self.cache
                .lock()
                .map_err(|_| CompileError::CachePoisoned)?
                .insert(tree.id, Arc::clone(&result));
        }
        Ok(FileResult { file_name, result })
    }
}
