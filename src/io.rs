//! Where VM text comes from and where assembly goes.

use std::{
    collections::HashMap,
    ffi::OsStr,
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    vec,
};

use snafu::ResultExt;

use crate::error::{InputNotFoundSnafu, TranslateError, TranslateResult};

/// File extension of VM modules.
pub const VM_EXTENSION: &str = "vm";
/// File extension of generated assembly.
pub const ASM_EXTENSION: &str = "asm";

/// Produces the raw lines of a named module. Opening a module again starts
/// over from its first line.
pub trait LineSource {
    type Lines: Iterator<Item = io::Result<String>>;

    fn open(&self, module: &str) -> io::Result<Self::Lines>;
}

/// Persists translated lines.
pub trait LineSink {
    fn write_lines(&mut self, lines: &[String]) -> io::Result<()>;

    /// Human readable name of the destination, for error reports.
    fn destination(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Truncate,
    Append,
}

/// Reads `<root>/<module>.vm`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySource { root: root.into() }
    }

    pub fn path_of(&self, module: &str) -> PathBuf {
        self.root.join(format!("{}.{}", module, VM_EXTENSION))
    }
}

impl LineSource for DirectorySource {
    type Lines = io::Lines<BufReader<File>>;

    fn open(&self, module: &str) -> io::Result<Self::Lines> {
        let file = File::open(self.path_of(module))?;
        Ok(BufReader::new(file).lines())
    }
}

/// Modules held in memory, keyed by name.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    modules: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.modules.insert(name.into(), text.into());
        self
    }
}

impl LineSource for MemorySource {
    type Lines = vec::IntoIter<io::Result<String>>;

    fn open(&self, module: &str) -> io::Result<Self::Lines> {
        let text = self.modules.get(module).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no module named {}", module))
        })?;
        let lines: Vec<io::Result<String>> = text.lines().map(|l| Ok(l.to_string())).collect();
        Ok(lines.into_iter())
    }
}

/// Writes to a file, creating it if needed.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    mode: OutputMode,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, mode: OutputMode) -> Self {
        FileSink {
            path: path.into(),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSink for FileSink {
    fn write_lines(&mut self, lines: &[String]) -> io::Result<()> {
        let file = match self.mode {
            OutputMode::Truncate => File::create(&self.path)?,
            OutputMode::Append => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?,
        };
        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub lines: Vec<String>,
    mode: OutputMode,
}

impl MemorySink {
    pub fn new(mode: OutputMode) -> Self {
        MemorySink {
            lines: Vec::new(),
            mode,
        }
    }
}

impl LineSink for MemorySink {
    fn write_lines(&mut self, lines: &[String]) -> io::Result<()> {
        if self.mode == OutputMode::Truncate {
            self.lines.clear();
        }
        self.lines.extend_from_slice(lines);
        Ok(())
    }

    fn destination(&self) -> String {
        "memory".to_string()
    }
}

/// What a command-line input resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    /// Directory the modules are read from.
    pub root: PathBuf,
    /// Module names, in translation order.
    pub modules: Vec<String>,
    /// Where output goes unless told otherwise.
    pub default_output: PathBuf,
    /// Whether the input named a directory rather than a single file.
    pub is_directory: bool,
}

fn module_name(path: &Path) -> Option<String> {
    path.file_stem().and_then(OsStr::to_str).map(str::to_string)
}

fn has_vm_extension(path: &Path) -> bool {
    path.extension().and_then(OsStr::to_str) == Some(VM_EXTENSION)
}

/// Names of the `.vm` files among `entries`, sorted. A failed entry fails
/// the whole listing.
fn vm_modules<I>(entries: I) -> io::Result<Vec<String>>
where
    I: IntoIterator<Item = io::Result<PathBuf>>,
{
    let mut modules = Vec::new();
    for path in entries {
        let path = path?;
        if path.is_file() && has_vm_extension(&path) {
            modules.extend(module_name(&path));
        }
    }
    modules.sort();
    Ok(modules)
}

fn not_found(input: &Path, reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: {}", input.display(), reason),
    )
}

/// Resolve a `.vm` file or a directory of them into modules.
///
/// A directory yields every `.vm` file directly inside it, sorted by name,
/// and names its output `<dir>/<dirname>.asm`. A file yields itself and
/// names its output `<stem>.asm` next to it.
pub fn discover(input: &Path) -> TranslateResult<Discovered> {
    let input_name = input.display().to_string();

    if input.is_dir() {
        let modules = fs::read_dir(input)
            .and_then(|entries| vm_modules(entries.map(|entry| entry.map(|e| e.path()))))
            .context(InputNotFoundSnafu {
                module: input_name.as_str(),
            })?;

        if modules.is_empty() {
            return Err(TranslateError::InputNotFound {
                module: input_name,
                source: not_found(input, "no .vm modules found"),
            });
        }

        let dir_name = input
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .and_then(OsStr::to_str)
            .map(str::to_string)
            .unwrap_or_else(|| "out".to_string());
        return Ok(Discovered {
            root: input.to_path_buf(),
            modules,
            default_output: input.join(format!("{}.{}", dir_name, ASM_EXTENSION)),
            is_directory: true,
        });
    }

    let module = match module_name(input) {
        Some(name) if input.is_file() && has_vm_extension(input) => name,
        _ => {
            return Err(TranslateError::InputNotFound {
                module: input_name,
                source: not_found(input, "not a .vm file or a directory"),
            })
        }
    };
    let root = input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(Discovered {
        root,
        modules: vec![module],
        default_output: input.with_extension(ASM_EXTENSION),
        is_directory: false,
    })
}
