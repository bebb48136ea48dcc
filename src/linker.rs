//! Sequences modules into a single assembly program.
//!
//! A `Linker` is one translation run. It owns the label counters, so every
//! comparison and call site in the program gets its own symbols no matter
//! which module it came from, and the table of static namespaces handed out
//! to modules. Build a new one per run.

use std::collections::HashMap;

use snafu::ResultExt;
use tracing::{debug, info, warn};

use crate::error::{
    InputNotFoundSnafu, InputReadSnafu, LineSnafu, NamespaceCollisionSnafu,
    OutputWriteFailureSnafu, TranslateResult,
};
use crate::io::{LineSink, LineSource};
use crate::parser::{classify, sanitize};
use crate::translator::{bootstrap::bootstrap, LabelCounters, LabelScope, Translator};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkOptions {
    /// Prepend the code that sets up the stack and calls `Sys.init`.
    pub bootstrap: bool,
    pub label_scope: LabelScope,
}

impl LinkOptions {
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_label_scope(mut self, label_scope: LabelScope) -> Self {
        self.label_scope = label_scope;
        self
    }
}

/// Static-segment namespace for a module: its name with anything that cannot
/// appear in an assembly symbol replaced by `_`.
pub fn namespace(module: &str) -> String {
    let namespace: String = module
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "_.$:".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    if namespace.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", namespace)
    } else {
        namespace
    }
}

pub struct Linker {
    options: LinkOptions,
    counters: LabelCounters,
    /// Static namespace to the module that owns it.
    namespaces: HashMap<String, String>,
    output: Vec<String>,
}

impl Linker {
    pub fn new(options: LinkOptions) -> Self {
        let mut counters = LabelCounters::new();
        let mut output = Vec::new();
        if options.bootstrap {
            output.push("// bootstrap".to_string());
            output.extend(bootstrap(&mut counters));
        }
        Linker {
            options,
            counters,
            namespaces: HashMap::new(),
            output,
        }
    }

    /// Translate one module and append it to the output.
    ///
    /// A module either lands in the output completely or not at all: on error
    /// nothing from it is kept, so the caller may skip it and carry on with
    /// the next one. Returns the number of commands translated.
    pub fn translate_module<S: LineSource>(
        &mut self,
        source: &S,
        module: &str,
    ) -> TranslateResult<usize> {
        let lines = source.open(module).context(InputNotFoundSnafu { module })?;

        let namespace = namespace(module);
        match self.namespaces.get(&namespace) {
            Some(existing) if existing != module => {
                return NamespaceCollisionSnafu {
                    module,
                    existing: existing.as_str(),
                    namespace,
                }
                .fail();
            }
            Some(_) => warn!(module, "module is linked twice; its statics are shared"),
            None => {}
        }

        let mut translator =
            Translator::new(&namespace, &mut self.counters, self.options.label_scope);
        let mut emitted = Vec::new();
        let mut commands = 0;

        for (number, line) in lines.enumerate() {
            let line = line.context(InputReadSnafu { module })?;
            let Some(sanitized) = sanitize(&line) else {
                continue;
            };

            let instructions = classify(&sanitized)
                .and_then(|command| translator.translate(&command))
                .context(LineSnafu {
                    module,
                    line_number: number + 1,
                    line: sanitized.as_str(),
                })?;

            emitted.push(format!("// {}", sanitized));
            emitted.extend(instructions);
            commands += 1;
        }

        debug!(
            module,
            commands,
            lines = emitted.len(),
            "translated module"
        );
        self.namespaces.insert(namespace, module.to_string());
        self.output.extend(emitted);
        Ok(commands)
    }

    /// Translate `modules` in order, stopping at the first failure.
    pub fn link<S, M>(mut self, source: &S, modules: &[M]) -> TranslateResult<Vec<String>>
    where
        S: LineSource,
        M: AsRef<str>,
    {
        for module in modules {
            self.translate_module(source, module.as_ref())?;
        }
        info!(
            modules = modules.len(),
            lines = self.output.len(),
            bootstrap = self.options.bootstrap,
            "linked program"
        );
        Ok(self.output)
    }

    /// Link `modules` and hand the program to `sink`. Nothing is written
    /// unless every module translated. Returns the number of lines written.
    pub fn run<S, M, K>(self, source: &S, modules: &[M], sink: &mut K) -> TranslateResult<usize>
    where
        S: LineSource,
        M: AsRef<str>,
        K: LineSink,
    {
        let output = self.link(source, modules)?;
        sink.write_lines(&output)
            .context(OutputWriteFailureSnafu {
                destination: sink.destination(),
            })?;
        Ok(output.len())
    }

    /// Everything translated so far, bootstrap included.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn counters(&self) -> &LabelCounters {
        &self.counters
    }
}
