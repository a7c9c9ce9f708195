//! Node core modules and the `includeNodeModules` gate.

use super::env::{Environment, IncludeNodeModules};
use super::specifier::module_parts;

/// What a Node core module becomes outside of Node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Replaced by the empty-module shim.
    EmptyShim,
    /// Replaced by a browser polyfill package, resolved as a bare specifier.
    Polyfill(&'static str),
}

/// Node core modules, sorted by name.
const BUILTINS: &[(&str, Builtin)] = &[
    ("_http_agent", Builtin::EmptyShim),
    ("_http_client", Builtin::EmptyShim),
    ("_http_common", Builtin::EmptyShim),
    ("_http_incoming", Builtin::EmptyShim),
    ("_http_outgoing", Builtin::EmptyShim),
    ("_http_server", Builtin::EmptyShim),
    ("_stream_duplex", Builtin::EmptyShim),
    ("_stream_passthrough", Builtin::EmptyShim),
    ("_stream_readable", Builtin::EmptyShim),
    ("_stream_transform", Builtin::EmptyShim),
    ("_stream_wrap", Builtin::EmptyShim),
    ("_stream_writable", Builtin::EmptyShim),
    ("_tls_common", Builtin::EmptyShim),
    ("_tls_wrap", Builtin::EmptyShim),
    ("assert", Builtin::Polyfill("assert/")),
    ("async_hooks", Builtin::EmptyShim),
    ("buffer", Builtin::Polyfill("buffer/")),
    ("child_process", Builtin::EmptyShim),
    ("cluster", Builtin::EmptyShim),
    ("console", Builtin::Polyfill("console-browserify")),
    ("constants", Builtin::Polyfill("constants-browserify")),
    ("crypto", Builtin::Polyfill("crypto-browserify")),
    ("dgram", Builtin::EmptyShim),
    ("diagnostics_channel", Builtin::EmptyShim),
    ("dns", Builtin::EmptyShim),
    ("domain", Builtin::Polyfill("domain-browser")),
    ("events", Builtin::Polyfill("events/")),
    ("fs", Builtin::EmptyShim),
    ("fs/promises", Builtin::EmptyShim),
    ("http", Builtin::Polyfill("stream-http")),
    ("http2", Builtin::EmptyShim),
    ("https", Builtin::Polyfill("https-browserify")),
    ("inspector", Builtin::EmptyShim),
    ("module", Builtin::EmptyShim),
    ("net", Builtin::EmptyShim),
    ("os", Builtin::Polyfill("os-browserify/browser.js")),
    ("path", Builtin::Polyfill("path-browserify")),
    ("perf_hooks", Builtin::EmptyShim),
    ("process", Builtin::Polyfill("process/browser.js")),
    ("punycode", Builtin::Polyfill("punycode/")),
    ("querystring", Builtin::Polyfill("querystring-es3/")),
    ("readline", Builtin::EmptyShim),
    ("repl", Builtin::EmptyShim),
    ("stream", Builtin::Polyfill("stream-browserify")),
    ("string_decoder", Builtin::Polyfill("string_decoder/")),
    ("sys", Builtin::Polyfill("util/util.js")),
    ("timers", Builtin::Polyfill("timers-browserify")),
    ("tls", Builtin::EmptyShim),
    ("trace_events", Builtin::EmptyShim),
    ("tty", Builtin::Polyfill("tty-browserify")),
    ("url", Builtin::Polyfill("url/")),
    ("util", Builtin::Polyfill("util/util.js")),
    ("v8", Builtin::EmptyShim),
    ("vm", Builtin::Polyfill("vm-browserify")),
    ("wasi", Builtin::EmptyShim),
    ("worker_threads", Builtin::EmptyShim),
    ("zlib", Builtin::Polyfill("browserify-zlib")),
];

/// Look up a Node core module by its exact specifier.
///
/// `assert/` is not a builtin: the trailing slash forces the npm package.
#[must_use]
pub fn find_builtin(specifier: &str) -> Option<Builtin> {
    let name = specifier.strip_prefix("node:").unwrap_or(specifier);
    BUILTINS
        .binary_search_by(|(key, _)| (*key).cmp(name))
        .ok()
        .map(|i| BUILTINS[i].1)
}

/// Whether a bare specifier should be bundled under `env`'s
/// `includeNodeModules` policy. Only the module name is consulted.
#[must_use]
pub fn should_include_node_module(env: &Environment, specifier: &str) -> bool {
    match &env.include_node_modules {
        IncludeNodeModules::All(include) => *include,
        IncludeNodeModules::Names(names) => {
            let (module, _) = module_parts(specifier);
            names.iter().any(|n| *n == module)
        }
        IncludeNodeModules::Map(map) => {
            let (module, _) = module_parts(specifier);
            map.get(&module).copied().unwrap_or(true)
        }
    }
}
